// Feedline - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::bucket::WeekRule;
use crate::core::model::SortDirection;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for Feedline configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/feedline/ or %APPDATA%\Feedline\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[timeline]` section.
    pub timeline: TimelineSection,
    /// `[thread]` section.
    pub thread: ThreadSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[timeline]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    /// "latest" or "earliest".
    pub sort: Option<String>,
    /// "rolling" or "older-than-cutoff".
    pub week_rule: Option<String>,
    /// Calendar used for day boundaries: "local" or "utc".
    pub timezone: Option<String>,
}

/// `[thread]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ThreadSection {
    /// Indentation per reply level in px.
    pub indent_px: Option<u32>,
    /// Avatars shown before the overflow count.
    pub participant_preview: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Which calendar decides where one day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    #[default]
    Local,
    Utc,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Timeline --
    pub sort: SortDirection,
    pub week_rule: WeekRule,
    pub zone: CalendarZone,

    // -- Thread --
    pub indent_px: u32,
    pub participant_preview: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sort: SortDirection::default(),
            week_rule: WeekRule::default(),
            zone: CalendarZone::default(),
            indent_px: constants::DEFAULT_COMMENT_INDENT_PX,
            participant_preview: constants::DEFAULT_PARTICIPANT_PREVIEW,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal problems.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults plus the error
/// so the application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            tracing::warn!(error = %err, "Using default configuration");
            return (AppConfig::default(), vec![err]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            };
            tracing::warn!(error = %err, "Using default configuration");
            return (AppConfig::default(), vec![err]);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    validate(raw)
}

fn out_of_range(field: &str, value: impl ToString, expected: impl Into<String>) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
}

/// Validate each field of a parsed config, accumulating all problems.
/// Invalid fields keep their defaults.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<ConfigError> = Vec::new();

    // -- Timeline: sort --
    if let Some(ref sort) = raw.timeline.sort {
        match SortDirection::from_name(sort) {
            Some(direction) => config.sort = direction,
            None => warnings.push(out_of_range(
                "timeline.sort",
                sort,
                "\"latest\" or \"earliest\"",
            )),
        }
    }

    // -- Timeline: week_rule --
    if let Some(ref rule) = raw.timeline.week_rule {
        match WeekRule::from_name(rule) {
            Some(r) => config.week_rule = r,
            None => warnings.push(out_of_range(
                "timeline.week_rule",
                rule,
                "\"rolling\" or \"older-than-cutoff\"",
            )),
        }
    }

    // -- Timeline: timezone --
    if let Some(ref zone) = raw.timeline.timezone {
        match zone.to_lowercase().as_str() {
            "local" => config.zone = CalendarZone::Local,
            "utc" => config.zone = CalendarZone::Utc,
            _ => warnings.push(out_of_range(
                "timeline.timezone",
                zone,
                "\"local\" or \"utc\"",
            )),
        }
    }

    // -- Thread: indent_px --
    if let Some(indent) = raw.thread.indent_px {
        if indent <= constants::MAX_COMMENT_INDENT_PX {
            config.indent_px = indent;
        } else {
            warnings.push(out_of_range(
                "thread.indent_px",
                indent,
                format!("0-{}", constants::MAX_COMMENT_INDENT_PX),
            ));
        }
    }

    // -- Thread: participant_preview --
    if let Some(preview) = raw.thread.participant_preview {
        if (1..=constants::MAX_PARTICIPANT_PREVIEW).contains(&preview) {
            config.participant_preview = preview;
        } else {
            warnings.push(out_of_range(
                "thread.participant_preview",
                preview,
                format!("1-{}", constants::MAX_PARTICIPANT_PREVIEW),
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                "error, warn, info, debug, trace",
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[timeline]
sort = "Earliest"
week_rule = "older-than-cutoff"
timezone = "utc"

[thread]
indent_px = 16
participant_preview = 6

[logging]
level = "debug"
file = ""
"#,
        )
        .unwrap();

        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.sort, SortDirection::Earliest);
        assert_eq!(config.week_rule, WeekRule::OlderThanCutoff);
        assert_eq!(config.zone, CalendarZone::Utc);
        assert_eq!(config.indent_px, 16);
        assert_eq!(config.participant_preview, 6);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let raw: RawConfig = toml::from_str(
            r#"
[timeline]
sort = "newest"
timezone = "mars"

[thread]
indent_px = 9000
participant_preview = 0
"#,
        )
        .unwrap();

        let (config, warnings) = validate(raw);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].to_string().contains("timeline.sort"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparseable_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[timeline\nsort = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigError::TomlParse { .. }));
    }
}
