// Feedline - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Feedline";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "Feedline";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Timeline reference dates
// =============================================================================

/// Days subtracted from today to obtain the `yesterday` reference date.
pub const YESTERDAY_OFFSET_DAYS: u64 = 1;

/// Days subtracted from today to obtain the `lastWeek` cutoff date.
pub const LAST_WEEK_OFFSET_DAYS: u64 = 7;

/// Format of `YYYY/MM/DD` date keys.
pub const DATE_KEY_FORMAT: &str = "%Y/%m/%d";

/// Format for the human-readable month bucket title ("March 2024").
pub const MONTH_TITLE_FORMAT: &str = "%B %Y";

// =============================================================================
// Ingestion limits
// =============================================================================

/// Maximum size of a feed document read from disk.
pub const MAX_FEED_FILE_SIZE: u64 = 32 * 1024 * 1024; // 32 MB

/// Maximum number of articles accepted from a single feed document.
/// Articles beyond this are dropped with a warning.
pub const MAX_ARTICLES: usize = 100_000;

/// Maximum length of a raw timestamp echoed back in error messages.
pub const MAX_RAW_TIMESTAMP_PREVIEW: usize = 64;

// =============================================================================
// Comment threads
// =============================================================================

/// Horizontal indentation per nesting level of a reply (px).
pub const DEFAULT_COMMENT_INDENT_PX: u32 = 32;

/// Hard upper bound on configurable indentation (px).
pub const MAX_COMMENT_INDENT_PX: u32 = 256;

/// Maximum reply depth that is flattened. Deeper subtrees are skipped.
pub const MAX_COMMENT_DEPTH: usize = 64;

/// Number of participant avatars shown before the "+N" overflow badge.
pub const DEFAULT_PARTICIPANT_PREVIEW: usize = 4;

/// Hard upper bound on the configurable participant preview.
pub const MAX_PARTICIPANT_PREVIEW: usize = 32;

// =============================================================================
// Relative time thresholds (seconds)
// =============================================================================

/// Below this age a timestamp is rendered as "just now".
pub const JUST_NOW_SECS: i64 = 45;

pub const SECS_PER_MINUTE: f64 = 60.0;
pub const SECS_PER_HOUR: f64 = 3_600.0;
pub const SECS_PER_DAY: f64 = 86_400.0;

/// Average month length used for "N months ago".
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Average year length used for "N years ago".
pub const DAYS_PER_YEAR: f64 = 365.25;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
