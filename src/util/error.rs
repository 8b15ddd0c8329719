// Feedline - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all Feedline operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum FeedlineError {
    /// A feed document could not be loaded.
    Load(LoadError),

    /// An individual feed item was rejected.
    InvalidInput(InvalidInputError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// A requested article does not exist in the feed.
    ArticleNotFound { title: String },
}

impl fmt::Display for FeedlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::InvalidInput(e) => write!(f, "Invalid input: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::ArticleNotFound { title } => {
                write!(f, "No article titled '{title}' in the feed")
            }
        }
    }
}

impl std::error::Error for FeedlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::InvalidInput(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::ArticleNotFound { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Invalid input (per-item ingestion failures)
// ---------------------------------------------------------------------------

/// A single feed item that failed validation during ingestion.
///
/// These are never fatal for the feed as a whole: the offending item is
/// excluded (articles) or left without a timestamp (comments) and the error
/// is collected into the ingestion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// The `postedAt` value could not be interpreted as a point in time.
    UnparseableTimestamp {
        index: usize,
        title: String,
        raw: String,
    },

    /// The article has no `postedAt` at all.
    MissingTimestamp { index: usize, title: String },

    /// Epoch milliseconds outside the representable calendar range.
    TimestampOutOfRange { index: usize, title: String, millis: i64 },

    /// The article has no usable title (titles are the identity key).
    EmptyTitle { index: usize },

    /// Two articles share a title. Non-fatal: both are kept.
    DuplicateTitle { index: usize, title: String },

    /// A comment's `updatedAt` could not be parsed. The comment is kept
    /// without a timestamp.
    CommentTimestamp { comment_id: String, raw: String },
}

impl InvalidInputError {
    /// Whether the offending item was excluded from the feed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnparseableTimestamp { .. }
                | Self::MissingTimestamp { .. }
                | Self::TimestampOutOfRange { .. }
                | Self::EmptyTitle { .. }
        )
    }
}

impl fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparseableTimestamp { index, title, raw } => write!(
                f,
                "article #{index} '{title}': cannot parse postedAt '{raw}'"
            ),
            Self::MissingTimestamp { index, title } => {
                write!(f, "article #{index} '{title}': missing postedAt")
            }
            Self::TimestampOutOfRange {
                index,
                title,
                millis,
            } => write!(
                f,
                "article #{index} '{title}': postedAt {millis} ms is out of range"
            ),
            Self::EmptyTitle { index } => write!(f, "article #{index}: missing or empty title"),
            Self::DuplicateTitle { index, title } => write!(
                f,
                "article #{index}: title '{title}' is not unique"
            ),
            Self::CommentTimestamp { comment_id, raw } => write!(
                f,
                "comment '{comment_id}': cannot parse updatedAt '{raw}'"
            ),
        }
    }
}

impl std::error::Error for InvalidInputError {}

impl From<InvalidInputError> for FeedlineError {
    fn from(e: InvalidInputError) -> Self {
        Self::InvalidInput(e)
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors related to reading a feed document.
#[derive(Debug)]
pub enum LoadError {
    /// The document is not valid feed JSON.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error reading the document.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { path, source } => {
                write!(f, "Failed to parse feed '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Feed '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error reading feed '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::FileTooLarge { .. } => None,
        }
    }
}

impl From<LoadError> for FeedlineError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for FeedlineError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for FeedlineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for Feedline results.
pub type Result<T> = std::result::Result<T, FeedlineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_rejection_classification() {
        let rejected = InvalidInputError::EmptyTitle { index: 3 };
        let warning = InvalidInputError::DuplicateTitle {
            index: 4,
            title: "Launch".to_string(),
        };
        assert!(rejected.is_rejection());
        assert!(!warning.is_rejection());
    }

    #[test]
    fn test_load_error_preserves_source() {
        let err: FeedlineError = LoadError::Io {
            path: PathBuf::from("feed.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        }
        .into();
        assert!(err.to_string().contains("feed.json"));
        let load = err.source().expect("load error is the source");
        assert!(load.source().is_some());
    }
}
