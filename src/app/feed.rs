// Feedline - app/feed.rs
//
// Loading a feed document from disk: size guard, JSON parse, validation.

use crate::core::ingest::{self, IngestReport};
use crate::core::model::Article;
use crate::util::constants;
use crate::util::error::{FeedlineError, LoadError};
use std::path::Path;

/// Read, parse and validate the feed at `path`.
///
/// Per-article problems are collected in the report; only document-level
/// failures (unreadable, oversized, malformed JSON) are returned as errors.
pub fn load_feed(path: &Path) -> Result<IngestReport, LoadError> {
    let io_err = |e: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > constants::MAX_FEED_FILE_SIZE {
        return Err(LoadError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size: constants::MAX_FEED_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(io_err)?;
    let raw = ingest::parse_feed(&content).map_err(|e| LoadError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), bytes = size, articles = raw.len(), "Feed loaded");
    Ok(ingest::ingest(raw))
}

/// Look up an article by its exact title.
pub fn find_article<'a>(articles: &'a [Article], title: &str) -> Result<&'a Article, FeedlineError> {
    articles
        .iter()
        .find(|a| a.title == title)
        .ok_or_else(|| FeedlineError::ArticleNotFound {
            title: title.to_string(),
        })
}
