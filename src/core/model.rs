// Feedline - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Dated items
// =============================================================================

/// Anything that can be placed on the timeline.
///
/// The title doubles as the item's identity when rows are keyed for
/// rendering, so feeds are expected to keep titles unique.
pub trait DatedItem {
    /// Instant the item was posted.
    fn posted_at(&self) -> DateTime<Utc>;

    /// Display title.
    fn title(&self) -> &str;

    /// Whether the item carries a special display format. Drives the
    /// spacing flags computed by the timeline layout.
    fn has_format(&self) -> bool {
        false
    }
}

impl<T: DatedItem + ?Sized> DatedItem for &T {
    fn posted_at(&self) -> DateTime<Utc> {
        (**self).posted_at()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn has_format(&self) -> bool {
        (**self).has_format()
    }
}

// =============================================================================
// Article
// =============================================================================

/// A validated feed article.
///
/// Built from `RawArticle` by `core::ingest`; the timestamp is guaranteed
/// to be a real instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Display title and identity key.
    pub title: String,

    /// Posting instant in UTC.
    pub posted_at: DateTime<Utc>,

    /// Optional display format (e.g. "ama", "video"). `None` renders as a
    /// default article.
    pub format: Option<String>,

    /// URL slug, if the source provides one.
    pub slug: Option<String>,

    /// Author of the article.
    pub author: Option<Author>,

    /// Upvote count at the time the feed was fetched.
    pub upvotes: u32,

    /// Top-level comments, each owning its replies.
    pub comments: Vec<Comment>,
}

impl DatedItem for Article {
    fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn has_format(&self) -> bool {
        self.format.as_deref().is_some_and(|f| !f.is_empty())
    }
}

// =============================================================================
// Comments
// =============================================================================

/// A participant as shown next to comments and in avatar stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    /// Avatar image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// A comment and its owned replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: String,
    pub author: Author,
    pub content: String,

    /// Last edit instant. `None` when the source timestamp was unusable.
    pub updated_at: Option<DateTime<Utc>>,

    pub votes: u32,
    pub children: Vec<Comment>,
}

// =============================================================================
// Sort direction
// =============================================================================

/// Ordering applied uniformly to buckets and to the items inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Most recent first.
    #[default]
    Latest,
    /// Oldest first.
    Earliest,
}

impl SortDirection {
    /// Compare two chronological values in this direction.
    pub fn compare<T: Ord>(self, a: &T, b: &T) -> std::cmp::Ordering {
        match self {
            SortDirection::Latest => b.cmp(a),
            SortDirection::Earliest => a.cmp(b),
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Latest => "Latest",
            SortDirection::Earliest => "Earliest",
        }
    }

    /// Parse a case-insensitive name ("latest" / "earliest").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "latest" => Some(SortDirection::Latest),
            "earliest" => Some(SortDirection::Earliest),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
