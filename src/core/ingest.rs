// Feedline - core/ingest.rs
//
// Converts raw feed JSON into validated `Article`s.
//
// Every article that reaches the timeline has a real timestamp: items whose
// `postedAt` cannot be interpreted are excluded here and reported, instead
// of being silently mis-bucketed later.
//
// Accepted timestamp forms:
//   - RFC 3339 / ISO-8601 with offset   "2024-03-10T08:15:00Z", "...+01:00"
//   - naive date-time (read as UTC)     "2024-03-10T08:15:00", "2024-03-10 08:15:00.250"
//   - date only (UTC midnight)          "2024-03-10"
//   - epoch milliseconds                1710058500000

use crate::core::model::{Article, Author, Comment};
use crate::util::constants;
use crate::util::error::InvalidInputError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashSet;

// =============================================================================
// Raw (wire) shapes
// =============================================================================

/// A timestamp as it appears in the feed: text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl RawTimestamp {
    /// Short printable form for error reports.
    fn preview(&self) -> String {
        let text = match self {
            RawTimestamp::Millis(ms) => ms.to_string(),
            RawTimestamp::FractionalMillis(ms) => ms.to_string(),
            RawTimestamp::Text(s) => s.clone(),
        };
        text.chars().take(constants::MAX_RAW_TIMESTAMP_PREVIEW).collect()
    }
}

/// Identifier that may be serialised as either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// Aggregate counters attached to a comment (`_count: { votes }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCount {
    #[serde(default)]
    pub votes: u32,
}

/// A comment exactly as deserialised from the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: RawId,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub updated_at: Option<RawTimestamp>,
    #[serde(default)]
    pub votes: Option<u32>,
    #[serde(default, rename = "_count")]
    pub count: Option<RawCount>,
    #[serde(default)]
    pub children: Vec<RawComment>,
}

/// An article exactly as deserialised from the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub posted_at: Option<RawTimestamp>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

/// Top-level feed document: a bare array or `{ "articles": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFeed {
    List(Vec<RawArticle>),
    Wrapped { articles: Vec<RawArticle> },
}

/// Deserialise a feed document.
pub fn parse_feed(json: &str) -> Result<Vec<RawArticle>, serde_json::Error> {
    let feed: RawFeed = serde_json::from_str(json)?;
    Ok(match feed {
        RawFeed::List(articles) => articles,
        RawFeed::Wrapped { articles } => articles,
    })
}

// =============================================================================
// Timestamp parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TimestampFault {
    Unparseable,
    OutOfRange(i64),
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, TimestampFault> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(TimestampFault::OutOfRange(ms))
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    // ISO 8601 forms outside RFC 3339: minute precision, basic `+hhmm`
    // offsets, and a `Z` designator on either.
    let zoned = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => text.to_string(),
    };
    for format in ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn resolve_timestamp(raw: &RawTimestamp) -> Result<DateTime<Utc>, TimestampFault> {
    match raw {
        RawTimestamp::Millis(ms) => from_millis(*ms),
        RawTimestamp::FractionalMillis(ms) if ms.is_finite() => from_millis(ms.trunc() as i64),
        RawTimestamp::FractionalMillis(_) => Err(TimestampFault::Unparseable),
        RawTimestamp::Text(text) => parse_text(text).ok_or(TimestampFault::Unparseable),
    }
}

/// Interpret a raw timestamp, or `None` if it does not denote an instant.
pub fn parse_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    resolve_timestamp(raw).ok()
}

// =============================================================================
// Ingestion
// =============================================================================

/// Result of validating a feed.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Accepted articles, in input order.
    pub articles: Vec<Article>,

    /// Every problem found, rejections and warnings alike.
    pub issues: Vec<InvalidInputError>,

    /// Articles dropped because the feed exceeded `MAX_ARTICLES`.
    pub truncated: usize,
}

impl IngestReport {
    /// Number of articles excluded by validation.
    pub fn rejected_count(&self) -> usize {
        self.issues.iter().filter(|e| e.is_rejection()).count()
    }
}

/// Validate raw articles, excluding any without a usable title or timestamp.
pub fn ingest(raw_articles: Vec<RawArticle>) -> IngestReport {
    let mut report = IngestReport::default();
    let mut seen_titles: HashSet<String> = HashSet::new();

    let total = raw_articles.len();
    if total > constants::MAX_ARTICLES {
        report.truncated = total - constants::MAX_ARTICLES;
        tracing::warn!(
            total,
            max = constants::MAX_ARTICLES,
            "Feed exceeds article limit; truncating"
        );
    }

    for (index, raw) in raw_articles
        .into_iter()
        .take(constants::MAX_ARTICLES)
        .enumerate()
    {
        match validate_article(index, raw, &mut report.issues) {
            Ok(article) => {
                if !seen_titles.insert(article.title.clone()) {
                    tracing::warn!(index, title = %article.title, "Duplicate article title");
                    report.issues.push(InvalidInputError::DuplicateTitle {
                        index,
                        title: article.title.clone(),
                    });
                }
                report.articles.push(article);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Article rejected");
                report.issues.push(e);
            }
        }
    }

    tracing::info!(
        accepted = report.articles.len(),
        rejected = report.rejected_count(),
        issues = report.issues.len(),
        "Feed ingested"
    );

    report
}

fn validate_article(
    index: usize,
    raw: RawArticle,
    issues: &mut Vec<InvalidInputError>,
) -> Result<Article, InvalidInputError> {
    let title = match raw.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(InvalidInputError::EmptyTitle { index }),
    };

    let Some(raw_ts) = raw.posted_at else {
        return Err(InvalidInputError::MissingTimestamp { index, title });
    };

    let posted_at = match resolve_timestamp(&raw_ts) {
        Ok(ts) => ts,
        Err(TimestampFault::OutOfRange(millis)) => {
            return Err(InvalidInputError::TimestampOutOfRange {
                index,
                title,
                millis,
            })
        }
        Err(TimestampFault::Unparseable) => {
            return Err(InvalidInputError::UnparseableTimestamp {
                index,
                title,
                raw: raw_ts.preview(),
            })
        }
    };

    let comments = raw
        .comments
        .into_iter()
        .map(|c| convert_comment(c, issues))
        .collect();

    Ok(Article {
        title,
        posted_at,
        format: raw.format,
        slug: raw.slug,
        author: raw.author,
        upvotes: raw.upvotes,
        comments,
    })
}

fn convert_comment(raw: RawComment, issues: &mut Vec<InvalidInputError>) -> Comment {
    let id = raw.id.to_string();

    let updated_at = raw.updated_at.as_ref().and_then(|ts| {
        let parsed = parse_timestamp(ts);
        if parsed.is_none() {
            tracing::warn!(comment_id = %id, "Comment timestamp unparseable");
            issues.push(InvalidInputError::CommentTimestamp {
                comment_id: id.clone(),
                raw: ts.preview(),
            });
        }
        parsed
    });

    let votes = raw
        .votes
        .or_else(|| raw.count.as_ref().map(|c| c.votes))
        .unwrap_or(0);

    let children = raw
        .children
        .into_iter()
        .map(|c| convert_comment(c, issues))
        .collect();

    Comment {
        id,
        author: raw.author,
        content: raw.content,
        updated_at,
        votes,
        children,
    }
}
