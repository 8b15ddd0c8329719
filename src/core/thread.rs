// Feedline - core/thread.rs
//
// Comment threads as flat, indented rows, and the participant avatar strip
// shown on article cards.
//
// Traversal is pre-order over owned child lists with an explicit stack, so
// arbitrarily deep reply chains cannot overflow the call stack.

use crate::core::model::{Article, Comment};
use crate::core::relative::format_relative;
use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One comment positioned in the flattened thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadRow<'a> {
    /// Nesting level; top-level comments are 0.
    pub depth: usize,

    /// Left indentation for this row.
    pub indent_px: u32,

    pub comment_id: &'a str,
    pub author: &'a str,
    pub avatar: Option<&'a str>,
    pub content: &'a str,

    /// "3 hours ago", or empty when the comment has no timestamp.
    pub age: String,

    pub votes: u32,

    /// Direct replies to this comment.
    pub reply_count: usize,
}

/// Flatten `comments` into display order.
///
/// Replies follow their parent, each level indented by `indent_px`.
/// Subtrees deeper than `MAX_COMMENT_DEPTH` are skipped with a warning.
pub fn flatten_thread<'a>(
    comments: &'a [Comment],
    now: DateTime<Utc>,
    indent_px: u32,
) -> Vec<ThreadRow<'a>> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    // Reversed so the first comment is popped first.
    let mut stack: Vec<(usize, &'a Comment)> = comments.iter().rev().map(|c| (0, c)).collect();

    while let Some((depth, comment)) = stack.pop() {
        if depth > constants::MAX_COMMENT_DEPTH {
            skipped += 1 + count_comments(&comment.children);
            continue;
        }

        let depth_px = u32::try_from(depth).unwrap_or(u32::MAX);
        rows.push(ThreadRow {
            depth,
            indent_px: depth_px.saturating_mul(indent_px),
            comment_id: &comment.id,
            author: &comment.author.name,
            avatar: comment.author.image.as_deref(),
            content: &comment.content,
            age: comment
                .updated_at
                .map(|t| format_relative(t, now))
                .unwrap_or_default(),
            votes: comment.votes,
            reply_count: comment.children.len(),
        });

        stack.extend(comment.children.iter().rev().map(|c| (depth + 1, c)));
    }

    if skipped > 0 {
        tracing::warn!(
            skipped,
            max_depth = constants::MAX_COMMENT_DEPTH,
            "Comment replies beyond maximum depth were not shown"
        );
    }

    rows
}

/// Count every comment in a thread, replies included.
pub fn count_comments(comments: &[Comment]) -> usize {
    let mut total = 0;
    let mut stack: Vec<&Comment> = comments.iter().collect();
    while let Some(comment) = stack.pop() {
        total += 1;
        stack.extend(comment.children.iter());
    }
    total
}

/// The stacked avatar strip on an article card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantsSummary<'a> {
    /// Avatar images of the previewed commenters, in comment order.
    pub avatars: Vec<Option<&'a str>>,

    /// Commenters not shown ("+N").
    pub overflow: usize,
}

/// Preview the first `preview_limit` top-level commenters of `article`.
///
/// Returns `None` when the article has no comments, so nothing is drawn.
pub fn participants(article: &Article, preview_limit: usize) -> Option<ParticipantsSummary<'_>> {
    if article.comments.is_empty() {
        return None;
    }

    let avatars: Vec<Option<&str>> = article
        .comments
        .iter()
        .take(preview_limit)
        .map(|c| c.author.image.as_deref())
        .collect();

    Some(ParticipantsSummary {
        overflow: article.comments.len() - avatars.len(),
        avatars,
    })
}
