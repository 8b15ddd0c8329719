// Feedline - core/export.rs
//
// Text, JSON, and CSV output of a laid-out timeline.
// Core layer: writes to any Write trait object; `export_path` is only used
// for error context ("-" for stdout).

use crate::core::bucket::{BucketKind, WeekRule};
use crate::core::model::{Article, SortDirection};
use crate::core::thread::{count_comments, ParticipantsSummary, ThreadRow};
use crate::core::timeline::TimelineSection;
use crate::util::error::ExportError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Parameters of the pass that produced the sections.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext {
    pub generated_at: DateTime<Utc>,
    pub sort: SortDirection,
    pub week_rule: WeekRule,
}

#[derive(Serialize)]
struct TimelineDocument<'a> {
    generated_at: DateTime<Utc>,
    sort: SortDirection,
    week_rule: WeekRule,
    sections: Vec<SectionDocument<'a>>,
}

#[derive(Serialize)]
struct SectionDocument<'a> {
    bucket: String,
    kind: BucketKind,
    date_key: String,
    title: &'a str,
    first: bool,
    articles: Vec<RowDocument<'a>>,
}

#[derive(Serialize)]
struct RowDocument<'a> {
    title: &'a str,
    posted_at: DateTime<Utc>,
    format: Option<&'a str>,
    slug: Option<&'a str>,
    upvotes: u32,
    comment_count: usize,
    margin_top: bool,
    margin_bottom: bool,
    next_is_default: bool,
}

fn article_count(sections: &[TimelineSection<&Article>]) -> usize {
    sections.iter().map(|s| s.rows.len()).sum()
}

/// Write `sections` in the requested format. Returns the number of articles.
pub fn export<W: Write>(
    format: ExportFormat,
    sections: &[TimelineSection<&Article>],
    context: &ExportContext,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Text => export_text(sections, writer, export_path),
        ExportFormat::Json => export_json(sections, context, writer, export_path),
        ExportFormat::Csv => export_csv(sections, writer, export_path),
    }
}

/// Human-readable listing: one heading per bucket, one line per article.
pub fn export_text<W: Write>(
    sections: &[TimelineSection<&Article>],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e: std::io::Error| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };

    if sections.is_empty() {
        writeln!(writer, "No articles.").map_err(io_err)?;
        return Ok(0);
    }

    for section in sections {
        if !section.first {
            writeln!(writer).map_err(io_err)?;
        }
        writeln!(writer, "{} ({})", section.title, section.key.date_key()).map_err(io_err)?;

        for row in &section.rows {
            let article = row.item;
            let format_tag = article
                .format
                .as_deref()
                .filter(|f| !f.is_empty())
                .map(|f| format!(" [{f}]"))
                .unwrap_or_default();
            writeln!(
                writer,
                "  {}  {}{}  ({} upvotes, {} comments)",
                article.posted_at.format("%Y-%m-%d %H:%M"),
                article.title,
                format_tag,
                article.upvotes,
                count_comments(&article.comments),
            )
            .map_err(io_err)?;
        }
    }

    writer.flush().map_err(io_err)?;
    Ok(article_count(sections))
}

/// Export sections as a single JSON document.
pub fn export_json<W: Write>(
    sections: &[TimelineSection<&Article>],
    context: &ExportContext,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let document = TimelineDocument {
        generated_at: context.generated_at,
        sort: context.sort,
        week_rule: context.week_rule,
        sections: sections
            .iter()
            .map(|section| SectionDocument {
                bucket: section.key.label(),
                kind: section.key.kind(),
                date_key: section.key.date_key(),
                title: &section.title,
                first: section.first,
                articles: section
                    .rows
                    .iter()
                    .map(|row| RowDocument {
                        title: &row.item.title,
                        posted_at: row.item.posted_at,
                        format: row.item.format.as_deref(),
                        slug: row.item.slug.as_deref(),
                        upvotes: row.item.upvotes,
                        comment_count: count_comments(&row.item.comments),
                        margin_top: row.margin_top,
                        margin_bottom: row.margin_bottom,
                        next_is_default: row.next_is_default,
                    })
                    .collect(),
            })
            .collect(),
    };

    write_json(&mut writer, &document, export_path)?;
    Ok(article_count(sections))
}

/// Pretty-print `document` followed by a newline, then flush so write
/// failures surface here rather than when a buffered writer is dropped.
fn write_json<W: Write, T: Serialize>(
    writer: &mut W,
    document: &T,
    export_path: &Path,
) -> Result<(), ExportError> {
    let io_err = |e: std::io::Error| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };
    serde_json::to_writer_pretty(&mut *writer, document).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writeln!(writer).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

/// Export one CSV record per article: bucket, date_key, title, posted_at, format.
pub fn export_csv<W: Write>(
    sections: &[TimelineSection<&Article>],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["bucket", "date_key", "title", "posted_at", "format"])
        .map_err(csv_err)?;

    let mut count = 0;
    for section in sections {
        let bucket = section.key.label();
        let date_key = section.key.date_key();
        for row in &section.rows {
            let posted_at = row.item.posted_at.to_rfc3339();
            csv_writer
                .write_record([
                    bucket.as_str(),
                    date_key.as_str(),
                    row.item.title.as_str(),
                    posted_at.as_str(),
                    row.item.format.as_deref().unwrap_or(""),
                ])
                .map_err(csv_err)?;
            count += 1;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

// =============================================================================
// Comment threads
// =============================================================================

#[derive(Serialize)]
struct ThreadDocument<'a> {
    title: &'a str,
    comment_count: usize,
    participants: Option<&'a ParticipantsSummary<'a>>,
    rows: &'a [ThreadRow<'a>],
}

/// Write one article's flattened comment thread. Returns the number of rows.
pub fn export_thread<W: Write>(
    format: ExportFormat,
    article: &Article,
    participants: Option<&ParticipantsSummary<'_>>,
    rows: &[ThreadRow<'_>],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |e: std::io::Error| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };

    match format {
        ExportFormat::Text => {
            writeln!(writer, "{}", article.title).map_err(io_err)?;
            match participants {
                Some(summary) => {
                    let shown = summary.avatars.len();
                    let noun = if shown == 1 { "participant" } else { "participants" };
                    if summary.overflow > 0 {
                        writeln!(writer, "{shown} {noun} shown, +{} more", summary.overflow)
                            .map_err(io_err)?;
                    } else {
                        writeln!(writer, "{shown} {noun}").map_err(io_err)?;
                    }
                }
                None => writeln!(writer, "No comments yet.").map_err(io_err)?,
            }

            for row in rows {
                let pad = "  ".repeat(row.depth);
                let age = if row.age.is_empty() {
                    String::new()
                } else {
                    format!(", {}", row.age)
                };
                writeln!(writer).map_err(io_err)?;
                writeln!(writer, "{pad}{} ({} votes{age})", row.author, row.votes)
                    .map_err(io_err)?;
                for line in row.content.lines() {
                    writeln!(writer, "{pad}  {line}").map_err(io_err)?;
                }
            }
            writer.flush().map_err(io_err)?;
        }
        ExportFormat::Json => {
            let document = ThreadDocument {
                title: &article.title,
                comment_count: count_comments(&article.comments),
                participants,
                rows,
            };
            write_json(&mut writer, &document, export_path)?;
        }
        ExportFormat::Csv => {
            let csv_err = |e: csv::Error| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            };
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer
                .write_record(["depth", "indent_px", "comment_id", "author", "votes", "replies", "content"])
                .map_err(csv_err)?;
            for row in rows {
                let depth = row.depth.to_string();
                let indent = row.indent_px.to_string();
                let votes = row.votes.to_string();
                let replies = row.reply_count.to_string();
                csv_writer
                    .write_record([
                        depth.as_str(),
                        indent.as_str(),
                        row.comment_id,
                        row.author,
                        votes.as_str(),
                        replies.as_str(),
                        row.content,
                    ])
                    .map_err(csv_err)?;
            }
            csv_writer.flush().map_err(io_err)?;
        }
    }

    Ok(rows.len())
}
