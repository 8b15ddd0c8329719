// Feedline - core/timeline.rs
//
// Turns sorted buckets into a render plan: one section per bucket, one row
// per item, with the spacing flags the feed view needs around formatted
// (non-default) articles.

use crate::core::bucket::{BucketKey, BucketMap, TimelineBucketer};
use crate::core::model::{DatedItem, SortDirection};
use chrono::TimeZone;

/// One bucket of the rendered timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSection<T> {
    pub key: BucketKey,

    /// Heading text for the bucket ("Today", "March 2024", ...).
    pub title: String,

    /// True for the first section on the page.
    pub first: bool,

    pub rows: Vec<TimelineRow<T>>,
}

/// One item of a section plus its spacing relative to its neighbour below.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow<T> {
    pub item: T,

    /// First row of the section and formatted.
    pub margin_top: bool,

    /// Formatted and followed by another formatted row.
    pub margin_bottom: bool,

    /// The next row is absent or a default (unformatted) item.
    pub next_is_default: bool,
}

/// Compute spacing flags for an already sorted run of items.
pub fn layout_rows<T: DatedItem>(items: Vec<T>) -> Vec<TimelineRow<T>> {
    let formats: Vec<bool> = items.iter().map(|item| item.has_format()).collect();

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let formatted = formats[i];
            let next_formatted = formats.get(i + 1).copied();
            TimelineRow {
                item,
                margin_top: i == 0 && formatted,
                margin_bottom: formatted && next_formatted == Some(true),
                next_is_default: next_formatted != Some(true),
            }
        })
        .collect()
}

/// Sort a bucket map and lay it out as sections.
pub fn sections_from<T: DatedItem, Tz: TimeZone>(
    map: BucketMap<T>,
    bucketer: &TimelineBucketer<Tz>,
    direction: SortDirection,
) -> Vec<TimelineSection<T>> {
    map.into_sorted(direction)
        .into_iter()
        .enumerate()
        .map(|(index, (key, items))| TimelineSection {
            key,
            title: key.title(bucketer.rule()),
            first: index == 0,
            rows: layout_rows(items),
        })
        .collect()
}

/// Bucket, sort and lay out `items` in one pass.
pub fn build_timeline<'a, T: DatedItem, Tz: TimeZone>(
    items: &'a [T],
    bucketer: &TimelineBucketer<Tz>,
    direction: SortDirection,
) -> Vec<TimelineSection<&'a T>> {
    let sections = sections_from(bucketer.bucket(items), bucketer, direction);
    tracing::debug!(
        sections = sections.len(),
        sort = direction.label(),
        "Timeline built"
    );
    sections
}
