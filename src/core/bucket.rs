// Feedline - core/bucket.rs
//
// Timeline bucketing: partitions dated items into Today / Yesterday /
// week / per-month buckets relative to three reference dates, then orders
// buckets and bucket contents by a single sort direction.
//
// Core layer: pure logic. The only input besides the items is the clock,
// read once when the bucketer is constructed.

use crate::core::clock::Clock;
use crate::core::model::{DatedItem, SortDirection};
use crate::util::constants;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Format a calendar date as a zero-padded `YYYY/MM/DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(constants::DATE_KEY_FORMAT).to_string()
}

/// First day of the month containing `date`.
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

// =============================================================================
// Week rule
// =============================================================================

/// Decides which items older than yesterday land in the `lastWeek` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WeekRule {
    /// Items dated strictly after the cutoff (today minus 7 days) form a
    /// rolling "This Week" bucket; anything on or before it goes monthly.
    #[default]
    Rolling,

    /// Items dated strictly before the cutoff are gathered under the
    /// `lastWeek` key; the days between the cutoff and yesterday go monthly.
    OlderThanCutoff,
}

impl WeekRule {
    fn captures(self, day: NaiveDate, cutoff: NaiveDate) -> bool {
        match self {
            WeekRule::Rolling => day > cutoff,
            WeekRule::OlderThanCutoff => day < cutoff,
        }
    }

    /// Stable config/CLI name.
    pub fn name(&self) -> &'static str {
        match self {
            WeekRule::Rolling => "rolling",
            WeekRule::OlderThanCutoff => "older-than-cutoff",
        }
    }

    /// Parse a config/CLI name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rolling" => Some(WeekRule::Rolling),
            "older-than-cutoff" => Some(WeekRule::OlderThanCutoff),
            _ => None,
        }
    }
}

// =============================================================================
// Bucket keys
// =============================================================================

/// Which time window a bucket represents.
///
/// Declared oldest-to-newest so that, for keys sharing an anchor date, the
/// derived ordering still places the more recent window later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BucketKind {
    Month,
    LastWeek,
    Yesterday,
    Today,
}

/// Label of a bucket plus the date it sorts by.
///
/// Ordered by anchor date first, so sorting keys is sorting them as dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    anchor: NaiveDate,
    kind: BucketKind,
}

impl BucketKey {
    pub fn today(today: NaiveDate) -> Self {
        Self {
            anchor: today,
            kind: BucketKind::Today,
        }
    }

    pub fn yesterday(yesterday: NaiveDate) -> Self {
        Self {
            anchor: yesterday,
            kind: BucketKind::Yesterday,
        }
    }

    pub fn last_week(cutoff: NaiveDate) -> Self {
        Self {
            anchor: cutoff,
            kind: BucketKind::LastWeek,
        }
    }

    /// Month bucket for the month containing `day`.
    pub fn month(day: NaiveDate) -> Self {
        Self {
            anchor: month_anchor(day),
            kind: BucketKind::Month,
        }
    }

    pub fn kind(&self) -> BucketKind {
        self.kind
    }

    /// Date this key sorts by.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// `YYYY/MM/DD` form of the anchor date.
    pub fn date_key(&self) -> String {
        date_key(self.anchor)
    }

    /// Machine label: `today`, `yesterday`, `lastWeek`, or `YYYY/MM/01`.
    pub fn label(&self) -> String {
        match self.kind {
            BucketKind::Today => "today".to_string(),
            BucketKind::Yesterday => "yesterday".to_string(),
            BucketKind::LastWeek => "lastWeek".to_string(),
            BucketKind::Month => self.date_key(),
        }
    }

    /// Heading shown above the bucket.
    pub fn title(&self, rule: WeekRule) -> String {
        match (self.kind, rule) {
            (BucketKind::Today, _) => "Today".to_string(),
            (BucketKind::Yesterday, _) => "Yesterday".to_string(),
            (BucketKind::LastWeek, WeekRule::Rolling) => "This Week".to_string(),
            (BucketKind::LastWeek, WeekRule::OlderThanCutoff) => "Earlier".to_string(),
            (BucketKind::Month, _) => self
                .anchor
                .format(constants::MONTH_TITLE_FORMAT)
                .to_string(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// =============================================================================
// Reference dates
// =============================================================================

/// The three calendar dates every item is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDates {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub last_week: NaiveDate,
}

impl ReferenceDates {
    pub fn from_today(today: NaiveDate) -> Self {
        Self {
            today,
            yesterday: days_before(today, constants::YESTERDAY_OFFSET_DAYS),
            last_week: days_before(today, constants::LAST_WEEK_OFFSET_DAYS),
        }
    }

    /// Reference dates for the local calendar day of `now`.
    pub fn from_now<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::from_today(now.date_naive())
    }
}

// =============================================================================
// Bucket map
// =============================================================================

/// Items grouped by bucket key. Within a bucket, items keep input order
/// until `into_sorted` is called.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMap<V> {
    buckets: BTreeMap<BucketKey, Vec<V>>,
}

impl<V> Default for BucketMap<V> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}

impl<V> BucketMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the bucket for `key`, creating it if absent.
    pub fn insert(&mut self, key: BucketKey, value: V) {
        self.buckets.entry(key).or_default().push(value);
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of items across all buckets.
    pub fn item_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn get(&self, key: &BucketKey) -> Option<&[V]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Keys in ascending date order.
    pub fn keys(&self) -> impl Iterator<Item = &BucketKey> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &[V])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Transform every value, keeping keys and within-bucket order.
    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> BucketMap<W> {
        BucketMap {
            buckets: self
                .buckets
                .into_iter()
                .map(|(key, values)| (key, values.into_iter().map(&mut f).collect()))
                .collect(),
        }
    }

    /// Order buckets by key date and each bucket's items by `posted_at`,
    /// both in `direction`. Equal timestamps keep their input order.
    pub fn into_sorted_by<F>(self, direction: SortDirection, posted_at: F) -> Vec<(BucketKey, Vec<V>)>
    where
        F: Fn(&V) -> DateTime<Utc>,
    {
        let mut sections: Vec<(BucketKey, Vec<V>)> = self.buckets.into_iter().collect();
        sections.sort_by(|(a, _), (b, _)| direction.compare(a, b));
        for (_, items) in &mut sections {
            items.sort_by(|a, b| direction.compare(&posted_at(a), &posted_at(b)));
        }
        sections
    }
}

impl<V: DatedItem> BucketMap<V> {
    pub fn into_sorted(self, direction: SortDirection) -> Vec<(BucketKey, Vec<V>)> {
        self.into_sorted_by(direction, |item: &V| item.posted_at())
    }
}

// =============================================================================
// Bucketer
// =============================================================================

/// Assigns items to buckets relative to one reading of a clock.
#[derive(Debug, Clone)]
pub struct TimelineBucketer<Tz: TimeZone> {
    tz: Tz,
    reference: ReferenceDates,
    rule: WeekRule,
    offset: String,
}

/// Everything that decides which bucket an instant lands in. Two bucketers
/// with equal fingerprints assign every instant to the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketerFingerprint {
    pub reference: ReferenceDates,
    pub rule: WeekRule,
    /// UTC offset of the clock's zone when it was read.
    pub offset: String,
}

impl<Tz: TimeZone> TimelineBucketer<Tz> {
    /// Read `clock` once and fix the reference dates for this pass.
    pub fn new<C: Clock<Tz = Tz>>(clock: &C, rule: WeekRule) -> Self {
        let now = clock.now();
        let reference = ReferenceDates::from_now(&now);
        tracing::debug!(
            today = %date_key(reference.today),
            yesterday = %date_key(reference.yesterday),
            last_week = %date_key(reference.last_week),
            rule = rule.name(),
            "Timeline reference dates fixed"
        );
        Self {
            offset: format!("{:?}", now.offset()),
            tz: now.timezone(),
            reference,
            rule,
        }
    }

    pub fn fingerprint(&self) -> BucketerFingerprint {
        BucketerFingerprint {
            reference: self.reference,
            rule: self.rule,
            offset: self.offset.clone(),
        }
    }

    pub fn reference(&self) -> ReferenceDates {
        self.reference
    }

    pub fn rule(&self) -> WeekRule {
        self.rule
    }

    /// Calendar day of `instant` in the clock's zone.
    pub fn local_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Bucket key for an item posted at `instant`.
    pub fn key_for(&self, instant: DateTime<Utc>) -> BucketKey {
        let day = self.local_day(instant);
        let reference = &self.reference;

        if day == reference.today {
            BucketKey::today(reference.today)
        } else if day == reference.yesterday {
            BucketKey::yesterday(reference.yesterday)
        } else if self.rule.captures(day, reference.last_week) {
            BucketKey::last_week(reference.last_week)
        } else {
            BucketKey::month(day)
        }
    }

    /// Partition arbitrary values, reading each value's instant via `posted_at`.
    pub fn bucket_by<V, F>(&self, items: impl IntoIterator<Item = V>, posted_at: F) -> BucketMap<V>
    where
        F: Fn(&V) -> DateTime<Utc>,
    {
        let mut map = BucketMap::new();
        for item in items {
            let key = self.key_for(posted_at(&item));
            map.insert(key, item);
        }
        tracing::debug!(
            items = map.item_count(),
            buckets = map.len(),
            "Timeline items bucketed"
        );
        map
    }

    /// Partition a slice of dated items by reference.
    pub fn bucket<'a, T: DatedItem>(&self, items: &'a [T]) -> BucketMap<&'a T> {
        self.bucket_by(items, |item: &&'a T| item.posted_at())
    }
}
