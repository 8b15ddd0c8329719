// Feedline - app/state.rs
//
// Loaded feed plus a memoised bucket partition. The partition is recomputed
// only when the article list changes or when a bucketer with different
// reference dates, week rule or zone asks for it.

use crate::core::bucket::{BucketMap, BucketerFingerprint, TimelineBucketer};
use crate::core::ingest::IngestReport;
use crate::core::model::{Article, SortDirection};
use crate::core::timeline::{sections_from, TimelineSection};
use chrono::TimeZone;

#[derive(Debug, Clone)]
struct CachedBuckets {
    generation: u64,
    fingerprint: BucketerFingerprint,
    buckets: BucketMap<usize>,
}

/// Hit/miss counters for the bucket cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Articles currently on display and the work derived from them.
#[derive(Debug, Default)]
pub struct FeedState {
    articles: Vec<Article>,

    /// Bumped on every mutation of `articles`.
    generation: u64,

    cache: Option<CachedBuckets>,
    stats: CacheStats,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from the accepted articles of an ingestion result.
    pub fn from_report(report: IngestReport) -> Self {
        let mut state = Self::new();
        state.replace_articles(report.articles);
        state
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    /// Swap in a new article list, invalidating the partition.
    pub fn replace_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.invalidate();
    }

    /// Append one article, invalidating the partition.
    pub fn push(&mut self, article: Article) {
        self.articles.push(article);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.cache = None;
    }

    /// Sorted, laid-out timeline for the current articles.
    ///
    /// Changing only `direction` reuses the cached partition.
    pub fn timeline<Tz: TimeZone>(
        &mut self,
        bucketer: &TimelineBucketer<Tz>,
        direction: SortDirection,
    ) -> Vec<TimelineSection<&Article>> {
        let fingerprint = bucketer.fingerprint();
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.generation == self.generation && c.fingerprint == fingerprint);

        if fresh {
            self.stats.hits += 1;
            tracing::debug!(generation = self.generation, "Bucket cache hit");
        } else {
            self.stats.misses += 1;
            tracing::debug!(generation = self.generation, "Bucket cache miss; repartitioning");
            let articles = &self.articles;
            let buckets = bucketer.bucket_by(0..articles.len(), |&i: &usize| articles[i].posted_at);
            self.cache = Some(CachedBuckets {
                generation: self.generation,
                fingerprint,
                buckets,
            });
        }

        let articles = &self.articles;
        let buckets = match &self.cache {
            Some(cache) => cache.buckets.clone(),
            None => BucketMap::new(),
        };
        sections_from(buckets.map_values(|i| &articles[i]), bucketer, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bucket::{BucketKind, WeekRule};
    use crate::core::clock::FixedClock;
    use chrono::{DateTime, Utc};

    fn article(title: &str, at: DateTime<Utc>) -> Article {
        Article {
            title: title.to_string(),
            posted_at: at,
            format: None,
            slug: None,
            author: None,
            upvotes: 0,
            comments: Vec::new(),
        }
    }

    fn bucketer(day: u32) -> TimelineBucketer<Utc> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap());
        TimelineBucketer::new(&clock, WeekRule::Rolling)
    }

    fn state() -> FeedState {
        let mut state = FeedState::new();
        state.replace_articles(vec![
            article("a", Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()),
            article("b", Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
            article("c", Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap()),
        ]);
        state
    }

    fn titles(sections: &[TimelineSection<&Article>]) -> Vec<Vec<String>> {
        sections
            .iter()
            .map(|s| s.rows.iter().map(|r| r.item.title.clone()).collect())
            .collect()
    }

    #[test]
    fn test_sort_change_reuses_partition() {
        let mut state = state();
        let b = bucketer(10);

        let latest = titles(&state.timeline(&b, SortDirection::Latest));
        let earliest = titles(&state.timeline(&b, SortDirection::Earliest));

        assert_eq!(latest, vec![vec!["b", "a"], vec!["c"]]);
        assert_eq!(earliest, vec![vec!["c"], vec!["a", "b"]]);
        assert_eq!(state.cache_stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_mutation_invalidates_partition() {
        let mut state = state();
        let b = bucketer(10);
        state.timeline(&b, SortDirection::Latest);

        let before = state.generation();
        state.push(article("d", Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap()));
        assert_eq!(state.generation(), before + 1);

        let kinds: Vec<BucketKind> = state
            .timeline(&b, SortDirection::Latest)
            .iter()
            .map(|s| s.key.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![BucketKind::Today, BucketKind::Yesterday, BucketKind::Month]
        );
        assert_eq!(state.cache_stats().misses, 2);
    }

    #[test]
    fn test_new_reference_day_invalidates_partition() {
        let mut state = state();
        state.timeline(&bucketer(10), SortDirection::Latest);
        let first = state.timeline(&bucketer(11), SortDirection::Latest)[0].key;

        assert_eq!(first.kind(), BucketKind::Yesterday);
        assert_eq!(state.cache_stats(), CacheStats { hits: 0, misses: 2 });
    }

    #[test]
    fn test_empty_state() {
        let mut state = FeedState::new();
        assert!(state.timeline(&bucketer(10), SortDirection::Latest).is_empty());
    }

    #[test]
    fn test_from_report_keeps_accepted_articles() {
        let report = IngestReport {
            articles: vec![article("a", Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap())],
            issues: vec![crate::util::error::InvalidInputError::EmptyTitle { index: 1 }],
            truncated: 0,
        };
        let mut state = FeedState::from_report(report);
        assert_eq!(state.articles().len(), 1);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.timeline(&bucketer(10), SortDirection::Latest).len(), 1);
    }
}

