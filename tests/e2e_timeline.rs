// Feedline - tests/e2e_timeline.rs
//
// End-to-end tests for the feed pipeline: a real JSON document on disk,
// loaded, validated, bucketed against a fixed clock, and exported. The last
// tests drive the compiled binary.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use feedline::app::feed::{find_article, load_feed};
use feedline::app::state::FeedState;
use feedline::core::bucket::{BucketKind, TimelineBucketer, WeekRule};
use feedline::core::clock::FixedClock;
use feedline::core::export::{export, ExportContext, ExportFormat};
use feedline::core::model::{Article, SortDirection};
use feedline::core::thread::{flatten_thread, participants};
use feedline::core::timeline::TimelineSection;
use feedline::util::error::InvalidInputError;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to an on-disk fixture file.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

fn load_state() -> FeedState {
    let report = load_feed(&fixture("feed.json")).expect("fixture should load");
    FeedState::from_report(report)
}

fn outline(sections: &[TimelineSection<&Article>]) -> Vec<(String, Vec<String>)> {
    sections
        .iter()
        .map(|s| {
            (
                s.title.clone(),
                s.rows.iter().map(|r| r.item.title.clone()).collect(),
            )
        })
        .collect()
}

fn owned(title: &str, rows: &[&str]) -> (String, Vec<String>) {
    (
        title.to_string(),
        rows.iter().map(|r| r.to_string()).collect(),
    )
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn e2e_invalid_articles_are_rejected_and_reported() {
    let report = load_feed(&fixture("feed.json")).unwrap();

    assert_eq!(report.articles.len(), 6);
    assert_eq!(report.rejected_count(), 2);
    assert_eq!(report.truncated, 0);
    assert!(report
        .articles
        .iter()
        .all(|a| a.title != "Broken" && !a.title.is_empty()));

    assert!(matches!(
        report.issues[0],
        InvalidInputError::CommentTimestamp { ref comment_id, .. } if comment_id == "2"
    ));
    assert!(matches!(
        report.issues[1],
        InvalidInputError::UnparseableTimestamp { index: 6, ref title, .. } if title == "Broken"
    ));
    assert!(matches!(
        report.issues[2],
        InvalidInputError::EmptyTitle { index: 7 }
    ));
}

// =============================================================================
// Timeline
// =============================================================================

#[test]
fn e2e_rolling_timeline_latest_first() {
    let mut state = load_state();
    let bucketer = TimelineBucketer::new(&FixedClock::new(now()), WeekRule::Rolling);
    let sections = state.timeline(&bucketer, SortDirection::Latest);

    assert_eq!(
        outline(&sections),
        vec![
            owned("Today", &["Launch day AMA", "Morning digest"]),
            owned("Yesterday", &["Yesterday recap"]),
            owned("This Week", &["Midweek notes"]),
            owned("March 2024", &["Early March"]),
            owned("February 2024", &["February roundup"]),
        ]
    );

    assert!(sections[0].first);
    assert!(!sections[1].first);
    assert_eq!(sections[2].key.kind(), BucketKind::LastWeek);
    assert_eq!(sections[3].key.label(), "2024/03/01");
    assert_eq!(sections[4].key.label(), "2024/02/01");

    let ama = &sections[0].rows[0];
    assert!(ama.margin_top);
    assert!(!ama.margin_bottom);
    assert!(ama.next_is_default);
}

#[test]
fn e2e_earliest_order_reverses_buckets_and_items() {
    let mut state = load_state();
    let bucketer = TimelineBucketer::new(&FixedClock::new(now()), WeekRule::Rolling);

    state.timeline(&bucketer, SortDirection::Latest);
    let earliest = outline(&state.timeline(&bucketer, SortDirection::Earliest));

    assert_eq!(earliest.first().unwrap().0, "February 2024");
    assert_eq!(
        earliest.last().unwrap(),
        &owned("Today", &["Morning digest", "Launch day AMA"])
    );
    assert_eq!(state.cache_stats().hits, 1);
    assert_eq!(state.cache_stats().misses, 1);
}

#[test]
fn e2e_older_than_cutoff_rule() {
    let mut state = load_state();
    let bucketer = TimelineBucketer::new(&FixedClock::new(now()), WeekRule::OlderThanCutoff);
    let sections = state.timeline(&bucketer, SortDirection::Latest);

    assert_eq!(
        outline(&sections),
        vec![
            owned("Today", &["Launch day AMA", "Morning digest"]),
            owned("Yesterday", &["Yesterday recap"]),
            owned("Earlier", &["Early March", "February roundup"]),
            owned("March 2024", &["Midweek notes"]),
        ]
    );
}

#[test]
fn e2e_day_boundaries_follow_clock_zone() {
    let mut state = load_state();
    let tz = FixedOffset::east_opt(10 * 3600).unwrap();
    let clock = FixedClock::new(now().with_timezone(&tz));
    let bucketer = TimelineBucketer::new(&clock, WeekRule::Rolling);
    let sections = state.timeline(&bucketer, SortDirection::Latest);

    // 2024-03-09T18:00Z is already the 10th at +10:00.
    assert_eq!(
        outline(&sections)[0],
        owned("Today", &["Launch day AMA", "Morning digest", "Yesterday recap"])
    );
    assert!(sections
        .iter()
        .all(|s| s.key.kind() != BucketKind::Yesterday));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn e2e_csv_export_to_file() {
    let mut state = load_state();
    let bucketer = TimelineBucketer::new(&FixedClock::new(now()), WeekRule::Rolling);
    let sections = state.timeline(&bucketer, SortDirection::Latest);
    let context = ExportContext {
        generated_at: now(),
        sort: SortDirection::Latest,
        week_rule: WeekRule::Rolling,
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeline.csv");
    let file = fs::File::create(&path).unwrap();
    let count = export(ExportFormat::Csv, &sections, &context, file, &path).unwrap();
    assert_eq!(count, 6);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[1],
        "today,2024/03/10,Launch day AMA,2024-03-10T09:00:00+00:00,ama"
    );
    assert_eq!(
        lines[6],
        "2024/02/01,2024/02/01,February roundup,2024-02-15T11:00:00+00:00,"
    );
}

// =============================================================================
// Threads
// =============================================================================

#[test]
fn e2e_thread_flattening_and_participants() {
    let report = load_feed(&fixture("feed.json")).unwrap();
    let article = find_article(&report.articles, "Launch day AMA").unwrap();

    let rows = flatten_thread(&article.comments, now(), 32);
    let authors: Vec<&str> = rows.iter().map(|r| r.author).collect();
    assert_eq!(authors, vec!["ana", "ben", "cy", "dee", "eve", "fay", "gus"]);

    let depths: Vec<usize> = rows.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 0, 0, 0, 0]);
    assert_eq!(rows[2].indent_px, 64);
    assert_eq!(rows[0].age, "2 hours ago");
    assert_eq!(rows[1].age, "1 hour ago");
    assert_eq!(rows[1].votes, 2);
    assert_eq!(rows[3].age, "");

    let summary = participants(article, 4).unwrap();
    assert_eq!(
        summary.avatars,
        vec![
            Some("https://img.example/ana.png"),
            Some("https://img.example/dee.png"),
            None,
            Some("https://img.example/fay.png"),
        ]
    );
    assert_eq!(summary.overflow, 1);

    let quiet = find_article(&report.articles, "Morning digest").unwrap();
    assert!(participants(quiet, 4).is_none());
}

// =============================================================================
// Binary
// =============================================================================

fn feedline(config: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_feedline"));
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

#[test]
fn e2e_cli_timeline_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[timeline]\nsort = \"earliest\"\n").unwrap();

    let output = feedline(&config)
        .args(["timeline", "--now", "2024-03-10T12:00:00Z", "--utc", "--format", "json"])
        .arg(fixture("feed.json"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sort"], "earliest");
    assert_eq!(value["sections"][0]["title"], "February 2024");
    assert_eq!(value["sections"][4]["bucket"], "today");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken"));
}

#[test]
fn e2e_cli_unknown_article_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let output = feedline(&config)
        .args(["thread", "--article", "Nope"])
        .arg(fixture("feed.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No article titled 'Nope'"));
}

#[test]
fn e2e_cli_thread_warns_on_oversized_indent() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let output = feedline(&config)
        .args([
            "thread",
            "--article",
            "Launch day AMA",
            "--now",
            "2024-03-10T12:00:00Z",
            "--indent-px",
            "9000",
            "--format",
            "json",
        ])
        .arg(fixture("feed.json"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--indent-px 9000 is out of range"));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["rows"][1]["indent_px"], 256);
    assert_eq!(value["comment_count"], 7);
}

#[cfg(target_os = "linux")]
#[test]
fn e2e_cli_json_write_failure_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let output = feedline(&config)
        .args([
            "timeline",
            "--utc",
            "--now",
            "2024-03-10T12:00:00Z",
            "--format",
            "json",
            "--output",
            "/dev/full",
        ])
        .arg(fixture("feed.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Export error"));
}

