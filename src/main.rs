// Feedline - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the timeline and thread commands

use chrono::{DateTime, FixedOffset, Local, Utc};
use clap::{Args, Parser, Subcommand};
use feedline::app::feed::{find_article, load_feed};
use feedline::app::state::FeedState;
use feedline::core::bucket::{TimelineBucketer, WeekRule};
use feedline::core::clock::{Clock, FixedClock, SystemClock};
use feedline::core::export::{self, ExportContext, ExportFormat};
use feedline::core::ingest::IngestReport;
use feedline::core::model::SortDirection;
use feedline::core::thread::{flatten_thread, participants};
use feedline::platform::config::{self, AppConfig, CalendarZone, PlatformPaths};
use feedline::util::{constants, logging};
use feedline::util::error::{self, ConfigError, ExportError, FeedlineError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Feedline - chronological feed timelines from the command line.
///
/// Groups articles into Today, Yesterday, the past week and calendar months,
/// and renders comment threads as indented rows.
#[derive(Parser, Debug)]
#[command(name = "feedline", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a feed as date-bucketed sections.
    Timeline(TimelineArgs),

    /// Print one article's comment thread.
    Thread(ThreadArgs),
}

#[derive(Args, Debug)]
struct TimelineArgs {
    /// Feed JSON document.
    feed: PathBuf,

    /// Ordering of buckets and of articles inside them.
    #[arg(short = 's', long = "sort", value_enum)]
    sort: Option<SortDirection>,

    /// Evaluate the timeline as of this RFC 3339 instant.
    #[arg(long = "now", value_parser = parse_now)]
    now: Option<DateTime<FixedOffset>>,

    /// Use UTC calendar days instead of the local zone.
    #[arg(long = "utc")]
    utc: bool,

    /// How the past-week bucket is chosen.
    #[arg(long = "week-rule", value_enum)]
    week_rule: Option<WeekRule>,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = ExportFormat::Text)]
    format: ExportFormat,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ThreadArgs {
    /// Feed JSON document.
    feed: PathBuf,

    /// Exact title of the article.
    #[arg(short = 'a', long = "article")]
    article: String,

    /// Compute comment ages as of this RFC 3339 instant.
    #[arg(long = "now", value_parser = parse_now)]
    now: Option<DateTime<FixedOffset>>,

    /// Indentation per reply level in px (overrides config).
    #[arg(long = "indent-px")]
    indent_px: Option<u32>,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = ExportFormat::Text)]
    format: ExportFormat,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn parse_now(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn main() {
    let cli = Cli::parse();

    // Resolve config before logging so the configured level applies.
    let config_path = match cli.config {
        Some(ref path) => path.clone(),
        None => PlatformPaths::resolve().config_file(),
    };
    if cli.config.is_some() && !config_path.exists() {
        let err = FeedlineError::Config(ConfigError::Io {
            path: config_path,
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        });
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
    let (app_config, config_warnings) = config::load_config(&config_path);

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "Feedline starting"
    );

    for warning in &config_warnings {
        tracing::warn!(error = %warning, "Config warning");
        eprintln!("Warning: {warning}");
    }

    if let Err(e) = run(cli.command, &app_config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, app_config: &AppConfig) -> error::Result<()> {
    match command {
        Command::Timeline(args) => timeline_command(args, app_config),
        Command::Thread(args) => thread_command(args, app_config),
    }
}

/// Surface ingestion problems without aborting the command.
fn report_issues(report: &IngestReport) {
    for issue in &report.issues {
        let severity = if issue.is_rejection() { "skipped" } else { "warning" };
        eprintln!("{severity}: {issue}");
    }
    if report.truncated > 0 {
        eprintln!(
            "warning: {} articles beyond the limit of {} were ignored",
            report.truncated,
            constants::MAX_ARTICLES
        );
    }
}

fn timeline_command(args: TimelineArgs, app_config: &AppConfig) -> error::Result<()> {
    let report = load_feed(&args.feed)?;
    report_issues(&report);
    let mut state = FeedState::from_report(report);

    let options = TimelineOptions {
        sort: args.sort.unwrap_or(app_config.sort),
        rule: args.week_rule.unwrap_or(app_config.week_rule),
        format: args.format,
        output: args.output.as_deref(),
    };
    let use_utc = args.utc || app_config.zone == CalendarZone::Utc;

    match (args.now, use_utc) {
        (Some(now), true) => write_timeline(&mut state, &FixedClock::new(now.with_timezone(&Utc)), &options),
        (Some(now), false) => write_timeline(&mut state, &FixedClock::new(now), &options),
        (None, true) => write_timeline(&mut state, &SystemClock::new(Utc), &options),
        (None, false) => write_timeline(&mut state, &SystemClock::new(Local), &options),
    }
}

struct TimelineOptions<'a> {
    sort: SortDirection,
    rule: WeekRule,
    format: ExportFormat,
    output: Option<&'a Path>,
}

fn write_timeline<C: Clock>(
    state: &mut FeedState,
    clock: &C,
    options: &TimelineOptions<'_>,
) -> error::Result<()> {
    let bucketer = TimelineBucketer::new(clock, options.rule);
    let context = ExportContext {
        generated_at: clock.now().with_timezone(&Utc),
        sort: options.sort,
        week_rule: options.rule,
    };
    let sections = state.timeline(&bucketer, options.sort);

    let count = with_output(options.output, |writer, path| {
        export::export(options.format, &sections, &context, writer, path)
    })?;

    tracing::info!(
        articles = count,
        sections = sections.len(),
        format = ?options.format,
        "Timeline written"
    );
    Ok(())
}

fn thread_command(args: ThreadArgs, app_config: &AppConfig) -> error::Result<()> {
    let report = load_feed(&args.feed)?;
    report_issues(&report);

    let article = find_article(&report.articles, &args.article)?;
    let now = args
        .now
        .map(|n| n.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let indent_px = clamp_indent(args.indent_px.unwrap_or(app_config.indent_px));

    let rows = flatten_thread(&article.comments, now, indent_px);
    let summary = participants(article, app_config.participant_preview);

    let count = with_output(args.output.as_deref(), |writer, path| {
        export::export_thread(args.format, article, summary.as_ref(), &rows, writer, path)
    })?;

    tracing::info!(rows = count, article = %article.title, "Thread written");
    Ok(())
}

/// Cap the per-level indentation, warning when a request exceeds it.
fn clamp_indent(requested: u32) -> u32 {
    let max = constants::MAX_COMMENT_INDENT_PX;
    if requested <= max {
        return requested;
    }
    tracing::warn!(requested, max, "Indentation out of range; using maximum");
    eprintln!("Warning: --indent-px {requested} is out of range. Expected: 0-{max}; using {max}");
    max
}

/// Run `write` against the output file, or stdout when no file is given.
fn with_output<F>(output: Option<&Path>, write: F) -> Result<usize, ExportError>
where
    F: FnOnce(Box<dyn Write>, &Path) -> Result<usize, ExportError>,
{
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| ExportError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            write(Box::new(BufWriter::new(file)), path)
        }
        None => write(Box::new(io::stdout().lock()), Path::new("-")),
    }
}
