//! `monthcal` CLI: render calendar months and inspect recurrence descriptors.
//!
//! ## Usage
//!
//! ```sh
//! # Render March 2024 of a list export (stdin → stdout)
//! cat items.json | monthcal render --month 2024-03
//!
//! # Render as JSON, showing timed items in Tokyo time
//! monthcal render -i items.json --month 2024-03 --timezone Asia/Tokyo --format json
//!
//! # Days one descriptor occupies in a month
//! monthcal expand --start 2024-03-04T10:00:00 --end 2024-12-31T11:00:00 \
//!   --month 2024-04 -i rule.xml
//!
//! # Show the parsed rule
//! monthcal parse -i rule.xml
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use tracing::{info, Level};

use month_engine::dates::parse_wall_time;
use month_engine::tracing::{init_tracing, TracingConfig};
use month_engine::{
    expand_month, parse_items, CalendarViewState, EventSpan, ItemOptions, LabelConfig, MonthGrid,
    MonthWindow, Occurrence, PopulateReport, RecurrenceRule, YearMonth,
};

#[derive(Parser)]
#[command(
    name = "monthcal",
    version,
    about = "Month-grid calendar rendering for list-backed calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level written to stderr (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one month of list items as a grid
    Render {
        /// List items JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Month to render as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
        /// List identifier used in cell ids
        #[arg(long, default_value = "Events")]
        list: String,
        /// IANA timezone timed items are shown in
        #[arg(long, default_value = "UTC")]
        timezone: String,
        /// Titles longer than this many characters are cut
        #[arg(long, default_value_t = 10)]
        title_width: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the days one event occupies in a month
    Expand {
        /// Recurrence descriptor file (reads from stdin if omitted; ignored with --single)
        #[arg(short, long)]
        input: Option<String>,
        /// First instance start, local wall time (e.g. 2024-03-04T10:00:00)
        #[arg(long)]
        start: String,
        /// Series end, local wall time
        #[arg(long)]
        end: String,
        /// Month to expand as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
        /// Treat the event as non-recurring
        #[arg(long)]
        single: bool,
        /// Treat the event as all-day
        #[arg(long)]
        all_day: bool,
        #[arg(long, default_value = "Event")]
        title: String,
        #[arg(long, default_value_t = 10)]
        title_width: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a recurrence descriptor and print the rule as JSON
    Parse {
        /// Descriptor file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    #[serde(flatten)]
    grid: &'a MonthGrid,
    report: PopulateReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(TracingConfig::default().with_level(cli.log_level))
        .context("Failed to initialise logging")?;

    match cli.command {
        Commands::Render {
            input,
            output,
            month,
            list,
            timezone,
            title_width,
            format,
        } => {
            let json = read_input(input.as_deref())?;
            let items = parse_items(&json).context("Failed to parse list items JSON")?;
            let options = ItemOptions::with_timezone(&timezone)?;
            let config = label_config(title_width);

            let view = CalendarViewState::new(list, month.unwrap_or_else(current_month));
            let mut grid = MonthGrid::new(view);
            let report = grid.populate(&items, &options, &config);
            info!(
                expanded = report.expanded,
                skipped = report.skipped,
                placed = report.placed,
                "rendered month"
            );

            let rendered = match format {
                OutputFormat::Text => grid.render_text(column_width(title_width)),
                OutputFormat::Json => serde_json::to_string_pretty(&RenderOutput {
                    grid: &grid,
                    report,
                })? + "\n",
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Expand {
            input,
            start,
            end,
            month,
            single,
            all_day,
            title,
            title_width,
            format,
        } => {
            let start = parse_wall_time(&start)
                .with_context(|| format!("Invalid start datetime: {}", start))?;
            let end =
                parse_wall_time(&end).with_context(|| format!("Invalid end datetime: {}", end))?;

            let mut span = EventSpan::new(title, start, end);
            if all_day {
                span = span.all_day();
            }
            if !single {
                let descriptor = read_input(input.as_deref())?;
                let rule = RecurrenceRule::parse(descriptor.trim())
                    .context("Failed to parse recurrence descriptor")?;
                span = span.with_rule(rule);
            }

            let window = MonthWindow::for_month(month.unwrap_or_else(current_month));
            let occurrences = expand_month(&span, &window, &label_config(title_width));
            let rendered = match format {
                OutputFormat::Text => occurrences_text(&occurrences),
                OutputFormat::Json => serde_json::to_string_pretty(&occurrences)? + "\n",
            };
            print!("{}", rendered);
        }
        Commands::Parse { input, output } => {
            let descriptor = read_input(input.as_deref())?;
            let rule = RecurrenceRule::parse(descriptor.trim())
                .context("Failed to parse recurrence descriptor")?;
            let pretty = serde_json::to_string_pretty(&rule)? + "\n";
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

fn current_month() -> YearMonth {
    YearMonth::of(Local::now().date_naive())
}

fn label_config(title_width: usize) -> LabelConfig {
    LabelConfig {
        title_max_chars: title_width,
        ..LabelConfig::default()
    }
}

/// Text column width: the title plus room for a time prefix and ellipsis.
fn column_width(title_width: usize) -> usize {
    title_width.saturating_add(9)
}

/// One `day<TAB>label` line per occurrence.
fn occurrences_text(occurrences: &[Occurrence]) -> String {
    occurrences
        .iter()
        .map(|occurrence| format!("{}\t{}\n", occurrence.day, occurrence.display_text))
        .collect()
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
