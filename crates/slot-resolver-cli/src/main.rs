use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use slot_resolver::calendar::{format_date, parse_year_month};
use slot_resolver::{
    month_grid, AvailabilityQuery, AvailabilityResolver, BookedSlot, BookedSlots,
    ManualTimePolicy, SlotStatus, WeeklyTemplate,
};

#[derive(Parser)]
#[command(name = "slots", version, about = "Consultation slot availability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Sources {
    /// Weekly template JSON (defaults to the reference hours)
    #[arg(long)]
    template: Option<PathBuf>,

    /// JSON array of booked {date, time} slots
    #[arg(long)]
    booked: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Sunday-aligned grid of a month
    Grid {
        /// Month as YYYY-MM
        #[arg(long)]
        month: String,
    },
    /// Show whether a date is selectable and its slots
    Day {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Reference date (defaults to the local date)
        #[arg(long)]
        today: Option<String>,

        #[command(flatten)]
        sources: Sources,
    },
    /// Resolve a whole month, optionally with a selected date
    Month {
        /// Month as YYYY-MM
        #[arg(long)]
        month: String,

        /// Reference date (defaults to the local date)
        #[arg(long)]
        today: Option<String>,

        /// Selected date within the month
        #[arg(long)]
        selected: Option<String>,

        #[command(flatten)]
        sources: Sources,
    },
    /// Check a hand-typed time
    CheckTime {
        #[arg(long)]
        date: String,

        #[arg(long)]
        time: String,

        /// Reject times that collide with a booked slot
        #[arg(long)]
        reject_booked: bool,

        #[command(flatten)]
        sources: Sources,
    },
}

#[derive(Serialize)]
struct DayReport {
    date: String,
    selectable: bool,
    warning: Option<String>,
    slots: Vec<SlotStatus>,
}

#[derive(Serialize)]
struct ManualTimeReport {
    date: String,
    time: String,
    warning: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grid { month } => {
            let (year, month) = parse_year_month(&month)?;
            print_json(&month_grid(year, month)?)
        }
        Commands::Day {
            date,
            today,
            sources,
        } => {
            let resolver = load_resolver(sources.template.as_deref())?;
            let booked = load_booked(sources.booked.as_deref())?;
            let today = today.unwrap_or_else(local_today);

            let report = DayReport {
                selectable: resolver.is_date_selectable(&date, &today)?,
                warning: resolver.closed_day_warning(&date)?,
                slots: resolver.slots_for_date(&date, &booked)?,
                date,
            };
            print_json(&report)
        }
        Commands::Month {
            month,
            today,
            selected,
            sources,
        } => {
            let (year, month) = parse_year_month(&month)?;
            let resolver = load_resolver(sources.template.as_deref())?;
            let booked = load_booked(sources.booked.as_deref())?;

            let mut query = AvailabilityQuery::new(year, month, today.unwrap_or_else(local_today))
                .with_booked(booked);
            if let Some(date) = selected {
                query = query.with_selected(date);
            }
            print_json(&resolver.resolve(&query)?)
        }
        Commands::CheckTime {
            date,
            time,
            reject_booked,
            sources,
        } => {
            let resolver = load_resolver(sources.template.as_deref())?;
            let booked = load_booked(sources.booked.as_deref())?;
            let policy = if reject_booked {
                ManualTimePolicy::RejectBooked
            } else {
                ManualTimePolicy::TemplateBypass
            };

            let warning = resolver.check_manual_time(&date, &time, &booked, policy)?;
            print_json(&ManualTimeReport {
                date,
                time,
                warning,
            })
        }
    }
}

fn local_today() -> String {
    format_date(chrono::Local::now().date_naive())
}

fn load_resolver(path: Option<&Path>) -> Result<AvailabilityResolver> {
    let template = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading template {}", path.display()))?;
            WeeklyTemplate::from_json(&json)
                .with_context(|| format!("loading template {}", path.display()))?
        }
        None => WeeklyTemplate::reference(),
    };
    Ok(AvailabilityResolver::new(template))
}

fn load_booked(path: Option<&Path>) -> Result<BookedSlots> {
    let Some(path) = path else {
        return Ok(BookedSlots::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading booked slots {}", path.display()))?;
    let slots: Vec<BookedSlot> = serde_json::from_str(&json)
        .with_context(|| format!("parsing booked slots {}", path.display()))?;
    debug!(count = slots.len(), "loaded booked slots");
    Ok(slots.into_iter().collect())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{out}");
    Ok(())
}
