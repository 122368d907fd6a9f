//! `horario`: venue opening hours from the command line.
//!
//! Reads free-text schedule text (from `--file` or stdin) and either:
//!
//! 1. **`status`** → prints whether the venue is open now, at `--at`, or at
//!    an explicit `--weekday`/`--time`
//! 2. **`week`** → prints the Monday-first weekly breakdown with today marked
//! 3. **`format`** → rewrites the text in canonical form
//! 4. **`set`** → changes the named day(s) and prints the canonical text
//!
//! Local time is derived from UTC with a fixed offset (`--utc-offset-minutes`
//! or `HORARIO_UTC_OFFSET_MINUTES`, default Brasília).

use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use horario_common::schedule::{format, LineHours};
use horario_common::status::{describe_week, is_open_now, DayStatus, Now};
use horario_common::venue::{edit_hours, BRASILIA_UTC_OFFSET_MINUTES};
use horario_common::{resolve_days, LocalTime, WeekdayKey, WeeklySchedule};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "horario", version, about = "Venue opening hours engine")]
struct Cli {
    /// Schedule text file. Reads stdin when omitted.
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Venue offset from UTC in minutes (Brasília is -180).
    #[arg(
        long,
        global = true,
        env = "HORARIO_UTC_OFFSET_MINUTES",
        default_value_t = BRASILIA_UTC_OFFSET_MINUTES,
        allow_hyphen_values = true
    )]
    utc_offset_minutes: i32,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Is the venue open?
    Status(WhenArgs),
    /// Weekly hours, Monday first, with today marked.
    Week(WhenArgs),
    /// Rewrite the schedule text in canonical form.
    Format,
    /// Change the hours of the named day(s) and print the canonical text.
    Set(SetArgs),
}

#[derive(Args, Debug)]
struct WhenArgs {
    /// UTC instant, RFC3339 (default: the system clock).
    #[arg(long, conflicts_with = "weekday")]
    at: Option<String>,

    /// Local weekday: key ("fri") or Portuguese name ("sexta").
    #[arg(long, requires = "time")]
    weekday: Option<String>,

    /// Local time of day, HH:MM.
    #[arg(long, requires = "weekday")]
    time: Option<String>,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Days to change: a key ("fri") or a descriptor as written in
    /// schedule text ("sexta", "segunda a sexta", "sexta e sábado").
    days: String,

    /// "HH:MM - HH:MM" or "FECHADO".
    hours: String,
}

#[derive(Serialize)]
struct StatusReport {
    open: bool,
    weekday: WeekdayKey,
    time: LocalTime,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let raw = read_input(cli.file.as_ref())?;
    let output = run(&cli, &raw)?;
    println!("{output}");
    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading schedule from {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading schedule from stdin")?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli, raw: &str) -> anyhow::Result<String> {
    match &cli.command {
        Command::Status(when) => {
            let now = resolve_now(when, cli.utc_offset_minutes)?;
            let open = is_open_now(&WeeklySchedule::parse(raw), now);
            tracing::debug!(?now, open, "status evaluated");
            if cli.json {
                let report = StatusReport {
                    open,
                    weekday: now.weekday,
                    time: now.time,
                };
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(if open { "open" } else { "closed" }.to_string())
            }
        }
        Command::Week(when) => {
            let now = resolve_now(when, cli.utc_offset_minutes)?;
            let rows = describe_week(&WeeklySchedule::parse(raw), now.weekday);
            if cli.json {
                Ok(serde_json::to_string_pretty(&rows)?)
            } else {
                Ok(render_week(&rows))
            }
        }
        Command::Format => {
            let schedule = WeeklySchedule::parse(raw);
            if cli.json {
                Ok(serde_json::to_string_pretty(&schedule)?)
            } else {
                Ok(format(&schedule))
            }
        }
        Command::Set(args) => {
            let days = match args.days.parse::<WeekdayKey>() {
                Ok(day) => BTreeSet::from([day]),
                Err(_) => resolve_days(&args.days),
            };
            if days.is_empty() {
                bail!("no weekday matches {:?}", args.days);
            }
            let Some(hours) = LineHours::parse(&args.hours) else {
                bail!("expected \"HH:MM - HH:MM\" or \"FECHADO\", got {:?}", args.hours);
            };
            Ok(edit_hours(raw, days, hours.into()))
        }
    }
}

fn resolve_now(when: &WhenArgs, utc_offset_minutes: i32) -> anyhow::Result<Now> {
    if let (Some(weekday), Some(time)) = (&when.weekday, &when.time) {
        return Ok(Now::new(weekday.parse()?, time.parse()?));
    }
    let utc = match &when.at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("--at must be RFC3339, got {at:?}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    Ok(Now::from_datetime(utc, utc_offset_minutes)?)
}

fn render_week(rows: &[DayStatus]) -> String {
    rows.iter()
        .map(|row| {
            let marker = if row.is_today { "*" } else { " " };
            format!("{marker} {:<8} {}", row.day_name, row.display_text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
