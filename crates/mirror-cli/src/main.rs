//! `calmirror` CLI — replay recorded calendar snapshots through the mirror
//! engine and query the resulting view.
//!
//! ## Usage
//!
//! ```sh
//! # Replay a file, printing one JSON line per created/changed/deleted item
//! calmirror replay -i snapshots.json
//!
//! # What is happening at a given instant?
//! calmirror query -i snapshots.json at 2026-03-01T10:30:00
//!
//! # What is next, as seen from a fixed "now"?
//! calmirror query -i snapshots.json --now 2026-03-01T08:00:00Z next
//!
//! # Subject search
//! calmirror query -i snapshots.json subject --partial sync
//! ```
//!
//! Datetimes are RFC 3339 or naive `YYYY-MM-DDTHH:MM:SS` (read as UTC).
//! Logging goes to stderr and honours `RUST_LOG`.

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mirror_engine::{
    parse_datetime, CalendarItem, CalendarMirror, Clock, DetachedBackend, FixedClock, ItemEvent,
    ItemId, MirrorConfig, Replay, SystemClock,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "calmirror",
    version,
    about = "Replay calendar snapshots and query the mirrored view"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file. Only `log_filter` is used here: replay frames
    /// declare their own windows, so `[window]` has no effect.
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every frame and print item notifications as JSON lines
    Replay {
        /// Replay file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Skip printing the final view after the notifications
        #[arg(long)]
        events_only: bool,
    },
    /// Reconcile every frame silently, then run one query
    Query {
        /// Replay file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Treat this instant as the current time
        #[arg(long)]
        now: Option<String>,
        #[command(subcommand)]
        query: QueryCommand,
    },
}

#[derive(Subcommand)]
enum QueryCommand {
    /// Every held item
    All,
    /// Item with the given id
    Id { id: String },
    /// Items by subject: exact match first, then substring
    Subject {
        #[arg(long)]
        exact: Option<String>,
        #[arg(long)]
        partial: Option<String>,
    },
    /// Items in progress at an instant
    At { instant: String },
    /// Items overlapping a range
    Range { start: String, end: String },
    /// Items in progress now
    Now,
    /// The soonest upcoming item(s)
    Next,
}

/// Collects notifications in delivery order.
#[derive(Default)]
struct EventSink {
    events: Mutex<Vec<ItemEvent>>,
}

impl EventSink {
    fn push(&self, event: ItemEvent) {
        self.events.lock().push(event);
    }

    fn take(&self) -> Vec<ItemEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// Final line of `replay` output.
#[derive(Serialize)]
struct ViewLine<'a> {
    event: &'static str,
    items: &'a [CalendarItem],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => MirrorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => MirrorConfig::default(),
    };
    init_logging(&config.log_filter);

    match cli.command {
        Commands::Replay { input, events_only } => {
            let replay = load_replay(input.as_deref())?;
            let mirror = build_mirror(config, Arc::new(SystemClock));

            let events = Arc::new(EventSink::default());
            let sink = events.clone();
            mirror.on_new_item(move |_, item| sink.push(ItemEvent::Created(item.clone())));
            let sink = events.clone();
            mirror.on_item_changed(move |_, item| sink.push(ItemEvent::Changed(item.clone())));
            let sink = events.clone();
            mirror.on_item_deleted(move |_, item| sink.push(ItemEvent::Deleted(item.clone())));

            let reports = replay.apply(&mirror);
            debug!(frames = reports.len(), "replay finished");

            for event in events.take() {
                println!("{}", serde_json::to_string(&event)?);
            }
            if !events_only {
                let items = mirror.all_items()?;
                let line = ViewLine {
                    event: "view",
                    items: &items,
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }
        Commands::Query { input, now, query } => {
            let replay = load_replay(input.as_deref())?;
            let clock: Arc<dyn Clock> = match now.as_deref() {
                Some(raw) => Arc::new(FixedClock::new(parse_instant(raw)?)),
                None => Arc::new(SystemClock),
            };
            let mirror = build_mirror(config, clock);
            replay.apply(&mirror);

            let items = run_query(&mirror, query)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}

fn run_query(mirror: &CalendarMirror, query: QueryCommand) -> Result<Vec<CalendarItem>> {
    let items = match query {
        QueryCommand::All => mirror.all_items()?,
        QueryCommand::Id { id } => mirror.item_by_id(&ItemId::new(id))?.into_iter().collect(),
        QueryCommand::Subject { exact, partial } => {
            if exact.is_none() && partial.is_none() {
                anyhow::bail!("subject query needs --exact and/or --partial");
            }
            mirror.items_by_subject(exact.as_deref(), partial.as_deref())?
        }
        QueryCommand::At { instant } => mirror.items_at(parse_instant(&instant)?)?,
        QueryCommand::Range { start, end } => {
            mirror.items_in_range(parse_instant(&start)?, parse_instant(&end)?)?
        }
        QueryCommand::Now => mirror.items_at_now()?,
        QueryCommand::Next => mirror.next_items()?,
    };
    Ok(items)
}

fn build_mirror(config: MirrorConfig, clock: Arc<dyn Clock>) -> CalendarMirror {
    CalendarMirror::new(Arc::new(DetachedBackend))
        .with_config(config)
        .with_clock(clock)
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    parse_datetime(raw).with_context(|| format!("Failed to parse datetime: {}", raw))
}

fn load_replay(path: Option<&str>) -> Result<Replay> {
    let json = read_input(path)?;
    Replay::from_json(&json).context("Failed to parse replay file")
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
