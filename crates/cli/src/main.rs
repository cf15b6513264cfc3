// # -----------------------------
// # crates/cli/src/main.rs
// # -----------------------------
use std::path::PathBuf;

use actlog::{Activity, ActivityLog, Clock, DataKind, Principal, SystemClock};
use actlog_common::config::{self, ResolvedConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "actlog", version, about = "Inspect and append to an activity log", long_about = None)]
struct Cli {
    /// Backing log file. Overrides ACTLOG_FILE and actlog.toml.
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error, off). Overrides RUST_LOG if set.
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the log, newest first
    List {
        /// Print the records as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Record an action whose payload is a URL
    AddUrl {
        #[command(flatten)]
        actor: ActorArgs,
        url: String,
    },
    /// Record an action whose payload is a file path
    AddFile {
        #[command(flatten)]
        actor: ActorArgs,
        path: String,
    },
    /// Rewrite the file without expired records
    Compact,
    /// Show the resolved configuration
    Config,
}

#[derive(Args, Debug)]
struct ActorArgs {
    /// Display name of the actor
    #[arg(long)]
    user: String,
    /// Stable identifier; omit for non-player actors
    #[arg(long)]
    uuid: Option<Uuid>,
    /// Action category (e.g. profiler, heapdump)
    #[arg(long = "type", value_name = "TYPE")]
    activity_type: String,
}

impl ActorArgs {
    fn principal(&self) -> Principal {
        Principal {
            name: self.user.clone(),
            id: self.uuid,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let cwd = std::env::current_dir().context("unable to determine current directory")?;
    let resolved = config::resolve(cli.file.clone(), &cwd)?;
    debug!(file = %resolved.file.display(), source = ?resolved.file_source, "resolved log file");

    match cli.command {
        Commands::List { json } => list(&resolved, json),
        Commands::AddUrl { actor, url } => add(&resolved, |now| {
            Activity::url(&actor.principal(), now, actor.activity_type.clone(), url)
        }),
        Commands::AddFile { actor, path } => add(&resolved, |now| {
            Activity::file(&actor.principal(), now, actor.activity_type.clone(), path)
        }),
        Commands::Compact => compact(&resolved),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(())
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(resolved: &ResolvedConfig) -> Result<ActivityLog> {
    let log = ActivityLog::new(&resolved.file);
    log.try_load()
        .with_context(|| format!("failed to load '{}'", resolved.file.display()))?;
    Ok(log)
}

fn list(resolved: &ResolvedConfig, json: bool) -> Result<()> {
    let log = open(resolved)?;
    let records = log.get_log();

    if json {
        let documents: Vec<_> = records.iter().map(Activity::serialize).collect();
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No activity recorded.");
        return Ok(());
    }

    let now = SystemClock.now_millis();
    for activity in &records {
        println!("{}", render(activity, now));
    }
    Ok(())
}

fn add(resolved: &ResolvedConfig, build: impl FnOnce(i64) -> Activity) -> Result<()> {
    let log = open(resolved)?;
    let activity = build(SystemClock.now_millis());
    let line = render(&activity, activity.time());
    log.try_add_to_log(activity)
        .with_context(|| format!("failed to write '{}'", resolved.file.display()))?;
    println!("{line}");
    Ok(())
}

fn compact(resolved: &ResolvedConfig) -> Result<()> {
    let log = open(resolved)?;
    let report = log
        .try_save()
        .with_context(|| format!("failed to write '{}'", resolved.file.display()))?;
    println!(
        "kept {} record(s), dropped {} expired",
        report.written, report.expired
    );
    Ok(())
}

fn render(activity: &Activity, now: i64) -> String {
    let when = DateTime::<Utc>::from_timestamp_millis(activity.time())
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| activity.time().to_string());
    let actor = if activity.is_player() { "player" } else { "other" };
    let mut line = format!(
        "{when}  {} ({actor})  {}  {}: {}",
        activity.user(),
        activity.activity_type(),
        activity.data_kind(),
        activity.data_value()
    );
    if let (DataKind::Url, Some(deadline)) = (activity.data_kind(), activity.expires_at()) {
        if activity.should_expire_at(now) {
            line.push_str("  [expired]");
        } else {
            let days = (deadline - now) / (24 * 60 * 60 * 1000);
            line.push_str(&format!("  [expires in {days}d]"));
        }
    }
    line
}
