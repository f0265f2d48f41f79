//! teelog CLI
//!
//! Drives the multi-sink logger from the command line: writes sample
//! records, emits single records and runs the health monitor with its
//! samples bridged into the configured sinks.
//!
//! ## Usage
//!
//! ```bash
//! # One record per severity to logs/teelog.log and stdout
//! teelog --level debug demo
//!
//! # A single structured record, file only
//! teelog --no-console emit --level warn --message "disk almost full" --field mount=/var
//!
//! # Sample process health every 2s for 10s
//! teelog monitor --interval-secs 2 --duration-secs 10
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use teelog_core::config::DEFAULT_LOG_PATH;
use teelog_core::{
    console_sink, file_sink, with_file_path, with_level, with_max_backups, with_rotate_settings,
    Field, Handle, Level, LoggerCell, SinkBuilder, TeeLayer,
};
use teelog_monitor::Monitor;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;

/// teelog - multi-sink structured logging
#[derive(Parser)]
#[command(name = "teelog")]
#[command(version)]
#[command(about = "Write structured logs to a rolling file and the console at once")]
struct Cli {
    /// Increase verbosity of the tool's own diagnostics (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Minimum severity for every sink
    #[arg(long, default_value = "info")]
    level: Level,

    /// Log file path
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    log_file: PathBuf,

    /// Rotate the log file after this many megabytes
    #[arg(long, default_value_t = 20)]
    max_size_mb: u64,

    /// Remove rotated files older than this many days (0 keeps them)
    #[arg(long, default_value_t = 30)]
    max_age_days: u32,

    /// Keep at most this many rotated files (0 keeps all)
    #[arg(long, default_value_t = 50)]
    max_backups: usize,

    /// Compress rotated files with zstd
    #[arg(long)]
    compress: bool,

    /// Do not write to the log file
    #[arg(long)]
    no_file: bool,

    /// Do not write to stdout
    #[arg(long)]
    no_console: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one record at each of debug, info, warn and error
    Demo,

    /// Write a single record
    Emit {
        /// Severity of the record
        #[arg(long, default_value = "info")]
        level: Level,

        /// Record message
        #[arg(short, long)]
        message: String,

        /// Structured field as key=value; JSON values are kept typed
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Sample process health and log it until ctrl-c
    Monitor {
        /// Seconds between samples
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

/// Setup logging based on verbosity level
///
/// The tool's own `tracing` events go through the installed handle, so
/// they land in the same sinks as the records it writes.
fn setup_logging(verbosity: u8, cell: Arc<LoggerCell>) {
    let filter = match verbosity {
        0 => "warn,teelog_monitor=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(TeeLayer::new(cell))
        .init();
}

fn sink_builders(cli: &Cli) -> Vec<Option<SinkBuilder>> {
    let file = (!cli.no_file).then(|| {
        file_sink([
            with_level(cli.level),
            with_file_path(&cli.log_file),
            with_rotate_settings(cli.max_size_mb, cli.max_age_days, cli.compress),
            with_max_backups(cli.max_backups),
        ])
    });
    let console = (!cli.no_console).then(|| console_sink([with_level(cli.level)]));
    vec![file, console]
}

/// Parse `key=value`.
fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn run_demo(log: &Handle) {
    log.debug("this is a debug record");
    log.info("this is a test");
    log.warn("this is a warning");
    log.error("this is an error");
}

async fn run_monitor(interval: Duration, duration: Option<Duration>) -> Result<()> {
    let cancel = CancellationToken::new();
    let (task, samples) = Monitor::new(interval).spawn(cancel.clone());

    match duration {
        Some(duration) => {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                res = tokio::signal::ctrl_c() => res.context("failed to listen for ctrl-c")?,
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?,
    }

    cancel.cancel();
    task.await.context("health monitor task failed")?;

    let latest = samples.borrow().clone();
    if let Some(sample) = latest {
        println!("{}", serde_json::to_string(&sample)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cell = Arc::new(LoggerCell::new());
    setup_logging(cli.verbose, cell.clone());

    let log = cell
        .build_logger(sink_builders(&cli))
        .context("failed to build logger")?;
    tracing::debug!(level = %cli.level, file = %cli.log_file.display(), "logger ready");

    match cli.command {
        Commands::Demo => run_demo(&log),
        Commands::Emit {
            level,
            message,
            fields,
        } => {
            let fields = fields
                .iter()
                .map(|(key, raw)| Field::from((key.as_str(), field_value(raw))));
            log.write(level, &message, fields);
        }
        Commands::Monitor {
            interval_secs,
            duration_secs,
        } => {
            run_monitor(
                Duration::from_secs(interval_secs),
                duration_secs.map(Duration::from_secs),
            )
            .await?;
        }
    }

    log.flush().context("failed to flush logs")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("user=ada").unwrap(),
            ("user".to_string(), "ada".to_string())
        );
        assert_eq!(
            parse_field("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_field_value_keeps_json_types() {
        assert_eq!(field_value("42"), Value::from(42));
        assert_eq!(field_value("true"), Value::Bool(true));
        assert_eq!(field_value("plain"), Value::String("plain".into()));
    }

    #[test]
    fn test_sink_builders_respect_flags() {
        let cli = Cli::parse_from(["teelog", "--no-file", "demo"]);
        let builders = sink_builders(&cli);
        assert!(builders[0].is_none());
        assert!(builders[1].is_some());

        let cli = Cli::parse_from(["teelog", "--max-backups", "3", "--compress", "demo"]);
        let file = sink_builders(&cli)[0].clone().unwrap().config();
        assert_eq!(file.rotation.max_backups, 3);
        assert!(file.rotation.compress);
    }
}
