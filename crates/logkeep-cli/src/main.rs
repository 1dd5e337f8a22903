//! logkeep CLI
//!
//! Thin wrapper around logkeep-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Log one or more messages in a new session
//! logkeep write --tag deploy "release 1.4.2 started" "migrations applied"
//!
//! # Persist another program's output line by line
//! some-service 2>&1 | logkeep pipe --tag some-service
//!
//! # List retained log files, oldest first
//! logkeep files
//!
//! # Zip every log file into <log dir>/log.zip
//! logkeep export
//!
//! # Show directory statistics
//! logkeep info
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logkeep_core::{
    build_archive, list_log_files, LogFileName, Logger, LoggerBuilder, LoggerConfig,
    ShutdownOutcome, ARCHIVE_FILE_NAME,
};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

/// logkeep - Buffered, retention-managed log files
#[derive(Parser)]
#[command(name = "logkeep")]
#[command(version)]
#[command(about = "logkeep - Buffered, retention-managed log files")]
#[command(
    long_about = "Writes timestamped log lines to one file per session, prunes old sessions at start-up, and exports the retained files as a single zip archive."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log directory (default: <data dir>/logkeep/logs)
    #[arg(short, long, global = true)]
    log_dir: Option<PathBuf>,

    /// JSON config file; flags given on the command line take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Prune files older than this many days at start-up (minimum 1)
    #[arg(long, global = true)]
    max_age_days: Option<u32>,

    /// Never prune below this many files (minimum 2)
    #[arg(long, global = true)]
    min_keep: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session and log the given messages
    Write {
        /// Tag for every message (default: the configured app tag)
        #[arg(short, long)]
        tag: Option<String>,

        /// Messages, one log line each
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// Start a session and log every line read from stdin until EOF or Ctrl+C
    Pipe {
        /// Tag for every line (default: the configured app tag)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List retained log files, oldest first
    Files,

    /// Build log.zip from all log files without starting a session
    Export,

    /// Show log directory statistics
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default log directory (<data dir>/logkeep/logs)
fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logkeep")
        .join("logs")
}

/// Config file (if any), then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<LoggerConfig> {
    let mut config = match &cli.config {
        Some(path) => LoggerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LoggerConfig::new(default_log_dir()),
    };

    if let Some(dir) = &cli.log_dir {
        config.directory = dir.clone();
    }
    if let Some(days) = cli.max_age_days {
        config.max_age_days = days;
    }
    if let Some(keep) = cli.min_keep {
        config.min_keep_count = keep;
    }
    config.app_version = env!("CARGO_PKG_VERSION").to_string();
    if config.app_id.is_empty() {
        config.app_id = "logkeep-cli".to_string();
    }
    Ok(config)
}

fn start_logger(config: LoggerConfig) -> Result<Logger> {
    let directory = config.directory.clone();
    LoggerBuilder::from_config(config)
        .build()
        .with_context(|| format!("Failed to start logger in {}", directory.display()))
}

fn finish(logger: &Logger) {
    match logger.shutdown() {
        ShutdownOutcome::Flushed | ShutdownOutcome::AlreadyStopped => {}
        ShutdownOutcome::TimedOut => {
            warn!("Flush did not finish in time; some lines may be missing");
        }
        ShutdownOutcome::WorkerPanicked => {
            warn!("Flush worker failed; some lines may be missing");
        }
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    config.validate()?;

    match cli.command {
        Commands::Write { tag, messages } => {
            let logger = start_logger(config)?;
            let tag = tag.unwrap_or_else(|| logger.config().app_tag.clone());

            for message in &messages {
                logger.log_with_tag(&tag, message);
            }
            finish(&logger);

            let stats = logger.stats();
            if stats.dropped > 0 {
                warn!(dropped = stats.dropped, "Log line(s) dropped (buffer full)");
            }
            println!("{}", logger.current_file().display());
        }

        Commands::Pipe { tag } => {
            let logger = start_logger(config)?;
            let tag = tag.unwrap_or_else(|| logger.config().app_tag.clone());

            let stdin = tokio::io::stdin();
            let reader = tokio::io::BufReader::new(stdin);
            let mut lines = reader.lines();
            let mut count = 0u64;

            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        match line {
                            Ok(Some(text)) => {
                                logger.log_with_tag(&tag, &text);
                                count += 1;
                            }
                            // EOF - stdin closed
                            Ok(None) => break,
                            Err(e) => {
                                warn!(error = %e, "Failed to read stdin");
                                break;
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted, flushing");
                        break;
                    }
                }
            }

            finish(&logger);

            let stats = logger.stats();
            println!("Log file: {}", logger.current_file().display());
            println!("Lines read: {}", count);
            println!("Lines written: {}", stats.written);
            println!("Lines dropped: {}", stats.dropped);
            if stats.flush_failures > 0 {
                println!("Failed flushes: {}", stats.flush_failures);
            }
        }

        Commands::Files => {
            let files = list_log_files(&config.directory);
            if files.is_empty() {
                println!("No log files in {}", config.directory.display());
            }
            for path in files {
                println!("{}\t{}", path.display(), file_size(&path));
            }
        }

        Commands::Export => {
            let archive_path = config.directory.join(ARCHIVE_FILE_NAME);
            match build_archive(&config.directory, &archive_path) {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("No log files to archive in {}", config.directory.display()),
            }
        }

        Commands::Info { json } => {
            let files = list_log_files(&config.directory);
            let total_bytes: u64 = files.iter().map(|p| file_size(p)).sum();
            let stamps: Vec<_> = files
                .iter()
                .filter_map(|p| LogFileName::from_path(p))
                .map(|n| n.stamp())
                .collect();
            let now = chrono::Local::now().naive_local();
            let oldest = stamps.iter().min().copied();
            let newest = stamps.iter().max().copied();
            let archive_path = config.directory.join(ARCHIVE_FILE_NAME);
            let archive = archive_path.exists().then(|| archive_path.clone());

            if json {
                let info = serde_json::json!({
                    "directory": config.directory,
                    "files": files.len(),
                    "total_bytes": total_bytes,
                    "oldest": oldest.map(|s| s.to_string()),
                    "newest": newest.map(|s| s.to_string()),
                    "archive": archive,
                    "config": config,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("logkeep v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Log directory: {}", config.directory.display());
                println!("Files: {}", files.len());
                println!("Total size: {} bytes", total_bytes);
                if let (Some(oldest), Some(newest)) = (oldest, newest) {
                    println!("Oldest: {} ({} day(s) ago)", oldest, (now - oldest).num_days());
                    println!("Newest: {}", newest);
                }
                for path in &files {
                    println!("  {}", file_name(path));
                }
                println!();
                println!(
                    "Retention: {} day(s), keep at least {}",
                    config.retention_policy().max_age_days(),
                    config.retention_policy().min_keep_count()
                );
                match archive {
                    Some(path) => println!("Archive: {}", path.display()),
                    None => println!("Archive: (none)"),
                }
            }
        }
    }

    Ok(())
}
