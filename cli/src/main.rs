//! CLI for gitsafe.
//!
//! This tool scans a directory tree for git repositories that have gone
//! stale, archives each one into a dated zip file and optionally copies the
//! archives to a backup location.

use clap::Parser;
use gitsafe::config::DEFAULT_CONFIG_FILE;
use gitsafe::{load_config, RunSummary, Runner, RunnerConfig, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// gitsafe - Archive git repositories that haven't been committed to in a while.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory to scan for git repositories.
    #[arg(long)]
    root: PathBuf,

    /// Days since the last commit before a repository is stale [default: 60].
    #[arg(long)]
    days: Option<u32>,

    /// Output directory for archives [default: ./backups].
    #[arg(long)]
    out: Option<PathBuf>,

    /// Upload archives to the upload directory after creating them.
    #[arg(long)]
    cloud: bool,

    /// Directory archives are uploaded to [default: $GITSAFE_UPLOAD_DIR].
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Path to a config file [default: ./gitsafe.toml if present].
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum concurrent history queries.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Seconds a single history query may run.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    history_timeout_secs: Option<u64>,

    /// List stale repositories without archiving them.
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();
    let json = args.json;

    // Run the main logic
    match run(args).await {
        Ok(summary) => {
            print_summary(&summary, json);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Builds the configuration and runs the pipeline.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let config = build_config(args)?;
    let runner = Runner::new(config)?;
    runner.run().await
}

/// Merges built-in defaults, the config file and command-line flags.
fn build_config(args: Args) -> Result<RunnerConfig, RunnerError> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let file = load_config(&config_path)?;
    if args.config.is_some() && file.is_none() {
        tracing::warn!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let mut config = RunnerConfig::new(args.root).with_dry_run(args.dry_run);
    if let Some(file) = &file {
        config = config.with_file_config(file);
    }
    if let Some(days) = args.days {
        config = config.with_threshold_days(days);
    }
    if let Some(out) = args.out {
        config = config.with_output_dir(out);
    }
    if args.cloud {
        config = config.with_upload(true);
    }
    if let Some(upload_dir) = args.upload_dir {
        config = config.with_upload_dir(upload_dir);
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_scan_concurrency(concurrency);
    }
    if let Some(secs) = args.history_timeout_secs {
        config = config.with_history_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match summary.to_json() {
            Ok(output) => println!("{output}"),
            Err(e) => error!(error = %e, "Failed to serialize summary"),
        }
        return;
    }

    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Repositories found: {}", summary.repositories_found);
    println!("  Stale repositories: {}", summary.stale_found);
    println!("  Skipped (history unreadable): {}", summary.skipped);

    if !summary.dry_run {
        println!("  Archived: {}", summary.archived);
        println!("  Archive failures: {}", summary.archive_failed);
        println!("  Uploaded: {}", summary.uploaded);
        println!("  Upload failures: {}", summary.upload_failed);
    }
}
