//! Image Harvester main entry point
//!
//! Command-line front end: takes one page URL, downloads its images and
//! prints a summary.

use anyhow::Context;
use clap::Parser;
use image_harvester::config::{load_config, Config};
use image_harvester::harvester::{Harvester, LogProgress, SessionOutcome};
use image_harvester::output::print_summary;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Image Harvester: download every image on a web page
///
/// Saves `<img>` sources, inline SVGs and CSS background images from a single
/// page into `<base-dir>/downloaded/<domain>/image_<n><ext>`.
#[derive(Parser, Debug)]
#[command(name = "image-harvester")]
#[command(version)]
#[command(about = "Download every image on a web page", long_about = None)]
struct Cli {
    /// Page to harvest (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the base directory images are written under
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config = config.with_base_dir(dir);
    }

    let harvester = Harvester::new(config).context("failed to build HTTP client")?;
    let outcome = harvester.harvest(&cli.url, &mut LogProgress).await;

    match outcome {
        SessionOutcome::Success {
            directory,
            message,
            summary,
        } => {
            if !cli.quiet {
                print_summary(&summary, &directory);
            }
            println!("{}. Folder: {}", message, directory.display());
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Failure { reason } => {
            eprintln!("{}", reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_harvester=info,warn"),
            1 => EnvFilter::new("image_harvester=debug,info"),
            2 => EnvFilter::new("image_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
