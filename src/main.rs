use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedpulse::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "feedpulse",
    version,
    about = "Operational analytics over normalized public content feeds",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a metrics snapshot from parsed items
    Metrics {
        /// Parsed items (JSON Lines)
        #[arg(short, long, default_value = "data/processed/parsed_items.jsonl")]
        input: PathBuf,

        /// Snapshot output path (JSON)
        #[arg(short, long, default_value = "data/processed/metrics.json")]
        output: PathBuf,

        /// Reference time (RFC 3339); defaults to now
        #[arg(long)]
        reference_time: Option<String>,
    },

    /// Render a markdown report from a saved snapshot
    Report {
        /// Snapshot produced by `metrics`
        #[arg(short, long, default_value = "data/processed/metrics.json")]
        metrics: PathBuf,

        /// Parsed items to draw the sample item section from
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Report directory (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Render an HTML dashboard from a saved snapshot
    Dashboard {
        /// Snapshot produced by `metrics`
        #[arg(short, long, default_value = "data/processed/metrics.json")]
        metrics: PathBuf,

        /// Output directory (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Compute metrics and render the report and dashboard in one pass
    Run {
        /// Parsed items (JSON Lines)
        #[arg(short, long, default_value = "data/processed/parsed_items.jsonl")]
        input: PathBuf,

        /// Snapshot output path (JSON)
        #[arg(long, default_value = "data/processed/metrics.json")]
        metrics_output: PathBuf,

        /// Report directory (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Reference time (RFC 3339); defaults to now
        #[arg(long)]
        reference_time: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    setup_tracing(&config, cli.verbose)?;

    tracing::info!("feedpulse starting");

    match cli.command {
        Commands::Metrics {
            input,
            output,
            reference_time,
        } => {
            tracing::info!(
                input = %input.display(),
                output = %output.display(),
                reference_time = ?reference_time,
                "Starting metrics command"
            );
            commands::metrics(&config, &input, &output, reference_time.as_deref())?;
        }

        Commands::Report {
            metrics,
            input,
            output_dir,
        } => {
            tracing::info!(
                metrics = %metrics.display(),
                input = ?input,
                output_dir = ?output_dir,
                "Starting report command"
            );
            commands::report(&config, &metrics, input.as_deref(), output_dir)?;
        }

        Commands::Dashboard {
            metrics,
            output_dir,
        } => {
            tracing::info!(
                metrics = %metrics.display(),
                output_dir = ?output_dir,
                "Starting dashboard command"
            );
            commands::dashboard(&config, &metrics, output_dir)?;
        }

        Commands::Run {
            input,
            metrics_output,
            output_dir,
            reference_time,
        } => {
            tracing::info!(
                input = %input.display(),
                metrics_output = %metrics_output.display(),
                output_dir = ?output_dir,
                reference_time = ?reference_time,
                "Starting run command"
            );
            commands::run(
                &config,
                &input,
                &metrics_output,
                output_dir,
                reference_time.as_deref(),
            )?;
        }
    }

    tracing::info!("feedpulse completed successfully");
    Ok(())
}

fn setup_tracing(config: &Config, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("feedpulse=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("feedpulse={},warn", config.logging.level))
        })
    };

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
