use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use feedpulse::analytics::MetricsSnapshot;
use feedpulse::config::Config;
use feedpulse::ingest::read_jsonl;
use feedpulse::models::ContentRecord;
use feedpulse::report::{DashboardRenderer, ReportRenderer};

pub(crate) fn write_report(
    config: &Config,
    snapshot: &MetricsSnapshot,
    items: &[ContentRecord],
    output_dir: &Path,
) -> Result<()> {
    let renderer =
        ReportRenderer::new(config.report.clone()).context("Failed to set up report template")?;

    let path = renderer
        .save(snapshot, items, output_dir)
        .with_context(|| format!("Failed to write report to {}", output_dir.display()))?;

    println!("Report written to {}", path.display());
    Ok(())
}

pub(crate) fn write_dashboard(
    config: &Config,
    snapshot: &MetricsSnapshot,
    output_dir: &Path,
) -> Result<()> {
    let renderer = DashboardRenderer::new(config.report.clone())
        .context("Failed to set up dashboard template")?;

    let path = renderer
        .save(snapshot, output_dir)
        .with_context(|| format!("Failed to write dashboard to {}", output_dir.display()))?;

    println!("Dashboard written to {}", path.display());
    Ok(())
}

fn load_snapshot(metrics: &Path) -> Result<MetricsSnapshot> {
    MetricsSnapshot::load(metrics)
        .with_context(|| format!("Failed to read metrics from {}", metrics.display()))
}

pub fn report(
    config: &Config,
    metrics: &Path,
    input: Option<&Path>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let snapshot = load_snapshot(metrics)?;

    // Sample items are optional; the report renders without them
    let items = match input {
        Some(input) => {
            read_jsonl(input)
                .with_context(|| format!("Failed to load sample items from {}", input.display()))?
                .records
        }
        None => Vec::new(),
    };

    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    write_report(config, &snapshot, &items, &output_dir)
}

pub fn dashboard(config: &Config, metrics: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let snapshot = load_snapshot(metrics)?;
    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    write_dashboard(config, &snapshot, &output_dir)
}
