use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use feedpulse::analytics::{MetricsEngine, MetricsSnapshot};
use feedpulse::config::Config;
use feedpulse::ingest::read_jsonl;
use feedpulse::models::ContentRecord;

use super::report::{write_dashboard, write_report};

/// Reference time for the run: the given RFC 3339 value, else the current time
pub fn resolve_reference_time(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --reference-time (expected RFC 3339): {value}")),
        None => Ok(Utc::now()),
    }
}

fn compute(
    config: &Config,
    input: &Path,
    reference_time: Option<&str>,
) -> Result<(MetricsSnapshot, Vec<ContentRecord>)> {
    let reference_time = resolve_reference_time(reference_time)?;

    let ingested = read_jsonl(input)
        .with_context(|| format!("Failed to load records from {}", input.display()))?;

    let stats = ingested.stats;
    println!("Loaded {} records from {}", stats.records, input.display());
    if stats.missing_published_at + stats.unparsed_published_at > 0 {
        println!(
            "  Undated: {} missing, {} unparseable (excluded from windowed metrics)",
            stats.missing_published_at, stats.unparsed_published_at
        );
    }
    if stats.relative_urls > 0 {
        println!("  Relative urls: {}", stats.relative_urls);
    }

    let engine = MetricsEngine::new(config.metrics.clone());
    let snapshot = engine.compute(&ingested.records, reference_time);

    tracing::info!(
        records = snapshot.volume.total,
        sources = snapshot.volume.by_source.len(),
        recent = snapshot.freshness.recent_count,
        trending = snapshot.trending.len(),
        reference_time = %reference_time,
        "Computed metrics"
    );

    Ok((snapshot, ingested.records))
}

fn save_snapshot(snapshot: &MetricsSnapshot, output: &Path) -> Result<()> {
    snapshot
        .save(output)
        .with_context(|| format!("Failed to write metrics to {}", output.display()))?;

    let fingerprint = snapshot.fingerprint()?;
    tracing::debug!(fingerprint = %fingerprint, "Snapshot fingerprint");

    println!("Metrics written to {}", output.display());
    println!("  Items: {}", snapshot.volume.total);
    println!("  Sources: {}", snapshot.volume.by_source.len());
    println!(
        "  Last {} days: {}",
        snapshot.freshness.window_days, snapshot.freshness.recent_count
    );
    println!(
        "  Duplicate groups: {} url, {} title",
        snapshot.quality.url_groups.len(),
        snapshot.quality.title_groups.len()
    );
    Ok(())
}

pub fn metrics(
    config: &Config,
    input: &Path,
    output: &Path,
    reference_time: Option<&str>,
) -> Result<()> {
    let (snapshot, _) = compute(config, input, reference_time)?;
    save_snapshot(&snapshot, output)
}

pub fn run(
    config: &Config,
    input: &Path,
    metrics_output: &Path,
    output_dir: Option<PathBuf>,
    reference_time: Option<&str>,
) -> Result<()> {
    let (snapshot, records) = compute(config, input, reference_time)?;
    save_snapshot(&snapshot, metrics_output)?;

    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    write_report(config, &snapshot, &records, &output_dir)?;
    write_dashboard(config, &snapshot, &output_dir)
}
