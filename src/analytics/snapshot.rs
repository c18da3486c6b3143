//! Metrics snapshot assembly
//!
//! [`MetricsEngine::compute`] partitions the record collection once per
//! window, runs every aggregator and the keyword/trend passes, and packages
//! the results into one [`MetricsSnapshot`]. A single reference time is
//! threaded through every window; the engine never reads a clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

use super::aggregators::{
    cadence, cadence_by_source, duplication, freshness, volume, CadenceDay, FreshnessStats,
    QualityReport, VolumeStats,
};
use super::keywords::{self, KeywordExtractor};
use super::trends::{TrendAnalyzer, TrendDelta};
use super::window::{PeriodSplit, TimeWindow};
use crate::config::MetricsConfig;
use crate::error::Result;
use crate::models::{ContentRecord, KeywordCount};

/// How much of the input carried a publish time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub records: u64,
    pub with_published_at: u64,
    pub without_published_at: u64,
}

/// The two periods compared for trending keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWindows {
    pub current: TimeWindow,
    pub previous: TimeWindow,
}

/// All signals computed for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Reference time every window was anchored on
    pub generated_at: DateTime<Utc>,
    pub coverage: Coverage,
    pub volume: VolumeStats,
    pub freshness: FreshnessStats,
    /// Per-day counts, oldest first
    pub cadence: Vec<CadenceDay>,
    pub cadence_by_source: BTreeMap<String, Vec<CadenceDay>>,
    pub topics_global: Vec<KeywordCount>,
    pub topics_per_source: BTreeMap<String, Vec<KeywordCount>>,
    pub trend_windows: TrendWindows,
    pub trending: Vec<TrendDelta>,
    pub trending_per_source: BTreeMap<String, Vec<TrendDelta>>,
    pub quality: QualityReport,
}

impl MetricsSnapshot {
    /// SHA-256 of the snapshot's JSON encoding
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Computes [`MetricsSnapshot`]s from record collections
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: MetricsConfig,
    extractor: KeywordExtractor,
    global_trends: TrendAnalyzer,
    source_trends: TrendAnalyzer,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        let extractor = KeywordExtractor::new(config.stopwords.build(), config.min_token_len);
        let global_trends = TrendAnalyzer::new(config.trend_top_k, config.trend_policy);
        let source_trends = TrendAnalyzer::new(config.top_k_per_source, config.trend_policy);

        Self {
            config,
            extractor,
            global_trends,
            source_trends,
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    /// Compute every signal for `records` as of `reference_time`
    pub fn compute(&self, records: &[ContentRecord], reference_time: DateTime<Utc>) -> MetricsSnapshot {
        let config = &self.config;

        let with_published_at = records.iter().filter(|r| r.is_timestamped()).count() as u64;
        let coverage = Coverage {
            records: records.len() as u64,
            with_published_at,
            without_published_at: records.len() as u64 - with_published_at,
        };

        let by_source = group_by_source(records);
        let split = PeriodSplit::new(records, reference_time, config.trend_window_days);

        let volume = volume(records);
        let freshness = freshness(records, reference_time, config.freshness_days);
        let cadence_series = cadence(records, reference_time, config.cadence_days);
        let cadence_per_source = cadence_by_source(records, reference_time, config.cadence_days);
        let quality = duplication(records, config.min_group_size);

        let topics_global = self
            .extractor
            .aggregate(records, keywords::title, config.top_k);
        let topics_per_source = by_source
            .iter()
            .map(|(source, members)| {
                let ranked = self.extractor.aggregate(
                    members.iter().copied(),
                    keywords::title,
                    config.top_k_per_source,
                );
                (source.to_string(), ranked)
            })
            .collect();

        let current = self
            .extractor
            .count(split.current.iter().copied(), keywords::title);
        let previous = self
            .extractor
            .count(split.previous.iter().copied(), keywords::title);
        let trending = self.global_trends.analyze(&current, &previous);

        let trending_per_source = by_source
            .keys()
            .map(|source| {
                let current = self.extractor.count(
                    split.current.iter().copied().filter(|r| r.source_id == *source),
                    keywords::title,
                );
                let previous = self.extractor.count(
                    split.previous.iter().copied().filter(|r| r.source_id == *source),
                    keywords::title,
                );
                (source.to_string(), self.source_trends.analyze(&current, &previous))
            })
            .collect();

        tracing::debug!(
            records = coverage.records,
            undated = coverage.without_published_at,
            sources = volume.by_source.len(),
            current_period = split.current.len(),
            previous_period = split.previous.len(),
            url_groups = quality.url_groups.len(),
            title_groups = quality.title_groups.len(),
            "Computed metrics snapshot"
        );

        MetricsSnapshot {
            generated_at: reference_time,
            coverage,
            volume,
            freshness,
            cadence: cadence_series,
            cadence_by_source: cadence_per_source,
            topics_global,
            topics_per_source,
            trend_windows: TrendWindows {
                current: split.current_window,
                previous: split.previous_window,
            },
            trending,
            trending_per_source,
            quality,
        }
    }
}

fn group_by_source(records: &[ContentRecord]) -> BTreeMap<&str, Vec<&ContentRecord>> {
    let mut grouped: BTreeMap<&str, Vec<&ContentRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.source_id.as_str()).or_default().push(record);
    }
    grouped
}

/// Compute a snapshot with the default configuration
pub fn compute_snapshot(records: &[ContentRecord], reference_time: DateTime<Utc>) -> MetricsSnapshot {
    MetricsEngine::default().compute(records, reference_time)
}
