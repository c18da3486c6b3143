//! Configuration management for feedpulse
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files. Every engine parameter is explicit here with a stated default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analytics::keywords::{StopWords, DEFAULT_MIN_TOKEN_LEN};
use crate::analytics::trends::TrendPolicy;
use crate::error::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metrics engine parameters
    pub metrics: MetricsConfig,

    /// Report rendering configuration
    pub report: ReportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Parameters of the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Length of the global keyword ranking
    pub top_k: usize,

    /// Length of per-source keyword and trend rankings
    pub top_k_per_source: usize,

    /// Length of the global trend ranking
    pub trend_top_k: usize,

    /// Calendar days covered by the cadence series
    pub cadence_days: u32,

    /// Days in the freshness window
    pub freshness_days: u32,

    /// Days in each of the two periods compared for trends
    pub trend_window_days: u32,

    /// Smallest duplicate group reported
    pub min_group_size: u64,

    /// Tokens shorter than this are not keywords
    pub min_token_len: usize,

    /// Which keyword deltas are reported as trending
    pub trend_policy: TrendPolicy,

    /// Stopword set used by the keyword extractor
    pub stopwords: StopwordConfig,
}

/// Stopword set composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopwordConfig {
    /// Start from the built-in English/Spanish function words
    pub use_builtin: bool,

    /// Domain noise terms added on top
    pub extra: Vec<String>,
}

/// Report rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory reports are written to
    pub output_dir: PathBuf,

    /// Custom Handlebars template (default template is embedded)
    pub template: Option<PathBuf>,

    /// Custom Handlebars template for the HTML dashboard
    pub dashboard_template: Option<PathBuf>,

    /// Terms that signal off-topic content, per source
    pub offtopic_terms: BTreeMap<String, Vec<String>>,

    /// Number of keywords listed per source in the report
    pub keywords_per_source: usize,

    /// Items listed per source in the "Sample items" section
    pub sample_items_per_source: usize,

    /// Bars in each keyword chart of the dashboard
    pub dashboard_keywords: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            top_k: 20,
            top_k_per_source: 15,
            trend_top_k: 20,
            cadence_days: 30,
            freshness_days: 7,
            trend_window_days: 7,
            min_group_size: 2,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            trend_policy: TrendPolicy::All,
            stopwords: StopwordConfig::default(),
        }
    }
}

impl Default for StopwordConfig {
    fn default() -> Self {
        Self {
            use_builtin: true,
            extra: Vec::new(),
        }
    }
}

impl StopwordConfig {
    /// Build the stopword set this configuration describes
    pub fn build(&self) -> StopWords {
        let base = if self.use_builtin {
            StopWords::builtin()
        } else {
            StopWords::empty()
        };
        base.with_extra(&self.extra)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            template: None,
            dashboard_template: None,
            offtopic_terms: BTreeMap::new(),
            keywords_per_source: 12,
            sample_items_per_source: 5,
            dashboard_keywords: 18,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Longest window (in days) any metric may cover
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Parse an environment override; an unset variable is `Ok(None)`
fn env_parse<T: std::str::FromStr>(key: &str) -> crate::error::Result<Option<T>> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("{key} has an invalid value: {v:?}"))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// File (when given) then environment overrides, validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `FEEDPULSE_*` environment variables
    ///
    /// A set variable that does not parse is an error rather than ignored.
    pub fn apply_env(&mut self) -> crate::error::Result<()> {
        let metrics = &mut self.metrics;
        if let Some(v) = env_parse("FEEDPULSE_TOP_K")? {
            metrics.top_k = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_TOP_K_PER_SOURCE")? {
            metrics.top_k_per_source = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_TREND_TOP_K")? {
            metrics.trend_top_k = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_CADENCE_DAYS")? {
            metrics.cadence_days = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_FRESHNESS_DAYS")? {
            metrics.freshness_days = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_TREND_WINDOW_DAYS")? {
            metrics.trend_window_days = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_MIN_GROUP_SIZE")? {
            metrics.min_group_size = v;
        }
        if let Some(v) = env_parse("FEEDPULSE_MIN_TOKEN_LEN")? {
            metrics.min_token_len = v;
        }
        if let Ok(v) = std::env::var("FEEDPULSE_TREND_POLICY") {
            metrics.trend_policy = match v.trim() {
                "all" => TrendPolicy::All,
                "rising_only" => TrendPolicy::RisingOnly,
                other => {
                    return Err(Error::config(format!(
                        "FEEDPULSE_TREND_POLICY must be 'all' or 'rising_only', got {other:?}"
                    )))
                }
            };
        }
        if let Ok(v) = std::env::var("FEEDPULSE_EXTRA_STOPWORDS") {
            metrics.stopwords.extra.extend(
                v.split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string),
            );
        }
        if let Ok(v) = std::env::var("FEEDPULSE_REPORT_DIR") {
            self.report.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FEEDPULSE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("FEEDPULSE_LOG_FORMAT") {
            self.logging.format = v;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        let metrics = &self.metrics;

        if metrics.top_k == 0 || metrics.top_k_per_source == 0 || metrics.trend_top_k == 0 {
            return Err(Error::config("top_k values must be greater than 0"));
        }

        for (name, days) in [
            ("cadence_days", metrics.cadence_days),
            ("freshness_days", metrics.freshness_days),
            ("trend_window_days", metrics.trend_window_days),
        ] {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return Err(Error::config(format!(
                    "{name} must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
                )));
            }
        }

        if metrics.min_group_size < 2 {
            return Err(Error::config("min_group_size must be at least 2"));
        }

        if metrics.min_token_len == 0 {
            return Err(Error::config("min_token_len must be greater than 0"));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config("logging.format must be 'text' or 'json'"));
        }

        Ok(())
    }
}
