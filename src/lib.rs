//! feedpulse - Operational analytics for public content feeds
//!
//! Turns a collection of normalized feed items into a snapshot of
//! operational signals: volume, freshness, publishing cadence, topical
//! keywords, week-over-week keyword momentum and duplication.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Record shape consumed by the engine
//! - [`analytics`] - Metrics engine (windows, aggregators, keywords, trends, snapshot)
//! - [`ingest`] - JSON Lines loader and record validation
//! - [`report`] - Markdown report rendering
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//! - [`utils`] - Common text helpers
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use feedpulse::analytics::MetricsEngine;
//! use feedpulse::config::Config;
//! use feedpulse::ingest::read_jsonl;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let ingested = read_jsonl(Path::new("data/processed/parsed_items.jsonl"))?;
//!     let engine = MetricsEngine::new(config.metrics);
//!     let snapshot = engine.compute(&ingested.records, Utc::now());
//!     println!("{}", snapshot.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{MetricsEngine, MetricsSnapshot, TrendDelta, TrendPolicy};
    pub use crate::config::{Config, MetricsConfig};
    pub use crate::error::{Error, ErrorCategory, FeedpulseError, Result};
    pub use crate::models::{ContentRecord, KeywordCount, RecordError};
    pub use crate::report::ReportRenderer;
}

// Direct re-exports for convenience
pub use models::{ContentRecord, KeywordCount};
