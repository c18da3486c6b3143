//! Metrics engine: windowed aggregation, keyword ranking, trend deltas
//! and duplicate detection over normalized content records

pub mod aggregators;
pub mod keywords;
pub mod snapshot;
pub mod trends;
pub mod window;

pub use aggregators::{
    CadenceDay, DuplicateGroup, FreshnessStats, LatestItem, QualityReport, VolumeStats,
};
pub use keywords::{KeywordCounts, KeywordExtractor, StopWords};
pub use snapshot::{compute_snapshot, Coverage, MetricsEngine, MetricsSnapshot, TrendWindows};
pub use trends::{TrendAnalyzer, TrendDelta, TrendDirection, TrendPolicy};
pub use window::{window, CalendarRange, PeriodSplit, TimeWindow};
