//! Week-over-week keyword momentum
//!
//! This module provides functionality for:
//! - Diffing two keyword-frequency aggregates (current vs previous period)
//! - Ranking the deltas deterministically
//! - Classifying each keyword's direction (new, rising, stable, falling)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::keywords::KeywordCounts;

/// Which deltas make it into a trend ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPolicy {
    /// Every keyword seen in either period, declines included
    #[default]
    All,

    /// Only keywords whose count went up
    RisingOnly,
}

impl TrendPolicy {
    fn admits(self, delta: &TrendDelta) -> bool {
        match self {
            Self::All => true,
            Self::RisingOnly => delta.delta > 0,
        }
    }
}

/// Trend direction indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Absent in the previous period
    New,

    /// Count increased
    Rising,

    /// No change
    Stable,

    /// Count decreased
    Falling,
}

fn count_delta(current: u64, previous: u64) -> i64 {
    let delta = i128::from(current) - i128::from(previous);
    i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}

/// Change in one keyword's frequency between two periods
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendDelta {
    pub keyword: String,
    pub current_count: u64,
    pub previous_count: u64,
    /// `current_count - previous_count`, saturating at the `i64` bounds
    pub delta: i64,
}

impl TrendDelta {
    #[must_use]
    pub fn new(keyword: impl Into<String>, current_count: u64, previous_count: u64) -> Self {
        Self {
            keyword: keyword.into(),
            current_count,
            previous_count,
            delta: count_delta(current_count, previous_count),
        }
    }

    #[must_use]
    pub fn direction(&self) -> TrendDirection {
        if self.previous_count == 0 && self.current_count > 0 {
            TrendDirection::New
        } else {
            match self.delta.cmp(&0) {
                Ordering::Greater => TrendDirection::Rising,
                Ordering::Equal => TrendDirection::Stable,
                Ordering::Less => TrendDirection::Falling,
            }
        }
    }

    /// Ranking order: delta desc, then current count desc, then keyword asc
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .delta
            .cmp(&self.delta)
            .then_with(|| other.current_count.cmp(&self.current_count))
            .then_with(|| self.keyword.cmp(&other.keyword))
    }
}

/// Ranks keyword deltas between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendAnalyzer {
    top_k: usize,
    policy: TrendPolicy,
}

impl TrendAnalyzer {
    /// Create a new trend analyzer
    ///
    /// # Arguments
    /// * `top_k` - Maximum number of deltas to return
    /// * `policy` - Which deltas qualify
    #[must_use]
    pub fn new(top_k: usize, policy: TrendPolicy) -> Self {
        Self { top_k, policy }
    }

    /// Diff `current` against `previous` over the union of their keywords.
    ///
    /// A keyword missing from one side counts as 0 there.
    pub fn analyze(&self, current: &KeywordCounts, previous: &KeywordCounts) -> Vec<TrendDelta> {
        let keywords: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();

        let mut deltas: Vec<TrendDelta> = keywords
            .into_iter()
            .map(|keyword| {
                TrendDelta::new(
                    keyword.clone(),
                    current.get(keyword).copied().unwrap_or(0),
                    previous.get(keyword).copied().unwrap_or(0),
                )
            })
            .filter(|delta| self.policy.admits(delta))
            .collect();

        deltas.sort_by(TrendDelta::rank_cmp);
        deltas.truncate(self.top_k);
        deltas
    }
}

/// [`TrendAnalyzer::analyze`] with the default policy (declines included)
pub fn trend(current: &KeywordCounts, previous: &KeywordCounts, top_k: usize) -> Vec<TrendDelta> {
    TrendAnalyzer::new(top_k, TrendPolicy::default()).analyze(current, previous)
}
