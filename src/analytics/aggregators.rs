//! Independent aggregation passes over a record collection
//!
//! Each pass is a read-only fold returning a well-defined zero value for an
//! empty collection:
//! - Volume: total and per-source item counts
//! - Freshness: recent-window counts and latest publish time per source
//! - Cadence: per-day counts over a run of calendar days, zero days included
//! - Duplication: groups of records sharing a URL or a normalized title

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::keywords::normalize_text;
use super::window::{CalendarRange, TimeWindow};
use crate::models::ContentRecord;

// ============================================================================
// Volume
// ============================================================================

/// Item counts, not time-filtered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub total: u64,
    /// Every observed source_id
    pub by_source: BTreeMap<String, u64>,
}

pub fn volume<'a, I>(records: I) -> VolumeStats
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let mut stats = VolumeStats::default();
    for record in records {
        stats.total += 1;
        *stats.by_source.entry(record.source_id.clone()).or_insert(0) += 1;
    }
    stats
}

// ============================================================================
// Freshness
// ============================================================================

/// Recency signals relative to the reference time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessStats {
    /// Length of the recent window in days
    pub window_days: u32,

    /// Records published inside the recent window
    pub recent_count: u64,

    /// Recent-window counts for every observed source (0 for silent sources)
    pub recent_by_source: BTreeMap<String, u64>,

    /// Latest `published_at` per source; sources without timestamps are absent
    pub latest_by_source: BTreeMap<String, DateTime<Utc>>,

    /// The item behind each `latest_by_source` entry
    pub latest_item_by_source: BTreeMap<String, LatestItem>,
}

/// Most recently published item of a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestItem {
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl LatestItem {
    fn from_record(record: &ContentRecord, published_at: DateTime<Utc>) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
            published_at,
        }
    }

    /// Later publish time wins; ties go to the smaller url, then title,
    /// so the pick does not depend on input order
    fn is_superseded_by(&self, other: &Self) -> bool {
        (other.published_at, &self.url, &self.title) > (self.published_at, &other.url, &other.title)
    }
}

impl FreshnessStats {
    /// Sources with no item in the recent window
    pub fn silent_sources(&self) -> Vec<&str> {
        self.recent_by_source
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(source, _)| source.as_str())
            .collect()
    }
}

/// Freshness over `[reference_time - window_days, reference_time)`
pub fn freshness<'a, I>(records: I, reference_time: DateTime<Utc>, window_days: u32) -> FreshnessStats
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let window = TimeWindow::trailing(reference_time, 0, Some(window_days));
    let mut stats = FreshnessStats {
        window_days,
        ..Default::default()
    };

    for record in records {
        let recent = stats
            .recent_by_source
            .entry(record.source_id.clone())
            .or_insert(0);
        if window.contains_record(record) {
            *recent += 1;
            stats.recent_count += 1;
        }

        if let Some(published_at) = record.published_at {
            let candidate = LatestItem::from_record(record, published_at);
            match stats.latest_item_by_source.get_mut(&record.source_id) {
                Some(latest) if latest.is_superseded_by(&candidate) => *latest = candidate,
                Some(_) => {}
                None => {
                    stats
                        .latest_item_by_source
                        .insert(record.source_id.clone(), candidate);
                }
            }
        }
    }

    stats.latest_by_source = stats
        .latest_item_by_source
        .iter()
        .map(|(source, item)| (source.clone(), item.published_at))
        .collect();

    stats
}

// ============================================================================
// Cadence
// ============================================================================

/// Number of records published on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceDay {
    pub date: NaiveDate,
    pub count: u64,
}

/// Per-day counts for the `days` calendar days ending on the reference date.
///
/// Always returns exactly `days` entries, oldest first.
pub fn cadence<'a, I>(records: I, reference_time: DateTime<Utc>, days: u32) -> Vec<CadenceDay>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let range = CalendarRange::ending_on(reference_time, days);
    let mut per_day: BTreeMap<NaiveDate, u64> =
        range.dates().into_iter().map(|date| (date, 0)).collect();

    for record in records {
        if let Some(published_at) = record.published_at {
            if let Some(count) = per_day.get_mut(&published_at.date_naive()) {
                *count += 1;
            }
        }
    }

    per_day
        .into_iter()
        .map(|(date, count)| CadenceDay { date, count })
        .collect()
}

/// [`cadence`] computed separately for every observed source
pub fn cadence_by_source<'a, I>(
    records: I,
    reference_time: DateTime<Utc>,
    days: u32,
) -> BTreeMap<String, Vec<CadenceDay>>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let mut grouped: BTreeMap<&str, Vec<&ContentRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.source_id.as_str()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(source, members)| {
            (
                source.to_string(),
                cadence(members, reference_time, days),
            )
        })
        .collect()
}

// ============================================================================
// Duplication
// ============================================================================

/// Records sharing one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The shared URL or normalized title
    pub key: String,

    /// Member count (at least the minimum group size)
    pub count: u64,

    /// Sources the members came from
    pub sources: BTreeSet<String>,
}

/// Duplicate URL and title groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub url_groups: Vec<DuplicateGroup>,
    pub title_groups: Vec<DuplicateGroup>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.url_groups.is_empty() && self.title_groups.is_empty()
    }

    /// Records beyond the first in each URL group
    pub fn redundant_url_records(&self) -> u64 {
        self.url_groups.iter().map(|group| group.count - 1).sum()
    }
}

#[derive(Default)]
struct GroupAccumulator {
    counts: BTreeMap<String, (u64, BTreeSet<String>)>,
}

impl GroupAccumulator {
    fn add(&mut self, key: String, source: &str) {
        let entry = self.counts.entry(key).or_default();
        entry.0 += 1;
        entry.1.insert(source.to_string());
    }

    fn into_groups(self, min_group_size: u64) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .counts
            .into_iter()
            .filter(|(_, (count, _))| *count >= min_group_size)
            .map(|(key, (count, sources))| DuplicateGroup {
                key,
                count,
                sources,
            })
            .collect();

        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        groups
    }
}

/// Group by exact `url` and by normalized title.
///
/// Titles that normalize to an empty string are not grouped. Groups smaller
/// than `min_group_size` (never less than 2) are dropped.
pub fn duplication<'a, I>(records: I, min_group_size: u64) -> QualityReport
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let min_group_size = min_group_size.max(2);
    let mut urls = GroupAccumulator::default();
    let mut titles = GroupAccumulator::default();

    for record in records {
        urls.add(record.url.clone(), &record.source_id);

        let title = normalize_text(&record.title);
        if !title.is_empty() {
            titles.add(title, &record.source_id);
        }
    }

    QualityReport {
        url_groups: urls.into_groups(min_group_size),
        title_groups: titles.into_groups(min_group_size),
    }
}
