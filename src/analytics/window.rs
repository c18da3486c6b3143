//! Temporal partitioning of record collections
//!
//! Windows are half-open `[start, end)` intervals over `published_at`,
//! anchored on an explicit reference time. Records without `published_at`
//! never fall inside a window; `fetched_at` is not consulted.

use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ContentRecord;

/// `timestamp - days`, clamped to the earliest representable instant
fn days_before(timestamp: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(days))
        .and_then(|delta| timestamp.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window relative to `reference_time`
    ///
    /// # Arguments
    /// * `days_back` - Offset of the window end before the reference time
    /// * `days_span` - Window length; when `None` the window is
    ///   `[reference_time - days_back, reference_time)`
    pub fn trailing(reference_time: DateTime<Utc>, days_back: u32, days_span: Option<u32>) -> Self {
        match days_span {
            Some(span) => {
                let end = days_before(reference_time, days_back);
                Self::new(days_before(end, span), end)
            }
            None => Self::new(days_before(reference_time, days_back), reference_time),
        }
    }

    /// The window of the same length immediately before this one
    pub fn preceding(&self) -> Self {
        let length = self.end - self.start;
        let start = self
            .start
            .checked_sub_signed(length)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start, self.start)
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn contains_record(&self, record: &ContentRecord) -> bool {
        record.published_at.is_some_and(|ts| self.contains(ts))
    }

    /// Records of `records` whose `published_at` lies in the window, input order kept
    pub fn select<'a, I>(&self, records: I) -> Vec<&'a ContentRecord>
    where
        I: IntoIterator<Item = &'a ContentRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.contains_record(record))
            .collect()
    }
}

/// Select records published in the window described by [`TimeWindow::trailing`]
pub fn window<'a, I>(
    records: I,
    reference_time: DateTime<Utc>,
    days_back: u32,
    days_span: Option<u32>,
) -> Vec<&'a ContentRecord>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    TimeWindow::trailing(reference_time, days_back, days_span).select(records)
}

/// Two adjacent windows of equal length: the current period and the one before it
#[derive(Debug, Clone)]
pub struct PeriodSplit<'a> {
    pub current_window: TimeWindow,
    pub previous_window: TimeWindow,
    pub current: Vec<&'a ContentRecord>,
    pub previous: Vec<&'a ContentRecord>,
}

impl<'a> PeriodSplit<'a> {
    /// Split into "this period" `[ref - days, ref)` and "last period" `[ref - 2*days, ref - days)`
    pub fn new<I>(records: I, reference_time: DateTime<Utc>, days: u32) -> Self
    where
        I: IntoIterator<Item = &'a ContentRecord>,
    {
        let current_window = TimeWindow::trailing(reference_time, 0, Some(days));
        let previous_window = TimeWindow::trailing(reference_time, days, Some(days));

        let mut current = Vec::new();
        let mut previous = Vec::new();
        for record in records {
            if current_window.contains_record(record) {
                current.push(record);
            } else if previous_window.contains_record(record) {
                previous.push(record);
            }
        }

        Self {
            current_window,
            previous_window,
            current,
            previous,
        }
    }
}

/// Inclusive run of calendar days ending on the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl CalendarRange {
    /// The `days` calendar days up to and including `reference_time`'s UTC date
    pub fn ending_on(reference_time: DateTime<Utc>, days: u32) -> Self {
        let last = reference_time.date_naive();
        let first = last
            .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN);
        Self { first, last }
    }

    /// Every date in the range, oldest first
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.first
            .iter_days()
            .take_while(|date| *date <= self.last)
            .collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    pub fn contains_record(&self, record: &ContentRecord) -> bool {
        record
            .published_at
            .is_some_and(|ts| self.contains(ts.date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap()
    }

    fn published(ts: DateTime<Utc>) -> ContentRecord {
        ContentRecord::new("medium_travel", "https://medium.com/p/1", reference())
            .with_published_at(ts)
    }

    #[test]
    fn test_trailing_without_span() {
        let window = TimeWindow::trailing(reference(), 7, None);
        assert_eq!(window.start, reference() - Duration::days(7));
        assert_eq!(window.end, reference());
    }

    #[test]
    fn test_trailing_with_span() {
        let window = TimeWindow::trailing(reference(), 7, Some(7));
        assert_eq!(window.start, reference() - Duration::days(14));
        assert_eq!(window.end, reference() - Duration::days(7));
    }

    #[test]
    fn test_half_open_boundaries() {
        let window = TimeWindow::trailing(reference(), 0, Some(7));
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.preceding().contains(window.start - Duration::seconds(1)));
        assert!(!window.preceding().contains(window.start));
    }

    #[test]
    fn test_missing_published_at_excluded() {
        let undated = ContentRecord::new("medium_travel", "https://medium.com/p/2", reference());
        let records = vec![undated, published(reference() - Duration::hours(1))];

        let selected = window(&records, reference(), 0, Some(7));
        assert_eq!(selected.len(), 1);
        assert!(selected[0].published_at.is_some());
    }

    #[test]
    fn test_fetched_at_is_ignored() {
        let record = ContentRecord::new(
            "medium_travel",
            "https://medium.com/p/3",
            reference() - Duration::hours(2),
        )
        .with_published_at(reference() - Duration::days(30));

        assert!(window(std::slice::from_ref(&record), reference(), 0, Some(7)).is_empty());
    }

    #[test]
    fn test_period_split_boundary_belongs_to_one_window() {
        let boundary = reference() - Duration::days(7);
        let records = vec![
            published(boundary),
            published(boundary - Duration::seconds(1)),
            published(reference()),
            published(reference() - Duration::days(14)),
        ];

        let split = PeriodSplit::new(&records, reference(), 7);
        assert_eq!(split.current.len(), 1);
        assert_eq!(split.current[0].published_at, Some(boundary));
        assert_eq!(split.previous.len(), 2);
        assert_eq!(split.previous_window, split.current_window.preceding());
    }

    #[test]
    fn test_calendar_range_dates() {
        let range = CalendarRange::ending_on(reference(), 30);
        let dates = range.dates();

        assert_eq!(dates.len(), 30);
        assert_eq!(dates[29], reference().date_naive());
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_calendar_range_includes_whole_reference_day() {
        let range = CalendarRange::ending_on(reference(), 30);
        let late_today = Utc.with_ymd_and_hms(2026, 2, 14, 23, 59, 0).unwrap();
        assert!(range.contains_record(&published(late_today)));
        assert!(!range.contains_record(&published(reference() - Duration::days(30))));
    }

    #[test]
    fn test_oversized_spans_saturate() {
        let window = TimeWindow::trailing(reference(), 200_000_000, None);
        assert_eq!(window.start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(window.end, reference());

        let records = vec![published(reference() - Duration::days(1))];
        assert_eq!(window_len(&records, 200_000_000, None), 1);
        assert_eq!(window_len(&records, u32::MAX, Some(u32::MAX)), 0);

        let far = TimeWindow::trailing(reference(), u32::MAX, Some(7));
        assert_eq!(far.preceding().start, DateTime::<Utc>::MIN_UTC);
    }

    fn window_len(records: &[ContentRecord], days_back: u32, days_span: Option<u32>) -> usize {
        window(records, reference(), days_back, days_span).len()
    }

    #[test]
    fn test_oversized_calendar_range_saturates() {
        let range = CalendarRange::ending_on(reference(), u32::MAX);
        assert_eq!(range.first, NaiveDate::MIN);
        assert_eq!(range.last, reference().date_naive());
        assert!(range.contains_record(&published(reference() - Duration::days(3650))));
    }
}
