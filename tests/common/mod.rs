//! Common test utilities

use chrono::{DateTime, Duration, TimeZone, Utc};
use feedpulse::models::ContentRecord;

/// Fixed reference time shared by the integration tests
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap()
}

/// Create a dated record published `days_ago` days before the reference time
pub fn dated(source: &str, url: &str, title: &str, days_ago: i64) -> ContentRecord {
    ContentRecord::new(source, url, reference_time())
        .with_title(title)
        .with_published_at(reference_time() - Duration::days(days_ago))
}

/// Create a record without `published_at`
#[allow(dead_code)]
pub fn undated(source: &str, url: &str, title: &str) -> ContentRecord {
    ContentRecord::new(source, url, reference_time()).with_title(title)
}
