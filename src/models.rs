// Core data structures for feedpulse

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a record is rejected at the ingest boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no source_id")]
    MissingSourceId,

    #[error("record has no url")]
    MissingUrl,

    #[error("record has no fetched_at timestamp")]
    MissingFetchedAt,

    #[error("invalid {field} timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Normalized content item produced by the parsing stage.
///
/// Records are read-only inputs: nothing in the analytics layer mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub source_id: String, // Originating feed/site (e.g., "medium_travel")
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Create a record with the required fields; title and timestamps are set via builders
    pub fn new(
        source_id: impl Into<String>,
        url: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            url: url.into(),
            title: String::new(),
            summary: None,
            published_at: None,
            fetched_at,
        }
    }

    /// Set the headline
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the feed description
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the claimed publish time
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Check the record shape the analytics layer relies on
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.source_id.trim().is_empty() {
            return Err(RecordError::MissingSourceId);
        }
        if self.url.trim().is_empty() {
            return Err(RecordError::MissingUrl);
        }
        Ok(())
    }

    /// Whether `url` parses as an absolute URL. Relative links are still valid
    /// records; ingest only counts them.
    pub fn has_absolute_url(&self) -> bool {
        url::Url::parse(self.url.trim()).is_ok()
    }

    /// Whether the record can take part in time-windowed aggregates
    pub fn is_timestamped(&self) -> bool {
        self.published_at.is_some()
    }

    /// Feed description, or an empty string when absent
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}

/// A ranked keyword with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

impl KeywordCount {
    pub fn new(keyword: impl Into<String>, count: u64) -> Self {
        Self {
            keyword: keyword.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 11, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_builder_sets_fields() {
        let published = Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap();
        let record = ContentRecord::new("medium_travel", "https://medium.com/p/1", fetched())
            .with_title("Lisbon guide")
            .with_summary("A weekend in Lisbon")
            .with_published_at(published);

        assert_eq!(record.title, "Lisbon guide");
        assert_eq!(record.summary_text(), "A weekend in Lisbon");
        assert!(record.is_timestamped());
    }

    #[test]
    fn test_validate_rejects_missing_source() {
        let record = ContentRecord::new("  ", "https://medium.com/p/1", fetched());
        assert_eq!(record.validate(), Err(RecordError::MissingSourceId));
    }

    #[test]
    fn test_validate_rejects_missing_url() {
        let record = ContentRecord::new("nomadicmatt_blog", "", fetched());
        assert_eq!(record.validate(), Err(RecordError::MissingUrl));
    }

    #[test]
    fn test_validate_accepts_relative_url() {
        let record = ContentRecord::new("nomadicmatt_blog", "/travel-blog/post", fetched());
        assert!(record.validate().is_ok());
        assert!(!record.has_absolute_url());
        assert!(ContentRecord::new("nomadicmatt_blog", "https://nomadicmatt.com/a", fetched())
            .has_absolute_url());
    }

    #[test]
    fn test_untimestamped_record() {
        let record = ContentRecord::new("lonelyplanet_articles", "https://lp.com/a", fetched());
        assert!(!record.is_timestamped());
        assert!(record.validate().is_ok());
        assert_eq!(record.summary_text(), "");
    }

    #[test]
    fn test_record_serde_skips_empty_summary() {
        let record = ContentRecord::new("medium_travel", "https://medium.com/p/1", fetched());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("summary"));

        let restored: ContentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }
}
