//! Ingest boundary: JSON Lines rows -> validated [`ContentRecord`]s
//!
//! Each non-blank line is one parsed feed item. Field names from the
//! parsing stage are accepted under a few aliases (`source`/`source_id`,
//! `link`/`url`, `description`/`summary`, `parsed_at`/`fetched_at`).
//!
//! Shape errors (missing source, missing url, missing or unreadable
//! `fetched_at`, malformed JSON) stop the load with the offending line
//! number. An unreadable `published_at` (bad text or a non-string JSON
//! value) only degrades the record to "undated", and a relative `url` is
//! kept as-is; both are counted in [`IngestStats`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{ContentRecord, RecordError};

/// Naive datetime layouts tried after RFC 3339; interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// One row as written by the parsing stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default, alias = "source")]
    pub source_id: Option<String>,

    #[serde(default, alias = "link")]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, alias = "description")]
    pub summary: Option<String>,

    /// Any JSON value; only strings can parse as timestamps
    #[serde(default)]
    pub published_at: Option<Value>,

    #[serde(default, alias = "parsed_at")]
    pub fetched_at: Option<Value>,
}

/// Outcome of converting a raw row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub record: ContentRecord,
    /// `published_at` was present but could not be parsed
    pub unparsed_published_at: bool,
}

impl RawItem {
    /// Validate and convert into a record
    pub fn into_record(self) -> std::result::Result<Converted, RecordError> {
        let fetched_at = match timestamp_text(self.fetched_at) {
            None => return Err(RecordError::MissingFetchedAt),
            Some(Ok(text)) => match parse_timestamp(&text) {
                Some(ts) => ts,
                None => {
                    return Err(RecordError::InvalidTimestamp {
                        field: "fetched_at",
                        value: text,
                    })
                }
            },
            Some(Err(raw)) => {
                return Err(RecordError::InvalidTimestamp {
                    field: "fetched_at",
                    value: raw,
                })
            }
        };

        let (published_at, unparsed_published_at) = match timestamp_text(self.published_at) {
            None => (None, false),
            Some(Ok(text)) => {
                let parsed = parse_timestamp(&text);
                (parsed, parsed.is_none())
            }
            Some(Err(_)) => (None, true),
        };

        let record = ContentRecord {
            source_id: non_empty(self.source_id).unwrap_or_default(),
            url: non_empty(self.url).unwrap_or_default(),
            title: self.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            summary: non_empty(self.summary),
            published_at,
            fetched_at,
        };
        record.validate()?;

        Ok(Converted {
            record,
            unparsed_published_at,
        })
    }
}

/// Text of a timestamp cell: `None` when absent, null or blank; `Err` holds
/// the JSON of a non-string value
fn timestamp_text(value: Option<Value>) -> Option<std::result::Result<String, String>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => non_empty(Some(text)).map(Ok),
        Some(other) => Some(Err(other.to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the timestamp formats seen in feeds, converting to UTC.
///
/// Accepts RFC 3339 / ISO 8601 (offset, `Z`, or naive as UTC), a bare
/// `YYYY-MM-DD` date, and RFC 2822 feed dates such as
/// `Wed, 11 Feb 2026 09:07:10 GMT`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Counters describing one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub lines: usize,
    pub blank_lines: usize,
    pub records: usize,
    pub missing_published_at: usize,
    pub unparsed_published_at: usize,
    /// Records whose `url` is not an absolute URL
    pub relative_urls: usize,
}

/// Records plus load statistics
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub records: Vec<ContentRecord>,
    pub stats: IngestStats,
}

/// Read records from any buffered JSON Lines source
pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Ingested> {
    let mut ingested = Ingested::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        ingested.stats.lines += 1;

        if line.trim().is_empty() {
            ingested.stats.blank_lines += 1;
            continue;
        }

        let raw: RawItem = serde_json::from_str(&line).map_err(|source| Error::MalformedLine {
            line: line_no,
            source,
        })?;

        let converted = raw.into_record().map_err(|source| Error::InvalidRecord {
            line: line_no,
            source,
        })?;

        if converted.unparsed_published_at {
            tracing::warn!(
                line = line_no,
                url = %converted.record.url,
                "Unparseable published_at, treating record as undated"
            );
            ingested.stats.unparsed_published_at += 1;
        } else if converted.record.published_at.is_none() {
            ingested.stats.missing_published_at += 1;
        }

        if !converted.record.has_absolute_url() {
            tracing::warn!(
                line = line_no,
                url = %converted.record.url,
                "Relative url, kept as a duplication key"
            );
            ingested.stats.relative_urls += 1;
        }

        ingested.records.push(converted.record);
        ingested.stats.records += 1;
    }

    tracing::debug!(
        lines = ingested.stats.lines,
        records = ingested.stats.records,
        missing_published_at = ingested.stats.missing_published_at,
        unparsed_published_at = ingested.stats.unparsed_published_at,
        relative_urls = ingested.stats.relative_urls,
        "Parsed JSON Lines input"
    );

    Ok(ingested)
}

/// Read records from a JSON Lines file
pub fn read_jsonl(path: &Path) -> Result<Ingested> {
    let file = File::open(path).map_err(|e| {
        Error::with_source(format!("Failed to open input file: {}", path.display()), e)
    })?;
    parse_jsonl(BufReader::new(file))
}
