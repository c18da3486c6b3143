//! Error scenario integration tests
//!
//! Tests failure modes at the ingest boundary and their classification:
//! 1. Records missing required fields
//! 2. Malformed JSON lines
//! 3. Missing input files
//! 4. Degraded (but accepted) timestamps

use feedpulse::error::{Error, ErrorCategory, FeedpulseError};
use feedpulse::ingest::{parse_jsonl, read_jsonl};
use feedpulse::models::RecordError;
use tempfile::TempDir;

use super::fixtures::{write_input, MISSING_URL_JSONL};

#[test]
fn test_missing_url_rejected_with_line() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "items.jsonl", MISSING_URL_JSONL);

    let err = read_jsonl(&input).unwrap_err();
    match &err {
        Error::InvalidRecord { line, source } => {
            assert_eq!(*line, 2);
            assert_eq!(source, &RecordError::MissingUrl);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.category(), ErrorCategory::Input);
    assert!(!err.is_recoverable());
}

#[test]
fn test_missing_source_rejected() {
    let input = r#"{"url":"https://medium.com/p/1","parsed_at":"2026-02-14T06:00:00Z"}"#;
    let err = parse_jsonl(input.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidRecord {
            line: 1,
            source: RecordError::MissingSourceId
        }
    ));
}

#[test]
fn test_invalid_fetched_at_rejected() {
    let input = r#"{"source":"a","url":"https://a.com/1","fetched_at":"not a date"}"#;
    let err = parse_jsonl(input.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidRecord {
            source: RecordError::InvalidTimestamp {
                field: "fetched_at",
                ..
            },
            ..
        }
    ));
}

#[test]
fn test_malformed_json_line() {
    let input = concat!(
        r#"{"source":"a","url":"https://a.com/1","fetched_at":"2026-02-14T06:00:00Z"}"#,
        "\n",
        r#"{"source":"a","url":"#,
        "\n"
    );
    let err = parse_jsonl(input.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let err = read_jsonl(&dir.path().join("absent.jsonl")).unwrap_err();
    assert!(err.to_string().contains("absent.jsonl"));
}

#[test]
fn test_empty_file_is_not_an_error() {
    let ingested = parse_jsonl("".as_bytes()).unwrap();
    assert!(ingested.records.is_empty());
    assert_eq!(ingested.stats.lines, 0);
}
