//! Test fixtures for integration tests
//!
//! Provides sample JSON Lines input and helpers for writing it to disk

use std::path::{Path, PathBuf};

/// Parsed items as the parsing stage writes them, reference 2026-02-14T12:00:00Z
pub const SAMPLE_ITEMS_JSONL: &str = r#"{"source":"medium_travel","url":"https://medium.com/p/azores-1","title":"Azores whale watching","published_at":"Fri, 13 Feb 2026 09:00:00 GMT","parsed_at":"2026-02-14T06:00:00Z"}
{"source":"medium_travel","url":"https://medium.com/p/azores-2","title":"Azores on a budget","published_at":"2026-02-12T10:30:00Z","parsed_at":"2026-02-14T06:00:00Z"}
{"source":"medium_travel","url":"https://medium.com/p/azores-2","title":"Azores on a budget (repost)","published_at":"2026-02-12T10:30:00Z","parsed_at":"2026-02-14T06:00:00Z"}

{"source":"lonelyplanet_articles","url":"https://www.lonelyplanet.com/articles/madrid","title":"Madrid tapas crawl","published_at":"2026-02-04","parsed_at":"2026-02-14T06:00:00Z"}
{"source":"lonelyplanet_articles","url":"https://www.lonelyplanet.com/articles/madrid-2","title":"Madrid Tapas Crawl!","published_at":"2026-02-03T08:00:00+01:00","parsed_at":"2026-02-14T06:00:00Z"}
{"source":"nomadicmatt_blog","url":"https://www.nomadicmatt.com/travel-blog/hostels","title":"Budget hostels in Porto","published_at":null,"parsed_at":"2026-02-14T06:00:00Z"}
{"source":"nomadicmatt_blog","url":"https://www.nomadicmatt.com/travel-blog/lisbon","title":"Lisbon tram tips","published_at":"last tuesday","parsed_at":"2026-02-14T06:00:00Z"}
"#;

/// Reference time matching [`SAMPLE_ITEMS_JSONL`]
pub const SAMPLE_REFERENCE_TIME: &str = "2026-02-14T12:00:00Z";

/// A row without a url
pub const MISSING_URL_JSONL: &str = r#"{"source":"medium_travel","url":"https://medium.com/p/1","parsed_at":"2026-02-14T06:00:00Z"}
{"source":"medium_travel","title":"No link","parsed_at":"2026-02-14T06:00:00Z"}
"#;

/// Write `content` to `dir/name` and return the path
pub fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fixtures_not_empty() {
        assert!(!SAMPLE_ITEMS_JSONL.is_empty());
        assert_eq!(SAMPLE_ITEMS_JSONL.lines().count(), 8);
    }
}
