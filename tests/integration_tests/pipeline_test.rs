//! End-to-end pipeline tests
//!
//! JSON Lines on disk -> records -> snapshot -> JSON -> markdown report

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use feedpulse::analytics::{MetricsEngine, MetricsSnapshot, TrendDelta, TrendPolicy};
use feedpulse::config::{Config, MetricsConfig};
use feedpulse::ingest::read_jsonl;
use feedpulse::models::KeywordCount;
use feedpulse::report::{DashboardRenderer, ReportRenderer};
use tempfile::TempDir;

use super::fixtures::{write_input, SAMPLE_ITEMS_JSONL, SAMPLE_REFERENCE_TIME};

fn reference_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(SAMPLE_REFERENCE_TIME)
        .unwrap()
        .with_timezone(&Utc)
}

fn sample_snapshot(config: MetricsConfig) -> MetricsSnapshot {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "parsed_items.jsonl", SAMPLE_ITEMS_JSONL);
    let ingested = read_jsonl(&input).unwrap();
    MetricsEngine::new(config).compute(&ingested.records, reference_time())
}

#[test]
fn test_ingest_stats() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "parsed_items.jsonl", SAMPLE_ITEMS_JSONL);
    let ingested = read_jsonl(&input).unwrap();

    assert_eq!(ingested.records.len(), 7);
    assert_eq!(ingested.stats.lines, 8);
    assert_eq!(ingested.stats.blank_lines, 1);
    assert_eq!(ingested.stats.missing_published_at, 1);
    assert_eq!(ingested.stats.unparsed_published_at, 1);
    assert_eq!(ingested.stats.relative_urls, 0);
}

#[test]
fn test_volume_and_coverage() {
    let snapshot = sample_snapshot(MetricsConfig::default());

    assert_eq!(snapshot.volume.total, 7);
    assert_eq!(snapshot.volume.by_source["medium_travel"], 3);
    assert_eq!(snapshot.volume.by_source["lonelyplanet_articles"], 2);
    assert_eq!(snapshot.volume.by_source["nomadicmatt_blog"], 2);
    assert_eq!(snapshot.coverage.with_published_at, 5);
    assert_eq!(snapshot.coverage.without_published_at, 2);
}

#[test]
fn test_freshness() {
    let snapshot = sample_snapshot(MetricsConfig::default());
    let freshness = &snapshot.freshness;

    assert_eq!(freshness.recent_count, 3);
    assert_eq!(
        freshness.silent_sources(),
        vec!["lonelyplanet_articles", "nomadicmatt_blog"]
    );
    assert_eq!(
        freshness.latest_by_source["medium_travel"],
        Utc.with_ymd_and_hms(2026, 2, 13, 9, 0, 0).unwrap()
    );
    assert_eq!(
        freshness.latest_by_source["lonelyplanet_articles"],
        Utc.with_ymd_and_hms(2026, 2, 4, 0, 0, 0).unwrap()
    );
    assert!(!freshness.latest_by_source.contains_key("nomadicmatt_blog"));

    let latest = &freshness.latest_item_by_source["medium_travel"];
    assert_eq!(latest.title, "Azores whale watching");
    assert_eq!(latest.url, "https://medium.com/p/azores-1");
}

#[test]
fn test_cadence() {
    let snapshot = sample_snapshot(MetricsConfig::default());

    assert_eq!(snapshot.cadence.len(), 30);
    assert_eq!(
        snapshot.cadence[0].date,
        NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()
    );
    assert_eq!(snapshot.cadence.iter().map(|d| d.count).sum::<u64>(), 5);

    let feb_12 = snapshot
        .cadence
        .iter()
        .find(|d| d.date == NaiveDate::from_ymd_opt(2026, 2, 12).unwrap())
        .unwrap();
    assert_eq!(feb_12.count, 2);
}

#[test]
fn test_keywords_and_trending() {
    let snapshot = sample_snapshot(MetricsConfig::default());

    assert_eq!(
        &snapshot.topics_global[..5],
        &[
            KeywordCount::new("azores", 3),
            KeywordCount::new("budget", 3),
            KeywordCount::new("crawl", 2),
            KeywordCount::new("madrid", 2),
            KeywordCount::new("tapas", 2),
        ]
    );

    let order: Vec<&str> = snapshot.trending.iter().map(|d| d.keyword.as_str()).collect();
    assert_eq!(
        order,
        vec!["azores", "budget", "repost", "watching", "whale", "crawl", "madrid", "tapas"]
    );
    assert_eq!(snapshot.trending[0], TrendDelta::new("azores", 3, 0));
    assert_eq!(snapshot.trending[7].delta, -2);

    assert!(snapshot.trending_per_source["nomadicmatt_blog"].is_empty());
    assert_eq!(snapshot.trending_per_source["lonelyplanet_articles"].len(), 3);
}

#[test]
fn test_rising_only_policy_drops_declines() {
    let config = MetricsConfig {
        trend_policy: TrendPolicy::RisingOnly,
        ..Default::default()
    };
    let snapshot = sample_snapshot(config);

    assert_eq!(snapshot.trending.len(), 5);
    assert!(snapshot.trending.iter().all(|d| d.delta > 0));
}

#[test]
fn test_duplicates() {
    let snapshot = sample_snapshot(MetricsConfig::default());

    assert_eq!(snapshot.quality.url_groups.len(), 1);
    assert_eq!(
        snapshot.quality.url_groups[0].key,
        "https://medium.com/p/azores-2"
    );
    assert_eq!(snapshot.quality.title_groups.len(), 1);
    assert_eq!(snapshot.quality.title_groups[0].key, "madrid tapas crawl");
    assert_eq!(snapshot.quality.title_groups[0].count, 2);
}

#[test]
fn test_shipped_config_stopwords_apply() {
    let config = Config::from_file(std::path::Path::new("config.toml")).unwrap();
    assert!(config.metrics.stopwords.extra.iter().any(|w| w == "guide"));

    let snapshot = sample_snapshot(config.metrics);
    assert_eq!(snapshot.topics_global[0].keyword, "azores");
}

#[test]
fn test_snapshot_roundtrip_and_report() {
    let dir = TempDir::new().unwrap();
    let snapshot = sample_snapshot(MetricsConfig::default());

    let metrics_path = dir.path().join("processed/metrics.json");
    snapshot.save(&metrics_path).unwrap();
    let loaded = MetricsSnapshot::load(&metrics_path).unwrap();
    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.fingerprint().unwrap(), snapshot.fingerprint().unwrap());

    let input = write_input(dir.path(), "parsed_items.jsonl", SAMPLE_ITEMS_JSONL);
    let records = read_jsonl(&input).unwrap().records;

    let renderer = ReportRenderer::new(Config::default().report).unwrap();
    let report_path = renderer
        .save(&loaded, &records, &dir.path().join("reports"))
        .unwrap();
    let markdown = std::fs::read_to_string(report_path).unwrap();

    assert!(markdown.contains("Collected **7** items across 3 sources."));
    assert!(markdown.contains("`azores`(+3)"));
    assert!(markdown.contains("Title \"madrid tapas crawl\" seen 2 times (lonelyplanet_articles)"));
    assert!(markdown.contains("## Sample items"));
    assert!(markdown.contains("[Azores whale watching](https://medium.com/p/azores-1)"));
}

#[test]
fn test_dashboard_from_saved_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = sample_snapshot(MetricsConfig::default());
    let metrics_path = dir.path().join("processed/metrics.json");
    snapshot.save(&metrics_path).unwrap();
    let loaded = MetricsSnapshot::load(&metrics_path).unwrap();

    let renderer = DashboardRenderer::new(Config::default().report).unwrap();
    let path = renderer.save(&loaded, &dir.path().join("reports")).unwrap();
    assert!(path.ends_with("dashboard_2026-02-14.html"));

    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("Most recent item by source"));
    assert!(html.contains("https://medium.com/p/azores-1"));
    assert!(html.contains("medium_travel"));
    assert_eq!(html.matches("class=\"cadence-col\"").count(), 30);
}

#[test]
fn test_repeated_runs_identical() {
    let a = sample_snapshot(MetricsConfig::default());
    let b = sample_snapshot(MetricsConfig::default());

    assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}
