//! Markdown report rendering with the Handlebars template engine
//!
//! Turns a [`MetricsSnapshot`] into a weekly operations report: executive
//! summary, volume and freshness tables, keyword rankings, trending
//! keywords, duplicate groups, a short list of recommended actions and,
//! when the input items are at hand, a few sample items per source.
//!
//! The HTML dashboard lives in [`dashboard`].

pub mod dashboard;

pub use dashboard::{dashboard_filename, DashboardRenderer};

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{DuplicateGroup, MetricsSnapshot, TrendDelta, TrendDirection};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::models::{ContentRecord, KeywordCount};
use crate::utils::{escape_table_cell, truncate_text};

/// Default report template
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report.hbs");

const TEMPLATE_NAME: &str = "report";

/// Keywords named in the executive summary and momentum recommendation
const SUMMARY_KEYWORDS: usize = 5;

/// Longest duplicate key shown before truncation
const MAX_KEY_LEN: usize = 90;

#[derive(Debug, Serialize)]
struct VolumeRow {
    source: String,
    total: u64,
    recent: u64,
}

#[derive(Debug, Serialize)]
struct FreshnessRow {
    source: String,
    latest: String,
    item: String,
}

#[derive(Debug, Serialize)]
struct SampleSection {
    source: String,
    items: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SourceTerms {
    source: String,
    terms: String,
}

#[derive(Debug, Serialize)]
struct TrendRow {
    keyword: String,
    current: u64,
    previous: u64,
    delta: String,
    direction: &'static str,
}

#[derive(Debug, Serialize)]
struct GroupRow {
    key: String,
    count: u64,
    sources: String,
}

/// Template data for rendering
#[derive(Debug, Serialize)]
struct ReportTemplateData {
    date: String,
    generated_at: String,
    window_days: u32,
    recent_count: u64,
    trend_period: String,
    summary: Vec<String>,
    volume_rows: Vec<VolumeRow>,
    freshness_rows: Vec<FreshnessRow>,
    top_keywords: String,
    keywords_by_source: Vec<SourceTerms>,
    trending_rows: Vec<TrendRow>,
    trending_by_source: Vec<SourceTerms>,
    url_group_count: usize,
    title_group_count: usize,
    url_groups: Vec<GroupRow>,
    title_groups: Vec<GroupRow>,
    recommendations: Vec<String>,
    sample_sections: Vec<SampleSection>,
}

/// `[title](url)` for a table cell; the url stands in for an empty title
fn markdown_link(title: &str, url: &str) -> String {
    let text = if title.trim().is_empty() { url } else { title };
    let text = escape_table_cell(text).replace('[', "\\[").replace(']', "\\]");
    format!("[{}]({})", text, url.replace(' ', "%20"))
}

/// First `per_source` items of every source, input order kept
fn sample_sections(items: &[ContentRecord], per_source: usize) -> Vec<SampleSection> {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for item in items {
        let entries = grouped.entry(item.source_id.as_str()).or_default();
        if entries.len() < per_source {
            let published = item
                .published_at
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| String::from("n/a"));
            entries.push(format!(
                "{} (`{}`)",
                markdown_link(&item.title, &item.url),
                published
            ));
        }
    }

    grouped
        .into_iter()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(source, items)| SampleSection {
            source: source.to_string(),
            items,
        })
        .collect()
}

fn format_keywords(keywords: &[KeywordCount], limit: usize) -> String {
    if keywords.is_empty() {
        return String::from("n/a");
    }
    keywords
        .iter()
        .take(limit)
        .map(|k| format!("`{}`({})", k.keyword, k.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

fn format_trends(deltas: &[TrendDelta], limit: usize) -> String {
    if deltas.is_empty() {
        return String::from("n/a");
    }
    deltas
        .iter()
        .take(limit)
        .map(|d| format!("`{}`({})", d.keyword, format_delta(d.delta)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::New => "new",
        TrendDirection::Rising => "rising",
        TrendDirection::Stable => "stable",
        TrendDirection::Falling => "falling",
    }
}

fn group_rows(groups: &[DuplicateGroup]) -> Vec<GroupRow> {
    groups
        .iter()
        .map(|group| GroupRow {
            key: truncate_text(&escape_table_cell(&group.key), MAX_KEY_LEN),
            count: group.count,
            sources: group
                .sources
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

/// Executive summary bullets
fn build_summary(snapshot: &MetricsSnapshot) -> Vec<String> {
    let mut bullets = vec![
        format!(
            "Collected **{}** items across {} sources.",
            snapshot.volume.total,
            snapshot.volume.by_source.len()
        ),
        format!(
            "Top title keywords: **{}**.",
            format_keywords(&snapshot.topics_global, SUMMARY_KEYWORDS)
        ),
    ];

    let silent = snapshot.freshness.silent_sources();
    if !silent.is_empty() {
        bullets.push(format!(
            "No items in the last {} days for: **{}** (or missing dates).",
            snapshot.freshness.window_days,
            silent.join(", ")
        ));
    }

    bullets
}

/// Recommended actions derived from the snapshot
fn build_recommendations(snapshot: &MetricsSnapshot, config: &ReportConfig) -> Vec<String> {
    let mut recs = vec![String::from("**Content strategy**")];

    let rising: Vec<&str> = snapshot
        .trending
        .iter()
        .filter(|d| d.delta > 0)
        .take(SUMMARY_KEYWORDS)
        .map(|d| d.keyword.as_str())
        .collect();
    if rising.is_empty() {
        recs.push(String::from(
            "- No clear week-over-week keyword momentum detected yet. \
             Trending signals will strengthen as more dated items accumulate.",
        ));
    } else {
        recs.push(format!(
            "- Emerging keyword momentum detected: **{}**. \
             Consider prioritizing these topics in upcoming content.",
            rising.join(", ")
        ));
    }

    recs.push(String::new());
    recs.push(String::from("**Data quality: duplicates and noise**"));

    if snapshot.quality.url_groups.is_empty() {
        recs.push(String::from(
            "- No URL duplicates detected: collection and parsing look healthy.",
        ));
    } else {
        recs.push(format!(
            "- Investigate {} duplicate URL group(s): possible pagination repeats or parsing duplicates.",
            snapshot.quality.url_groups.len()
        ));
    }

    if !snapshot.quality.title_groups.is_empty() {
        recs.push(format!(
            "- {} headline(s) appear more than once: likely syndication or reposts.",
            snapshot.quality.title_groups.len()
        ));
    }

    if snapshot.coverage.without_published_at > 0 {
        recs.push(format!(
            "- {} item(s) have no publish date and are excluded from windowed metrics.",
            snapshot.coverage.without_published_at
        ));
    }

    for (source, terms) in &config.offtopic_terms {
        let Some(top) = snapshot.topics_per_source.get(source) else {
            continue;
        };
        let hits: Vec<&str> = top
            .iter()
            .filter(|k| terms.iter().any(|t| t.eq_ignore_ascii_case(&k.keyword)))
            .map(|k| k.keyword.as_str())
            .collect();

        if hits.is_empty() {
            recs.push(format!(
                "- Keyword distribution looks on-topic for '{source}' (heuristic)."
            ));
        } else {
            recs.push(format!(
                "- Possible off-topic noise in '{source}' ({}). Consider a title-based filter or source quality score.",
                hits.join(", ")
            ));
        }
    }

    recs
}

fn build_data(
    snapshot: &MetricsSnapshot,
    items: &[ContentRecord],
    config: &ReportConfig,
) -> ReportTemplateData {
    let freshness = &snapshot.freshness;

    let mut volume_rows: Vec<VolumeRow> = snapshot
        .volume
        .by_source
        .iter()
        .map(|(source, &total)| VolumeRow {
            source: escape_table_cell(source),
            total,
            recent: freshness.recent_by_source.get(source).copied().unwrap_or(0),
        })
        .collect();
    volume_rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.source.cmp(&b.source)));

    let freshness_rows = snapshot
        .volume
        .by_source
        .keys()
        .map(|source| FreshnessRow {
            source: escape_table_cell(source),
            latest: freshness
                .latest_by_source
                .get(source)
                .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| String::from("n/a")),
            item: freshness
                .latest_item_by_source
                .get(source)
                .map(|item| markdown_link(&item.title, &item.url))
                .unwrap_or_else(|| String::from("n/a")),
        })
        .collect();

    let per_source_terms = |source: &String| SourceTerms {
        source: source.clone(),
        terms: format_keywords(
            snapshot
                .topics_per_source
                .get(source)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            config.keywords_per_source,
        ),
    };

    let windows = &snapshot.trend_windows;

    ReportTemplateData {
        date: snapshot.generated_at.format("%Y-%m-%d").to_string(),
        generated_at: snapshot.generated_at.to_rfc3339(),
        window_days: freshness.window_days,
        recent_count: freshness.recent_count,
        trend_period: format!(
            "{} to {} vs {} to {}",
            windows.current.start.format("%Y-%m-%d"),
            windows.current.end.format("%Y-%m-%d"),
            windows.previous.start.format("%Y-%m-%d"),
            windows.previous.end.format("%Y-%m-%d"),
        ),
        summary: build_summary(snapshot),
        volume_rows,
        freshness_rows,
        top_keywords: format_keywords(&snapshot.topics_global, snapshot.topics_global.len()),
        keywords_by_source: snapshot.volume.by_source.keys().map(per_source_terms).collect(),
        trending_rows: snapshot
            .trending
            .iter()
            .map(|d| TrendRow {
                keyword: d.keyword.clone(),
                current: d.current_count,
                previous: d.previous_count,
                delta: format_delta(d.delta),
                direction: direction_label(d.direction()),
            })
            .collect(),
        trending_by_source: snapshot
            .volume
            .by_source
            .keys()
            .map(|source| SourceTerms {
                source: source.clone(),
                terms: format_trends(
                    snapshot
                        .trending_per_source
                        .get(source)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                    config.keywords_per_source,
                ),
            })
            .collect(),
        url_group_count: snapshot.quality.url_groups.len(),
        title_group_count: snapshot.quality.title_groups.len(),
        url_groups: group_rows(&snapshot.quality.url_groups),
        title_groups: group_rows(&snapshot.quality.title_groups),
        recommendations: build_recommendations(snapshot, config),
        sample_sections: sample_sections(items, config.sample_items_per_source),
    }
}

/// File name of the report for a snapshot: `report_<YYYY-MM-DD>.md`
pub fn report_filename(snapshot: &MetricsSnapshot) -> String {
    format!("report_{}.md", snapshot.generated_at.format("%Y-%m-%d"))
}

/// Markdown report renderer
pub struct ReportRenderer<'a> {
    /// Handlebars template engine
    handlebars: Handlebars<'a>,

    config: ReportConfig,
}

impl<'a> ReportRenderer<'a> {
    /// Create a renderer using `config.template` when set, else the embedded template
    pub fn new(config: ReportConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        match &config.template {
            Some(path) => handlebars.register_template_file(TEMPLATE_NAME, path)?,
            None => handlebars.register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE)?,
        }

        Ok(Self { handlebars, config })
    }

    /// Render a snapshot to a markdown string
    ///
    /// `items` feeds the "Sample items" section, which is left out when empty.
    pub fn render(&self, snapshot: &MetricsSnapshot, items: &[ContentRecord]) -> Result<String> {
        let data = build_data(snapshot, items, &self.config);
        Ok(self.handlebars.render(TEMPLATE_NAME, &data)?)
    }

    /// Render and write to `output_dir/report_<date>.md`
    ///
    /// # Returns
    /// Path to saved file
    pub fn save(
        &self,
        snapshot: &MetricsSnapshot,
        items: &[ContentRecord],
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let markdown = self.render(snapshot, items)?;
        fs::create_dir_all(output_dir)?;

        let path = output_dir.join(report_filename(snapshot));
        fs::write(&path, markdown)?;

        tracing::info!(path = %path.display(), "Wrote report");
        Ok(path)
    }
}
