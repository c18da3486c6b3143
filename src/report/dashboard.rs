//! Static HTML dashboard rendered from a snapshot
//!
//! KPI cards, per-source volume bars, a 30-day cadence stacked by source,
//! keyword and trend bars, and the most recent item of every source. Charts
//! are plain HTML/CSS bars sized in percent of the largest value, so the page
//! works offline. Text is HTML-escaped by the template engine.

use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::format_delta;
use crate::analytics::MetricsSnapshot;
use crate::config::ReportConfig;
use crate::error::Result;

/// Default dashboard template
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/dashboard.hbs");

const TEMPLATE_NAME: &str = "dashboard";

/// Number of `.sN` color classes in the template
const PALETTE_SIZE: usize = 8;

#[derive(Debug, Serialize)]
struct Kpi {
    label: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct Bar {
    label: String,
    value: String,
    width: String,
    negative: bool,
    #[serde(skip)]
    magnitude: u64,
}

impl Bar {
    fn count(label: &str, count: u64) -> Self {
        Self {
            label: label.to_string(),
            value: count.to_string(),
            width: String::new(),
            negative: false,
            magnitude: count,
        }
    }

    fn delta(label: &str, delta: i64) -> Self {
        Self {
            label: label.to_string(),
            value: format_delta(delta),
            width: String::new(),
            negative: delta < 0,
            magnitude: delta.unsigned_abs(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BarChart {
    title: String,
    bars: Vec<Bar>,
}

impl BarChart {
    fn new(title: impl Into<String>, bars: Vec<Bar>) -> Self {
        let max = bars.iter().map(|bar| bar.magnitude).max().unwrap_or(0);
        let bars = bars
            .into_iter()
            .map(|bar| Bar {
                width: percent(bar.magnitude, max),
                ..bar
            })
            .collect();
        Self {
            title: title.into(),
            bars,
        }
    }
}

#[derive(Debug, Serialize)]
struct Segment {
    source: String,
    count: u64,
    height: String,
    color: usize,
}

#[derive(Debug, Serialize)]
struct CadenceColumn {
    date: String,
    total: u64,
    segments: Vec<Segment>,
}

#[derive(Debug, Serialize)]
struct LegendEntry {
    source: String,
    color: usize,
}

#[derive(Debug, Serialize)]
struct RecentRow {
    source: String,
    title: String,
    url: Option<String>,
    published: String,
}

/// Template data for rendering
#[derive(Debug, Serialize)]
struct DashboardTemplateData {
    title: String,
    generated_at: String,
    cadence_days: usize,
    kpis: Vec<Kpi>,
    notes: Vec<String>,
    charts: Vec<BarChart>,
    cadence_columns: Vec<CadenceColumn>,
    legend: Vec<LegendEntry>,
    recent_rows: Vec<RecentRow>,
}

/// `value` as a percentage of `max`, one decimal
fn percent(value: u64, max: u64) -> String {
    if max == 0 {
        return String::from("0.0");
    }
    format!("{:.1}", value as f64 * 100.0 / max as f64)
}

fn build_kpis(snapshot: &MetricsSnapshot) -> Vec<Kpi> {
    let kpi = |label: String, value: String| Kpi { label, value };
    vec![
        kpi("Items collected".into(), snapshot.volume.total.to_string()),
        kpi("Sources".into(), snapshot.volume.by_source.len().to_string()),
        kpi(
            format!("Items (last {}d)", snapshot.freshness.window_days),
            snapshot.freshness.recent_count.to_string(),
        ),
        kpi(
            "Duplicates (URLs / titles)".into(),
            format!(
                "{} / {}",
                snapshot.quality.url_groups.len(),
                snapshot.quality.title_groups.len()
            ),
        ),
    ]
}

fn build_notes(snapshot: &MetricsSnapshot) -> Vec<String> {
    let mut notes = Vec::new();

    if snapshot.cadence.iter().all(|day| day.count == 0) {
        notes.push(format!(
            "No dated items in the last {} days, so the cadence chart is empty.",
            snapshot.cadence.len()
        ));
    }
    if snapshot.trending.is_empty() {
        notes.push(String::from(
            "Trending keywords stay empty until there is week-over-week spread.",
        ));
    }
    if snapshot.coverage.without_published_at > 0 {
        notes.push(format!(
            "{} item(s) have no publish date and only count toward totals and duplicates.",
            snapshot.coverage.without_published_at
        ));
    }

    notes
}

fn build_charts(snapshot: &MetricsSnapshot, config: &ReportConfig) -> Vec<BarChart> {
    let freshness = &snapshot.freshness;
    let limit = config.dashboard_keywords;

    vec![
        BarChart::new(
            "Items by source (total)",
            snapshot
                .volume
                .by_source
                .iter()
                .map(|(source, &count)| Bar::count(source, count))
                .collect(),
        ),
        BarChart::new(
            format!("Items in the last {} days", freshness.window_days),
            snapshot
                .volume
                .by_source
                .keys()
                .map(|source| {
                    Bar::count(
                        source,
                        freshness.recent_by_source.get(source).copied().unwrap_or(0),
                    )
                })
                .collect(),
        ),
        BarChart::new(
            "Top keywords (titles)",
            snapshot
                .topics_global
                .iter()
                .take(limit)
                .map(|k| Bar::count(&k.keyword, k.count))
                .collect(),
        ),
        BarChart::new(
            "Trending keywords (delta vs previous period)",
            snapshot
                .trending
                .iter()
                .take(limit)
                .map(|d| Bar::delta(&d.keyword, d.delta))
                .collect(),
        ),
    ]
}

/// One stacked column per cadence day, segments in source order
fn build_cadence(snapshot: &MetricsSnapshot) -> (Vec<CadenceColumn>, Vec<LegendEntry>) {
    let legend: Vec<LegendEntry> = snapshot
        .cadence_by_source
        .keys()
        .enumerate()
        .map(|(index, source)| LegendEntry {
            source: source.clone(),
            color: index % PALETTE_SIZE,
        })
        .collect();

    let max_total = snapshot.cadence.iter().map(|day| day.count).max().unwrap_or(0);

    let columns = snapshot
        .cadence
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let segments = legend
                .iter()
                .filter_map(|entry| {
                    let source_day = snapshot.cadence_by_source[&entry.source].get(index)?;
                    (source_day.date == day.date && source_day.count > 0).then(|| Segment {
                        source: entry.source.clone(),
                        count: source_day.count,
                        height: percent(source_day.count, max_total),
                        color: entry.color,
                    })
                })
                .collect();

            CadenceColumn {
                date: day.date.format("%m-%d").to_string(),
                total: day.count,
                segments,
            }
        })
        .collect();

    (columns, legend)
}

fn build_recent(snapshot: &MetricsSnapshot) -> Vec<RecentRow> {
    snapshot
        .volume
        .by_source
        .keys()
        .map(|source| match snapshot.freshness.latest_item_by_source.get(source) {
            Some(item) => RecentRow {
                source: source.clone(),
                title: if item.title.trim().is_empty() {
                    item.url.clone()
                } else {
                    item.title.clone()
                },
                url: Some(item.url.clone()),
                published: item.published_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
            None => RecentRow {
                source: source.clone(),
                title: String::from("n/a"),
                url: None,
                published: String::from("n/a"),
            },
        })
        .collect()
}

fn build_data(snapshot: &MetricsSnapshot, config: &ReportConfig) -> DashboardTemplateData {
    let (cadence_columns, legend) = build_cadence(snapshot);

    DashboardTemplateData {
        title: format!(
            "Feed Operations Dashboard ({})",
            snapshot.generated_at.format("%Y-%m-%d")
        ),
        generated_at: snapshot.generated_at.to_rfc3339(),
        cadence_days: snapshot.cadence.len(),
        kpis: build_kpis(snapshot),
        notes: build_notes(snapshot),
        charts: build_charts(snapshot, config),
        cadence_columns,
        legend,
        recent_rows: build_recent(snapshot),
    }
}

/// File name of the dashboard for a snapshot: `dashboard_<YYYY-MM-DD>.html`
pub fn dashboard_filename(snapshot: &MetricsSnapshot) -> String {
    format!("dashboard_{}.html", snapshot.generated_at.format("%Y-%m-%d"))
}

/// HTML dashboard renderer
pub struct DashboardRenderer<'a> {
    handlebars: Handlebars<'a>,
    config: ReportConfig,
}

impl<'a> DashboardRenderer<'a> {
    /// Create a renderer using `config.dashboard_template` when set, else the embedded template
    pub fn new(config: ReportConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();

        match &config.dashboard_template {
            Some(path) => handlebars.register_template_file(TEMPLATE_NAME, path)?,
            None => handlebars.register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE)?,
        }

        Ok(Self { handlebars, config })
    }

    /// Render a snapshot to an HTML page
    pub fn render(&self, snapshot: &MetricsSnapshot) -> Result<String> {
        let data = build_data(snapshot, &self.config);
        Ok(self.handlebars.render(TEMPLATE_NAME, &data)?)
    }

    /// Render and write to `output_dir/dashboard_<date>.html`
    pub fn save(&self, snapshot: &MetricsSnapshot, output_dir: &Path) -> Result<PathBuf> {
        let html = self.render(snapshot)?;
        fs::create_dir_all(output_dir)?;

        let path = output_dir.join(dashboard_filename(snapshot));
        fs::write(&path, html)?;

        tracing::info!(path = %path.display(), "Wrote dashboard");
        Ok(path)
    }
}
