use colored::Colorize;
use forecast_core::{ChartOutcome, RunReport};
use forecast_domain::{
    format_currency, CellValue, CurrencyCode, NumberFormat, SeriesStats, SheetPreview,
};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::utils::build_info::BuildMetadata;

const PREVIEW_CELL_WIDTH: usize = 24;

pub fn section(title: impl AsRef<str>) {
    println!("\n{}", format!("=== {} ===", title.as_ref()).bold());
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "[ok]".green().bold(), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{} {}", "[!]".yellow().bold(), message.as_ref());
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl MetricRow {
    fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Days")]
    days: usize,
    #[tabled(rename = "Forecast")]
    point: String,
    #[tabled(rename = "Lower")]
    lower: String,
    #[tabled(rename = "Upper")]
    upper: String,
}

fn metric_table(rows: Vec<MetricRow>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn history_table(
    stats: &SeriesStats,
    records: usize,
    dropped: usize,
    currency: &CurrencyCode,
    format: &NumberFormat,
) -> String {
    let money = |value: f64| format_currency(value, currency, format);
    metric_table(vec![
        MetricRow::new("Rows read", records.to_string()),
        MetricRow::new("Rows dropped", dropped.to_string()),
        MetricRow::new("Distinct days", stats.days.to_string()),
        MetricRow::new(
            "Period",
            format!("{} to {}", stats.first_date, stats.last_date),
        ),
        MetricRow::new("Total", money(stats.total)),
        MetricRow::new("Mean per day", money(stats.mean)),
        MetricRow::new("Median per day", money(stats.median)),
        MetricRow::new("Std deviation", money(stats.std_dev)),
        MetricRow::new("Min", money(stats.min)),
        MetricRow::new("Max", money(stats.max)),
    ])
}

pub fn projection_table(
    report: &RunReport,
    currency: &CurrencyCode,
    format: &NumberFormat,
) -> String {
    let money = |value: f64| format_currency(value, currency, format);
    let rows: Vec<MonthRow> = report
        .projection
        .months
        .iter()
        .map(|month| MonthRow {
            month: month.label.clone(),
            days: month.days,
            point: money(month.point),
            lower: money(month.lower),
            upper: money(month.upper),
        })
        .collect();
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

pub fn totals_table(
    report: &RunReport,
    currency: &CurrencyCode,
    format: &NumberFormat,
) -> String {
    let projection = &report.projection;
    let money = |value: f64| format_currency(value, currency, format);
    metric_table(vec![
        MetricRow::new(
            format!("Total forecast revenue {}", projection.year),
            money(projection.total_point),
        ),
        MetricRow::new("Average daily revenue", money(projection.mean_daily)),
        MetricRow::new("Lower bound total", money(projection.total_lower)),
        MetricRow::new("Upper bound total", money(projection.total_upper)),
        MetricRow::new("Forecast method", report.forecast.method.clone()),
        MetricRow::new(
            "Horizon",
            format!("{} day(s) through {}", report.horizon.days, report.horizon.end),
        ),
    ])
}

pub fn chart_lines(charts: &[ChartOutcome]) -> Vec<String> {
    charts
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(path) => format!("{} chart: {}", outcome.kind, path.display()),
            Err(reason) => format!("{} chart failed: {}", outcome.kind, reason),
        })
        .collect()
}

fn clip(text: String) -> String {
    if text.chars().count() <= PREVIEW_CELL_WIDTH {
        return text;
    }
    let mut clipped: String = text.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

pub fn preview_table(preview: &SheetPreview) -> String {
    let mut builder = Builder::default();
    builder.push_record(preview.headers.iter().cloned().map(clip));
    for row in &preview.rows {
        builder.push_record(row.iter().map(CellValue::to_string).map(clip));
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn build_table(meta: &BuildMetadata) -> String {
    metric_table(vec![
        MetricRow::new("Version", meta.version),
        MetricRow::new("Build hash", format!("{} ({})", meta.git_hash, meta.git_status)),
        MetricRow::new("Built at", meta.timestamp),
        MetricRow::new("Target", meta.target),
        MetricRow::new("Profile", meta.profile),
        MetricRow::new("Rustc", meta.rustc),
    ])
}
