//! Free-form metric/value rows for the report summary sheet.

use chrono::NaiveDateTime;
use forecast_domain::{format_currency, CurrencyCode, NumberFormat, YearProjection};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub metric: String,
    pub value: String,
}

impl SummaryRow {
    fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }
}

/// Totals, daily mean, bound totals, generation time and method name.
pub fn summary_rows(
    projection: &YearProjection,
    method: &str,
    generated_at: NaiveDateTime,
    currency: &CurrencyCode,
    format: &NumberFormat,
) -> Vec<SummaryRow> {
    let money = |value: f64| format_currency(value, currency, format);
    vec![
        SummaryRow::new(
            format!("Total forecast revenue {}", projection.year),
            money(projection.total_point),
        ),
        SummaryRow::new("Average daily revenue", money(projection.mean_daily)),
        SummaryRow::new("Lower bound total", money(projection.total_lower)),
        SummaryRow::new("Upper bound total", money(projection.total_upper)),
        SummaryRow::new("Generated at", generated_at.format(TIMESTAMP_FORMAT).to_string()),
        SummaryRow::new("Forecast method", method),
    ]
}
