//! Forecast engine output: per-day estimates and the model's own components.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Point estimate with a two-sided uncertainty band for one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, point: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            point,
            lower,
            upper,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
/// How seasonal terms combine with the trend.
pub enum SeasonalityMode {
    Additive,
    #[default]
    Multiplicative,
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeasonalityMode::Additive => "additive",
            SeasonalityMode::Multiplicative => "multiplicative",
        };
        f.write_str(label)
    }
}

/// One named component of the fitted model, aligned with `Forecast::points`.
///
/// Trend values are in revenue units. Seasonal values are in revenue units for
/// additive models and a fraction of the trend for multiplicative ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSeries {
    pub name: String,
    pub period_days: Option<f64>,
    pub mode: SeasonalityMode,
    pub values: Vec<f64>,
}

impl ComponentSeries {
    pub fn is_trend(&self) -> bool {
        self.period_days.is_none()
    }
}

/// Full model output covering the history and the forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub method: String,
    pub interval_width: f64,
    pub history_end: NaiveDate,
    pub points: Vec<ForecastPoint>,
    #[serde(default)]
    pub components: Vec<ComponentSeries>,
}

impl Forecast {
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    pub fn future_points(&self) -> impl Iterator<Item = &ForecastPoint> {
        let history_end = self.history_end;
        self.points.iter().filter(move |point| point.date > history_end)
    }

    pub fn points_in_year(&self, year: i32) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(move |point| point.date.year() == year)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSeries> {
        self.components.iter().find(|component| component.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(y: i32, m: u32, d: u32, value: f64) -> ForecastPoint {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        ForecastPoint::new(date, value, value - 1.0, value + 1.0)
    }

    #[test]
    fn future_points_start_after_history() {
        let forecast = Forecast {
            method: "test".into(),
            interval_width: 0.8,
            history_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            points: vec![
                point(2025, 12, 30, 1.0),
                point(2025, 12, 31, 2.0),
                point(2026, 1, 1, 3.0),
            ],
            components: Vec::new(),
        };

        assert_eq!(forecast.future_points().count(), 1);
        assert_eq!(forecast.points_in_year(2025).count(), 2);
        assert_eq!(forecast.end_date(), NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn seasonality_mode_serializes_lowercase() {
        let json = serde_json::to_string(&SeasonalityMode::Additive).unwrap();
        assert_eq!(json, "\"additive\"");
    }
}
