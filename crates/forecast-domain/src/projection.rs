//! Target-year rollups of a forecast.

use serde::{Deserialize, Serialize};

/// Forecast totals for one calendar month of the target year.
///
/// Bounds are the plain sums of the daily bounds, not a joint interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    pub month: u32,
    pub label: String,
    pub days: usize,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl MonthlyForecast {
    /// Distance from the point estimate down to the lower bound.
    pub fn error_below(&self) -> f64 {
        (self.point - self.lower).max(0.0)
    }

    /// Distance from the point estimate up to the upper bound.
    pub fn error_above(&self) -> f64 {
        (self.upper - self.point).max(0.0)
    }
}

/// Everything reported about the target year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: i32,
    pub days: usize,
    pub total_point: f64,
    pub total_lower: f64,
    pub total_upper: f64,
    pub mean_daily: f64,
    pub months: Vec<MonthlyForecast>,
}

impl YearProjection {
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }

    pub fn month(&self, month: u32) -> Option<&MonthlyForecast> {
        self.months.iter().find(|entry| entry.month == month)
    }
}
