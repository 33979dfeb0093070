//! Rolls the daily forecast of the target year up into calendar months.

use std::collections::BTreeMap;

use chrono::Datelike;
use forecast_domain::{Forecast, MonthLanguage, MonthlyForecast, YearProjection};

/// Keeps the points dated in `year` and sums them per calendar month.
///
/// Point, lower and upper are summed independently, so monthly bounds are the
/// linear sum of daily bounds rather than a combined prediction interval.
/// Months without forecast days are omitted.
pub fn project_year(forecast: &Forecast, year: i32, language: MonthLanguage) -> YearProjection {
    let mut months: BTreeMap<u32, MonthlyForecast> = BTreeMap::new();
    let mut days = 0;
    let (mut total_point, mut total_lower, mut total_upper) = (0.0, 0.0, 0.0);

    for point in forecast.points_in_year(year) {
        let month = point.date.month();
        let entry = months.entry(month).or_insert_with(|| MonthlyForecast {
            month,
            label: language.month_name(month).to_string(),
            days: 0,
            point: 0.0,
            lower: 0.0,
            upper: 0.0,
        });
        entry.days += 1;
        entry.point += point.point;
        entry.lower += point.lower;
        entry.upper += point.upper;

        days += 1;
        total_point += point.point;
        total_lower += point.lower;
        total_upper += point.upper;
    }

    let mean_daily = if days > 0 {
        total_point / days as f64
    } else {
        0.0
    };
    if days == 0 {
        tracing::warn!(year, "forecast has no points in the target year");
    }

    YearProjection {
        year,
        days,
        total_point,
        total_lower,
        total_upper,
        mean_daily,
        months: months.into_values().collect(),
    }
}
