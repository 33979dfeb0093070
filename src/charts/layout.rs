//! Axis arithmetic shared by the chart renderer.

use std::ops::Range;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

const VALUE_PADDING: f64 = 0.05;
const WEEK_DAYS: f64 = 7.0;
const MAX_DECIMALS: f64 = 4.0;

/// Padded `(min, max)` for a value axis; never an empty range.
pub fn value_range<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * VALUE_PADDING
    } else {
        min.abs().max(1.0) * VALUE_PADDING
    };
    (min - pad, max + pad)
}

pub fn day_offset(base: NaiveDate, date: NaiveDate) -> f64 {
    (date - base).num_days() as f64
}

pub fn date_label(base: NaiveDate, offset: f64, format: &str) -> String {
    (base + Duration::days(offset.round() as i64))
        .format(format)
        .to_string()
}

/// Tick label format suited to an axis spanning `span_days`.
pub fn date_axis_format(span_days: f64) -> &'static str {
    if span_days <= 14.0 {
        "%a %d %b"
    } else if span_days <= 400.0 {
        "%d %b"
    } else {
        "%b %Y"
    }
}

/// Tick labels for a value axis, with unit and precision fitted to its range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFormat {
    scale: f64,
    suffix: &'static str,
    decimals: usize,
    signed: bool,
}

impl AxisFormat {
    /// Currency amounts; switches to `k` or `M` once the axis reaches 10,000.
    pub fn money(range: (f64, f64), ticks: usize) -> Self {
        let magnitude = range.0.abs().max(range.1.abs());
        let (scale, suffix) = if magnitude >= 1e6 {
            (1e6, "M")
        } else if magnitude >= 1e4 {
            (1e3, "k")
        } else {
            (1.0, "")
        };
        Self {
            scale,
            suffix,
            decimals: decimals_for(tick_step(range, ticks) / scale),
            signed: false,
        }
    }

    /// Fractions of trend rendered as signed percentages.
    pub fn percent(range: (f64, f64), ticks: usize) -> Self {
        Self {
            scale: 0.01,
            suffix: "%",
            decimals: decimals_for(tick_step(range, ticks) * 100.0),
            signed: true,
        }
    }

    pub fn label(&self, value: f64, prefix: &str) -> String {
        let body = format!("{:.*}", self.decimals, (value / self.scale).abs());
        let is_zero = body.chars().all(|c| c == '0' || c == '.');
        let sign = match (is_zero, value < 0.0, self.signed) {
            (true, _, _) => "",
            (false, true, _) => "-",
            (false, false, true) => "+",
            (false, false, false) => "",
        };
        format!("{}{}{}{}", sign, prefix, body, self.suffix)
    }
}

fn tick_step(range: (f64, f64), ticks: usize) -> f64 {
    (range.1 - range.0).abs() / ticks.max(1) as f64
}

/// Decimals needed so neighbouring ticks `step` apart print differently.
fn decimals_for(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    (-step.log10().floor()).clamp(0.0, MAX_DECIMALS) as usize
}

/// Index range covering one cycle of a seasonal component.
///
/// The window starts inside `year` when possible (weekly cycles on a Monday)
/// and never crosses into the following year. Without dates in `year` the
/// last cycle of `dates` is used.
pub fn cycle_window(dates: &[NaiveDate], period_days: f64, year: i32) -> Range<usize> {
    let length = (period_days.ceil() as usize).max(2).min(dates.len());
    let in_year = dates.iter().position(|date| date.year() == year);

    let Some(mut start) = in_year else {
        return dates.len() - length..dates.len();
    };
    if (period_days - WEEK_DAYS).abs() < 0.5 {
        if let Some(monday) = dates[start..]
            .iter()
            .position(|date| date.weekday() == Weekday::Mon)
        {
            start += monday;
        }
    }

    let year_end = dates[start..]
        .iter()
        .position(|date| date.year() != year)
        .map_or(dates.len(), |offset| start + offset);
    let end = (start + length).min(year_end);
    if end - start < 2 {
        return year_end.saturating_sub(length)..year_end;
    }
    start..end
}
