//! Cleaned observations and the per-day revenue series built from them.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single parsed sales record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub revenue: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, revenue: f64) -> Self {
        Self { date, revenue }
    }
}

/// Total revenue for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Revenue aggregated to one entry per distinct date, strictly ascending.
///
/// Days without sales are absent rather than zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    days: Vec<DailyTotal>,
}

impl DailySeries {
    /// Sums observations sharing a date. Input order does not matter.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut grouped: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for observation in observations {
            grouped
                .entry(observation.date)
                .or_default()
                .push(observation.revenue);
        }
        // summing in sorted order keeps float totals independent of row order
        Self {
            days: grouped
                .into_iter()
                .map(|(date, mut amounts)| {
                    amounts.sort_by(f64::total_cmp);
                    DailyTotal {
                        date,
                        revenue: amounts.iter().sum(),
                    }
                })
                .collect(),
        }
    }

    pub fn days(&self) -> &[DailyTotal] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|day| day.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|day| day.date)
    }

    /// Number of calendar days between the first and last entry, inclusive.
    pub fn span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days() + 1,
            _ => 0,
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.days
            .binary_search_by_key(&date, |day| day.date)
            .ok()
            .map(|idx| self.days[idx].revenue)
    }

    pub fn values(&self) -> Vec<f64> {
        self.days.iter().map(|day| day.revenue).collect()
    }

    pub fn total(&self) -> f64 {
        self.days.iter().map(|day| day.revenue).sum()
    }

    /// Entries dated strictly before January 1st of `year`.
    pub fn before_year(&self, year: i32) -> impl Iterator<Item = &DailyTotal> {
        self.days.iter().filter(move |day| day.date.year() < year)
    }
}

/// Descriptive statistics of a daily series, reported for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub days: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub total: f64,
}
