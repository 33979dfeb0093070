use chrono::{Datelike, NaiveDate};
use forecast_domain::{ComponentSeries, DailySeries, Forecast, ForecastPoint, SeasonalityMode};
use statrs::statistics::Statistics;

use super::{interval_z, ForecastEngine};
use crate::{horizon::HorizonPlan, CoreError};

const METHOD_NAME: &str = "Weekday profile baseline";

/// Deterministic baseline: every date is forecast as the historical mean of
/// its weekday, banded by that weekday's spread.
#[derive(Debug, Clone)]
pub struct WeekdayProfileEngine {
    interval_width: f64,
}

impl WeekdayProfileEngine {
    pub fn new(interval_width: f64) -> Result<Self, CoreError> {
        interval_z(interval_width)?;
        Ok(Self { interval_width })
    }
}

impl Default for WeekdayProfileEngine {
    fn default() -> Self {
        Self {
            interval_width: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: usize,
    mean: f64,
    std_dev: f64,
}

fn moments(values: &[f64]) -> Moments {
    if values.is_empty() {
        return Moments::default();
    }
    let std_dev = if values.len() > 1 {
        values.std_dev()
    } else {
        0.0
    };
    Moments {
        count: values.len(),
        mean: values.mean(),
        std_dev,
    }
}

impl ForecastEngine for WeekdayProfileEngine {
    fn name(&self) -> &str {
        METHOD_NAME
    }

    fn forecast(
        &self,
        history: &DailySeries,
        horizon: &HorizonPlan,
    ) -> Result<Forecast, CoreError> {
        if history.len() < 2 {
            return Err(CoreError::InsufficientHistory {
                distinct_days: history.len(),
                required: 2,
            });
        }
        let z = interval_z(self.interval_width)?;

        let overall = moments(&history.values());
        let mut buckets: [Vec<f64>; 7] = Default::default();
        for day in history.days() {
            buckets[day.date.weekday().num_days_from_monday() as usize].push(day.revenue);
        }
        let profile: Vec<Moments> = buckets
            .iter()
            .map(|values| match moments(values) {
                m if m.count == 0 => overall,
                m => m,
            })
            .collect();

        let dates: Vec<NaiveDate> = history
            .days()
            .iter()
            .map(|day| day.date)
            .chain(horizon.future_dates())
            .collect();

        let mut points = Vec::with_capacity(dates.len());
        let mut weekly = Vec::with_capacity(dates.len());
        for date in &dates {
            let m = profile[date.weekday().num_days_from_monday() as usize];
            let spread = z * m.std_dev;
            points.push(ForecastPoint::new(*date, m.mean, m.mean - spread, m.mean + spread));
            weekly.push(m.mean - overall.mean);
        }

        let components = vec![
            ComponentSeries {
                name: "trend".into(),
                period_days: None,
                mode: SeasonalityMode::Additive,
                values: vec![overall.mean; dates.len()],
            },
            ComponentSeries {
                name: "weekly".into(),
                period_days: Some(7.0),
                mode: SeasonalityMode::Additive,
                values: weekly,
            },
        ];

        Ok(Forecast {
            method: METHOD_NAME.into(),
            interval_width: self.interval_width,
            history_end: horizon.last_history,
            points,
            components,
        })
    }
}
