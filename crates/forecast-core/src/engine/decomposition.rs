//! Trend + Fourier seasonality regression.
//!
//! The model is `y(t) = g(t) + s(t)` (additive) or `y(t) = g(t) * (1 + s(t))`
//! (multiplicative), where `g` is a piecewise-linear trend with slope changes
//! at evenly spaced changepoints and `s` is a sum of Fourier series, one per
//! seasonality. Coefficients are fitted by penalised least squares: slope
//! changes are shrunk by `changepoint_prior_scale`, seasonal terms by
//! `seasonality_prior_scale`.

use std::f64::consts::PI;

use chrono::NaiveDate;
use forecast_domain::{
    ComponentSeries, DailySeries, EngineSettings, Forecast, ForecastPoint, SeasonalityMode,
};
use statrs::statistics::Statistics;

use super::{interval_z, linalg::ridge_solve, ForecastEngine};
use crate::{horizon::HorizonPlan, CoreError};

const METHOD_NAME: &str = "Fourier decomposition regression";
const YEARLY_PERIOD: f64 = 365.25;
const YEARLY_ORDER: u32 = 10;
const WEEKLY_PERIOD: f64 = 7.0;
const WEEKLY_ORDER: u32 = 3;
const DAILY_PERIOD: f64 = 1.0;
const DAILY_ORDER: u32 = 4;
/// Penalty on the base level and slope; keeps the system solvable.
const BASE_RIDGE: f64 = 1e-8;
/// Lower bound on the noise proxy scaling the priors.
const NOISE_FLOOR: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
struct SeasonalTerm {
    name: String,
    period: f64,
    order: u32,
}

/// Regression engine with changepoint trend and Fourier seasonalities.
#[derive(Debug, Clone)]
pub struct DecompositionEngine {
    settings: EngineSettings,
}

impl DecompositionEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, CoreError> {
        settings.validate().map_err(CoreError::Validation)?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn seasonal_terms(&self) -> Vec<SeasonalTerm> {
        let mut terms = Vec::new();
        let builtin = [
            (self.settings.yearly_seasonality, "yearly", YEARLY_PERIOD, YEARLY_ORDER),
            (self.settings.weekly_seasonality, "weekly", WEEKLY_PERIOD, WEEKLY_ORDER),
            (self.settings.daily_seasonality, "daily", DAILY_PERIOD, DAILY_ORDER),
        ];
        for (enabled, name, period, order) in builtin {
            if enabled {
                terms.push(SeasonalTerm {
                    name: name.into(),
                    period,
                    order,
                });
            }
        }
        for custom in &self.settings.custom_seasonalities {
            terms.retain(|term| term.name != custom.name);
            terms.push(SeasonalTerm {
                name: custom.name.clone(),
                period: custom.period_days,
                order: custom.fourier_order,
            });
        }
        terms
    }

    fn fit(&self, history: &DailySeries) -> Result<FittedModel, CoreError> {
        let days = history.days();
        let (Some(first), Some(last)) = (history.first_date(), history.last_date()) else {
            return Err(CoreError::InsufficientHistory {
                distinct_days: 0,
                required: 2,
            });
        };
        if days.len() < 2 {
            return Err(CoreError::InsufficientHistory {
                distinct_days: days.len(),
                required: 2,
            });
        }

        let span = ((last - first).num_days() as f64).max(1.0);
        let mut design = Design {
            origin: first,
            span,
            changepoints: Vec::new(),
            terms: self.seasonal_terms(),
        };
        design.changepoints = place_changepoints(
            &days.iter().map(|day| design.time(day.date)).collect::<Vec<_>>(),
            self.settings.n_changepoints,
            self.settings.changepoint_range,
        );

        let y_scale = days
            .iter()
            .map(|day| day.revenue.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let scaled: Vec<f64> = days.iter().map(|day| day.revenue / y_scale).collect();
        let noise = population_variance(&scaled).max(NOISE_FLOOR);

        let trend_rows: Vec<Vec<f64>> = days
            .iter()
            .map(|day| design.trend_row(design.time(day.date)))
            .collect();
        let seasonal_rows: Vec<Vec<f64>> = days
            .iter()
            .map(|day| design.seasonal_row(day.date))
            .collect();

        let mut penalties = vec![BASE_RIDGE, BASE_RIDGE];
        penalties.extend(
            std::iter::repeat(noise / self.settings.changepoint_prior_scale.powi(2))
                .take(design.changepoints.len()),
        );
        penalties.extend(
            std::iter::repeat(noise / self.settings.seasonality_prior_scale.powi(2))
                .take(design.seasonal_width()),
        );
        let trend_width = design.trend_width();

        tracing::debug!(
            observations = days.len(),
            changepoints = design.changepoints.len(),
            seasonal_columns = design.seasonal_width(),
            mode = %self.settings.seasonality_mode,
            "fitting decomposition model"
        );

        let joined: Vec<Vec<f64>> = trend_rows
            .iter()
            .zip(&seasonal_rows)
            .map(|(trend, seasonal)| trend.iter().chain(seasonal).copied().collect())
            .collect();
        let mut coefficients = ridge_solve(&joined, &scaled, &penalties)?;

        if self.settings.seasonality_mode == SeasonalityMode::Multiplicative {
            // Seasonal columns are scaled by the additive trend estimate so the
            // second solve fits s(t) as a fraction of g(t).
            let (trend_coef, _) = coefficients.split_at(trend_width);
            let scaled_rows: Vec<Vec<f64>> = trend_rows
                .iter()
                .zip(&seasonal_rows)
                .map(|(trend, seasonal)| {
                    let level = dot(trend, trend_coef);
                    trend
                        .iter()
                        .copied()
                        .chain(seasonal.iter().map(|feature| feature * level))
                        .collect()
                })
                .collect();
            coefficients = ridge_solve(&scaled_rows, &scaled, &penalties)?;
        }

        let seasonal_coef = coefficients.split_off(trend_width);
        let mut model = FittedModel {
            design,
            mode: self.settings.seasonality_mode,
            y_scale,
            trend_coef: coefficients,
            seasonal_coef,
            sigma: 0.0,
            drift: 0.0,
            changepoint_rate: 0.0,
        };

        let squared: f64 = days
            .iter()
            .map(|day| (day.revenue - model.evaluate(day.date).fitted).powi(2))
            .sum();
        model.sigma = (squared / (days.len() as f64 - 1.0).max(1.0)).sqrt();

        let deltas = &model.trend_coef[2..];
        if !deltas.is_empty() {
            model.drift = deltas.iter().map(|delta| delta.abs()).sum::<f64>() / deltas.len() as f64;
            model.changepoint_rate = deltas.len() as f64 / self.settings.changepoint_range;
        }

        tracing::info!(
            sigma = model.sigma,
            slope_drift = model.drift,
            "decomposition model fitted"
        );
        Ok(model)
    }
}

impl ForecastEngine for DecompositionEngine {
    fn name(&self) -> &str {
        METHOD_NAME
    }

    fn forecast(
        &self,
        history: &DailySeries,
        horizon: &HorizonPlan,
    ) -> Result<Forecast, CoreError> {
        let model = self.fit(history)?;
        let z = interval_z(self.settings.interval_width)?;

        let dates: Vec<NaiveDate> = history
            .days()
            .iter()
            .map(|day| day.date)
            .chain(horizon.future_dates())
            .collect();

        let mut points = Vec::with_capacity(dates.len());
        let mut trend = Vec::with_capacity(dates.len());
        let mut seasonal: Vec<Vec<f64>> =
            vec![Vec::with_capacity(dates.len()); model.design.terms.len()];

        for &date in &dates {
            let evaluation = model.evaluate(date);
            let spread = z * model.std_error(date, evaluation.seasonal_total);
            points.push(ForecastPoint::new(
                date,
                evaluation.fitted,
                evaluation.fitted - spread,
                evaluation.fitted + spread,
            ));
            trend.push(evaluation.trend);
            for (values, part) in seasonal.iter_mut().zip(evaluation.parts) {
                values.push(part);
            }
        }

        let mut components = vec![ComponentSeries {
            name: "trend".into(),
            period_days: None,
            mode: SeasonalityMode::Additive,
            values: trend,
        }];
        components.extend(model.design.terms.iter().zip(seasonal).map(|(term, values)| {
            ComponentSeries {
                name: term.name.clone(),
                period_days: Some(term.period),
                mode: model.mode,
                values,
            }
        }));

        Ok(Forecast {
            method: METHOD_NAME.into(),
            interval_width: self.settings.interval_width,
            history_end: horizon.last_history,
            points,
            components,
        })
    }
}

#[derive(Debug, Clone)]
struct Design {
    origin: NaiveDate,
    span: f64,
    changepoints: Vec<f64>,
    terms: Vec<SeasonalTerm>,
}

impl Design {
    /// History mapped onto [0, 1].
    fn time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.span
    }

    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn seasonal_width(&self) -> usize {
        self.terms.iter().map(|term| 2 * term.order as usize).sum()
    }

    fn trend_row(&self, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.trend_width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));
        row
    }

    /// Fourier features anchored on the Unix epoch so phases follow the calendar.
    fn seasonal_row(&self, date: NaiveDate) -> Vec<f64> {
        let day = date.signed_duration_since(NaiveDate::default()).num_days() as f64;
        let mut row = Vec::with_capacity(self.seasonal_width());
        for term in &self.terms {
            for k in 1..=term.order {
                let angle = 2.0 * PI * f64::from(k) * day / term.period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }
}

struct Evaluation {
    fitted: f64,
    trend: f64,
    parts: Vec<f64>,
    seasonal_total: f64,
}

#[derive(Debug, Clone)]
struct FittedModel {
    design: Design,
    mode: SeasonalityMode,
    y_scale: f64,
    trend_coef: Vec<f64>,
    seasonal_coef: Vec<f64>,
    sigma: f64,
    /// Mean absolute slope change at a changepoint, in scaled units.
    drift: f64,
    /// Changepoints per unit of scaled time.
    changepoint_rate: f64,
}

impl FittedModel {
    fn evaluate(&self, date: NaiveDate) -> Evaluation {
        let t = self.design.time(date);
        let trend_scaled = dot(&self.design.trend_row(t), &self.trend_coef);
        let features = self.design.seasonal_row(date);

        let mut parts = Vec::with_capacity(self.design.terms.len());
        let mut offset = 0;
        for term in &self.design.terms {
            let width = 2 * term.order as usize;
            let value = dot(
                &features[offset..offset + width],
                &self.seasonal_coef[offset..offset + width],
            );
            parts.push(value);
            offset += width;
        }
        let seasonal_total: f64 = parts.iter().sum();
        let trend = trend_scaled * self.y_scale;

        match self.mode {
            SeasonalityMode::Additive => {
                for part in parts.iter_mut() {
                    *part *= self.y_scale;
                }
                Evaluation {
                    fitted: trend + seasonal_total * self.y_scale,
                    trend,
                    parts,
                    seasonal_total,
                }
            }
            SeasonalityMode::Multiplicative => Evaluation {
                fitted: trend * (1.0 + seasonal_total),
                trend,
                parts,
                seasonal_total,
            },
        }
    }

    /// Residual noise plus trend drift that grows past the end of history.
    fn std_error(&self, date: NaiveDate, seasonal_total: f64) -> f64 {
        let ahead = self.design.time(date) - 1.0;
        let mut drift = 0.0;
        if ahead > 0.0 && self.changepoint_rate > 0.0 {
            drift = self.drift * self.y_scale * ahead * (self.changepoint_rate * ahead).sqrt();
            if self.mode == SeasonalityMode::Multiplicative {
                drift *= (1.0 + seasonal_total).abs();
            }
        }
        (self.sigma.powi(2) + drift.powi(2)).sqrt()
    }
}

/// Evenly spaced changepoints over the first `range` share of the history.
fn place_changepoints(times: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let window = ((times.len() as f64) * range).floor() as usize;
    let count = requested.min(window.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    let last_index = (window - 1) as f64;
    (1..=count)
        .map(|i| {
            let idx = (i as f64 * last_index / count as f64).round() as usize;
            times[idx]
        })
        .collect()
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.population_variance()
}

fn dot(lhs: &[f64], rhs: &[f64]) -> f64 {
    lhs.iter().zip(rhs).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use forecast_domain::Observation;

    use super::*;
    use crate::horizon::plan_horizon;

    fn daily(start: NaiveDate, days: i64, value: impl Fn(i64) -> f64) -> DailySeries {
        DailySeries::from_observations(
            (0..days).map(|i| Observation::new(start + Duration::days(i), value(i))),
        )
    }

    #[test]
    fn changepoints_stay_inside_range() {
        let times: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let cps = place_changepoints(&times, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8));
        assert!(cps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn noise_variance_is_the_population_variance() {
        assert!((population_variance(&[1.0, 2.0, 3.0, 4.0]) - 1.25).abs() < 1e-12);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn tiny_history_has_no_changepoints() {
        assert!(place_changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
    }

    #[test]
    fn custom_seasonality_replaces_builtin_with_same_name() {
        let mut settings = EngineSettings::default();
        settings
            .custom_seasonalities
            .push(forecast_domain::CustomSeasonality::new("weekly", 7.0, 6));
        let engine = DecompositionEngine::new(settings).unwrap();
        let weekly: Vec<_> = engine
            .seasonal_terms()
            .into_iter()
            .filter(|term| term.name == "weekly")
            .collect();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].order, 6);
    }

    #[test]
    fn additive_fit_tracks_weekly_pattern() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let history = daily(start, 280, |i| 100.0 + if i % 7 == 5 { 50.0 } else { 0.0 });
        let settings = EngineSettings {
            yearly_seasonality: false,
            seasonality_mode: SeasonalityMode::Additive,
            custom_seasonalities: Vec::new(),
            ..EngineSettings::default()
        };
        let engine = DecompositionEngine::new(settings).unwrap();
        let plan = plan_horizon(history.last_date().unwrap(), 2024, 28).unwrap();
        let forecast = engine.forecast(&history, &plan).unwrap();

        let future: Vec<_> = forecast.future_points().collect();
        assert_eq!(future.len(), plan.days as usize);
        let peak = future
            .iter()
            .find(|p| (p.date - start).num_days() % 7 == 5)
            .unwrap();
        let quiet = future
            .iter()
            .find(|p| (p.date - start).num_days() % 7 == 1)
            .unwrap();
        assert!(peak.point > quiet.point + 30.0);
        assert!(forecast.component("weekly").is_some());
        assert!(forecast.component("trend").unwrap().is_trend());
    }

    #[test]
    fn bands_contain_the_point_and_widen_ahead() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let history = daily(start, 500, |i| 200.0 + (i as f64) * 0.5 + ((i * 37) % 11) as f64);
        let engine = DecompositionEngine::new(EngineSettings::default()).unwrap();
        let plan = plan_horizon(history.last_date().unwrap(), 2025, 365).unwrap();
        let forecast = engine.forecast(&history, &plan).unwrap();

        assert!(forecast
            .points
            .iter()
            .all(|p| p.lower <= p.point && p.point <= p.upper));
        let future: Vec<_> = forecast.future_points().collect();
        let first = future.first().unwrap();
        let last = future.last().unwrap();
        assert!(last.upper - last.lower >= first.upper - first.lower);
    }
}
