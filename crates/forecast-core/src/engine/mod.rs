//! Forecast strategies.
//!
//! Any type implementing [`ForecastEngine`] can drive the pipeline: given the
//! daily history and a horizon it returns one [`ForecastPoint`] per historical
//! date plus one per future day, with a two-sided uncertainty band.
//!
//! [`ForecastPoint`]: forecast_domain::ForecastPoint

mod baseline;
mod decomposition;
mod linalg;

pub use baseline::WeekdayProfileEngine;
pub use decomposition::DecompositionEngine;

use forecast_domain::{DailySeries, Forecast};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{horizon::HorizonPlan, CoreError};

pub trait ForecastEngine {
    /// Human readable method name, recorded in the report summary.
    fn name(&self) -> &str;

    /// Fits on `history` and predicts through `horizon.end`.
    fn forecast(&self, history: &DailySeries, horizon: &HorizonPlan)
        -> Result<Forecast, CoreError>;
}

/// Two-sided standard normal quantile for an interval of the given coverage.
pub fn interval_z(width: f64) -> Result<f64, CoreError> {
    if !(width > 0.0 && width < 1.0) {
        return Err(CoreError::Validation(format!(
            "interval width {} must be in (0, 1)",
            width
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|err| CoreError::Engine(err.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}
