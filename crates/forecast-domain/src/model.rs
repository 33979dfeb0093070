//! Tunables shared by every forecast engine.

use serde::{Deserialize, Serialize};

use crate::forecast::SeasonalityMode;

/// Extra cyclical component registered on top of the built-in ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSeasonality {
    pub name: String,
    pub period_days: f64,
    pub fourier_order: u32,
}

impl CustomSeasonality {
    pub fn new(name: impl Into<String>, period_days: f64, fourier_order: u32) -> Self {
        Self {
            name: name.into(),
            period_days,
            fourier_order,
        }
    }

    /// The ~30.5 day cycle registered by default.
    pub fn monthly() -> Self {
        Self::new("monthly", 30.5, 5)
    }
}

/// Model configuration surface: seasonality toggles, combination mode and
/// regularisation strengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    pub seasonality_mode: SeasonalityMode,
    /// Trend flexibility; larger values let the slope change more often.
    pub changepoint_prior_scale: f64,
    /// Seasonality strength; larger values allow larger seasonal swings.
    pub seasonality_prior_scale: f64,
    pub n_changepoints: usize,
    /// Share of the history in which trend changepoints may be placed.
    pub changepoint_range: f64,
    /// Coverage of the uncertainty band, e.g. 0.8 for an 80% interval.
    pub interval_width: f64,
    pub custom_seasonalities: Vec<CustomSeasonality>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            seasonality_mode: SeasonalityMode::Multiplicative,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            interval_width: 0.8,
            custom_seasonalities: vec![CustomSeasonality::monthly()],
        }
    }
}

impl EngineSettings {
    /// Checks ranges, returning a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.changepoint_prior_scale.is_finite() && self.changepoint_prior_scale > 0.0) {
            return Err("changepoint_prior_scale must be positive".into());
        }
        if !(self.seasonality_prior_scale.is_finite() && self.seasonality_prior_scale > 0.0) {
            return Err("seasonality_prior_scale must be positive".into());
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err("changepoint_range must be in (0, 1]".into());
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err("interval_width must be in (0, 1)".into());
        }
        for custom in &self.custom_seasonalities {
            if custom.name.trim().is_empty() {
                return Err("custom seasonality needs a name".into());
            }
            if !(custom.period_days.is_finite() && custom.period_days > 0.0) {
                return Err(format!(
                    "seasonality `{}` must have a positive period",
                    custom.name
                ));
            }
            if custom.fourier_order == 0 {
                return Err(format!(
                    "seasonality `{}` must have a fourier order of at least 1",
                    custom.name
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.custom_seasonalities[0].period_days, 30.5);
    }

    #[test]
    fn rejects_degenerate_intervals() {
        let settings = EngineSettings {
            interval_width: 1.0,
            ..EngineSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{ "seasonality_mode": "additive" }"#).unwrap();
        assert_eq!(settings.seasonality_mode, SeasonalityMode::Additive);
        assert!(settings.yearly_seasonality);
        assert_eq!(settings.n_changepoints, 25);
    }
}
