use chrono::{Duration, NaiveDate};

use crate::CoreError;

/// How far past the last observed day the engine is asked to forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonPlan {
    pub last_history: NaiveDate,
    pub days: u32,
    pub end: NaiveDate,
    /// True when history already reached the target year end.
    pub used_fallback: bool,
}

impl HorizonPlan {
    /// Future dates in ascending order, starting the day after history ends.
    pub fn future_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.last_history;
        (1..=i64::from(self.days)).map(move |offset| start + Duration::days(offset))
    }
}

/// Horizon reaching December 31st of `target_year`, or `fallback_days` when
/// the history already ends on or after that date.
pub fn plan_horizon(
    last_history: NaiveDate,
    target_year: i32,
    fallback_days: u32,
) -> Result<HorizonPlan, CoreError> {
    let year_end = NaiveDate::from_ymd_opt(target_year, 12, 31)
        .ok_or_else(|| CoreError::Validation(format!("invalid target year {}", target_year)))?;
    let remaining = (year_end - last_history).num_days();

    let (days, used_fallback) = if remaining <= 0 {
        (fallback_days, true)
    } else {
        let days = u32::try_from(remaining).map_err(|_| {
            CoreError::Validation(format!(
                "horizon of {} days to {} is too long",
                remaining, year_end
            ))
        })?;
        (days, false)
    };
    if days == 0 {
        return Err(CoreError::Validation("forecast horizon must be at least one day".into()));
    }

    Ok(HorizonPlan {
        last_history,
        days,
        end: last_history + Duration::days(i64::from(days)),
        used_fallback,
    })
}
