//! Type coercion, row filtering and per-day aggregation.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use forecast_domain::{CellValue, DailySeries, Observation, RawRecord, SeriesStats};
use statrs::statistics::{Data, Distribution, Max, Median, Min};

use crate::CoreError;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];
/// Largest serial Excel accepts (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Outcome of cleaning a batch of raw records.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedData {
    pub series: DailySeries,
    pub stats: SeriesStats,
    pub records_read: usize,
    pub bad_dates: usize,
    pub bad_revenues: usize,
}

impl CleanedData {
    pub fn dropped(&self) -> usize {
        self.bad_dates + self.bad_revenues
    }
}

/// Parses, filters and aggregates raw records into a [`DailySeries`].
///
/// Rows whose date or revenue cannot be parsed are discarded. Fails with
/// [`CoreError::DataQuality`] when nothing usable remains.
pub fn clean_records(records: &[RawRecord]) -> Result<CleanedData, CoreError> {
    let mut bad_dates = 0;
    let mut bad_revenues = 0;
    let mut observations = Vec::with_capacity(records.len());

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            bad_dates += 1;
            tracing::trace!(row = record.row, cell = %record.date, "unparseable date");
            continue;
        };
        let Some(revenue) = parse_revenue(&record.revenue) else {
            bad_revenues += 1;
            tracing::trace!(row = record.row, cell = %record.revenue, "unparseable revenue");
            continue;
        };
        observations.push(Observation::new(date, revenue));
    }

    if observations.is_empty() {
        return Err(CoreError::DataQuality(format!(
            "none of the {} row(s) had a parseable date and revenue",
            records.len()
        )));
    }
    if bad_dates + bad_revenues > 0 {
        tracing::warn!(bad_dates, bad_revenues, "discarded rows during cleaning");
    }

    let series = DailySeries::from_observations(observations);
    let stats = describe(&series)?;
    tracing::info!(
        days = stats.days,
        first = %stats.first_date,
        last = %stats.last_date,
        min = stats.min,
        max = stats.max,
        mean = stats.mean,
        median = stats.median,
        std_dev = stats.std_dev,
        total = stats.total,
        "daily series ready"
    );

    Ok(CleanedData {
        series,
        stats,
        records_read: records.len(),
        bad_dates,
        bad_revenues,
    })
}

/// Summary statistics of the daily totals. Standard deviation is the sample
/// deviation and reads 0 for a single day.
pub fn describe(series: &DailySeries) -> Result<SeriesStats, CoreError> {
    let (Some(first_date), Some(last_date)) = (series.first_date(), series.last_date()) else {
        return Err(CoreError::DataQuality("daily series is empty".into()));
    };
    let data = Data::new(series.values());
    let std_dev = data.std_dev().filter(|value| value.is_finite()).unwrap_or(0.0);

    Ok(SeriesStats {
        days: series.len(),
        first_date,
        last_date,
        min: data.min(),
        max: data.max(),
        mean: data.mean().unwrap_or(0.0),
        median: data.median(),
        std_dev,
        total: series.total(),
    })
}

/// Coerces a cell to a calendar date, dropping any time of day.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(date) => Some(*date),
        CellValue::DateTime(stamp) => Some(stamp.date()),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text.trim()),
        CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|stamp| stamp.date())
        })
}

/// Converts an Excel 1900-system serial (fractional part = time of day).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Coerces a cell to a finite revenue amount.
pub fn parse_revenue(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(value) => *value,
        CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_date_shapes() {
        assert_eq!(parse_date(&CellValue::text("2025-02-03")), Some(date(2025, 2, 3)));
        assert_eq!(parse_date(&CellValue::text("03/02/2025")), Some(date(2025, 2, 3)));
        assert_eq!(
            parse_date(&CellValue::text("2025-02-03 18:45:00")),
            Some(date(2025, 2, 3))
        );
        assert_eq!(parse_date(&CellValue::Number(45_658.75)), Some(date(2025, 1, 1)));
        assert_eq!(parse_date(&CellValue::text("not a date")), None);
        assert_eq!(parse_date(&CellValue::Bool(true)), None);
        assert_eq!(parse_date(&CellValue::Number(-3.0)), None);
    }

    #[test]
    fn parses_revenue_numbers_and_text() {
        assert_eq!(parse_revenue(&CellValue::Number(12.5)), Some(12.5));
        assert_eq!(parse_revenue(&CellValue::text(" 7.25 ")), Some(7.25));
        assert_eq!(parse_revenue(&CellValue::text("-4")), Some(-4.0));
        assert_eq!(parse_revenue(&CellValue::text("n/a")), None);
        assert_eq!(parse_revenue(&CellValue::Number(f64::NAN)), None);
        assert_eq!(parse_revenue(&CellValue::Empty), None);
        assert_eq!(parse_revenue(&CellValue::Error("VALUE!".into())), None);
    }

    #[test]
    fn single_day_has_zero_spread() {
        let series = DailySeries::from_observations(vec![Observation::new(date(2025, 1, 1), 5.0)]);
        let stats = describe(&series).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.median, 5.0);
    }
}
