use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
};

use chrono::{Datelike, Duration, NaiveDate};
use forecast_domain::{
    CellValue, CurrencyCode, DailySeries, EngineSettings, Forecast, MonthLanguage, NumberFormat,
    Observation, RawRecord,
};

use crate::{
    clean_records, project_year, ChartInputs, ChartKind, ChartSink, ColumnSpec, CoreError,
    DecompositionEngine, FixedClock, ForecastEngine, ForecastPipeline, ForecastReport,
    HorizonPlan, PipelineSettings, plan_horizon, RecordSource, ReportSink, WeekdayProfileEngine,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(row: usize, date: CellValue, revenue: CellValue) -> RawRecord {
    RawRecord::new(row, date, revenue)
}

fn daily_records(start: NaiveDate, days: i64, value: f64) -> Vec<RawRecord> {
    (0..days)
        .map(|i| {
            record(
                i as usize + 2,
                CellValue::Date(start + Duration::days(i)),
                CellValue::Number(value),
            )
        })
        .collect()
}

fn settings(year: i32) -> PipelineSettings {
    PipelineSettings {
        input_path: PathBuf::from("sales.xlsx"),
        sheet: "Sales".into(),
        columns: ColumnSpec::new("Date", "Revenue"),
        target_year: year,
        horizon_fallback_days: 365,
        min_history_days: 2,
        month_language: MonthLanguage::English,
        currency: CurrencyCode::new("EUR"),
        number_format: NumberFormat::default(),
    }
}

fn clock() -> FixedClock {
    FixedClock(date(2025, 11, 3).and_hms_opt(9, 30, 0).unwrap())
}

struct StubSource {
    records: Result<Vec<RawRecord>, fn(&Path) -> CoreError>,
}

impl StubSource {
    fn with(records: Vec<RawRecord>) -> Self {
        Self {
            records: Ok(records),
        }
    }
}

impl RecordSource for StubSource {
    fn read_records(
        &self,
        path: &Path,
        _sheet: &str,
        _columns: &ColumnSpec,
    ) -> Result<Vec<RawRecord>, CoreError> {
        match &self.records {
            Ok(records) => Ok(records.clone()),
            Err(make) => Err(make(path)),
        }
    }
}

#[derive(Default)]
struct MemorySink {
    written: RefCell<Option<ForecastReport>>,
    fail: bool,
}

impl ReportSink for MemorySink {
    fn write_report(&self, report: &ForecastReport) -> Result<PathBuf, CoreError> {
        if self.fail {
            return Err(CoreError::Export("disk full".into()));
        }
        *self.written.borrow_mut() = Some(report.clone());
        Ok(PathBuf::from("memory.xlsx"))
    }
}

#[derive(Default)]
struct FlakyCharts {
    calls: Cell<usize>,
}

impl ChartSink for FlakyCharts {
    fn render(&self, kind: ChartKind, _inputs: &ChartInputs<'_>) -> Result<PathBuf, CoreError> {
        self.calls.set(self.calls.get() + 1);
        if kind == ChartKind::Components {
            return Err(CoreError::Validation("no font".into()));
        }
        Ok(PathBuf::from(format!("{:?}.png", kind)))
    }
}

/// Wraps an engine and counts how often it is asked to forecast.
struct CountingEngine<E> {
    inner: E,
    calls: Cell<usize>,
}

impl<E: ForecastEngine> ForecastEngine for CountingEngine<E> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn forecast(
        &self,
        history: &DailySeries,
        horizon: &HorizonPlan,
    ) -> Result<Forecast, CoreError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.forecast(history, horizon)
    }
}

fn counting_baseline() -> CountingEngine<WeekdayProfileEngine> {
    CountingEngine {
        inner: WeekdayProfileEngine::default(),
        calls: Cell::new(0),
    }
}

#[test]
fn unparseable_rows_never_contribute() {
    let records = vec![
        record(2, CellValue::text("2025-01-01"), CellValue::Number(10.0)),
        record(3, CellValue::text("garbage"), CellValue::Number(1_000.0)),
        record(4, CellValue::text("2025-01-01"), CellValue::text("n/a")),
        record(5, CellValue::Empty, CellValue::Empty),
        record(6, CellValue::text("2025-01-02"), CellValue::text("5.5")),
    ];

    let cleaned = clean_records(&records).unwrap();
    assert_eq!(cleaned.series.len(), 2);
    assert_eq!(cleaned.series.get(date(2025, 1, 1)), Some(10.0));
    assert_eq!(cleaned.series.total(), 15.5);
    assert_eq!(cleaned.bad_dates, 2);
    assert_eq!(cleaned.bad_revenues, 1);
    assert_eq!(cleaned.dropped(), 3);
}

#[test]
fn cleaning_ignores_row_order() {
    let mut records = vec![
        record(2, CellValue::Date(date(2025, 3, 1)), CellValue::Number(1.25)),
        record(3, CellValue::Date(date(2025, 1, 1)), CellValue::Number(2.5)),
        record(4, CellValue::text("bad"), CellValue::Number(9.0)),
        record(5, CellValue::Date(date(2025, 3, 1)), CellValue::Number(4.0)),
        record(6, CellValue::Date(date(2025, 2, 1)), CellValue::Number(8.0)),
        record(7, CellValue::Date(date(2025, 4, 1)), CellValue::Number(0.1)),
        record(8, CellValue::Date(date(2025, 4, 1)), CellValue::text("0.2")),
        record(9, CellValue::Date(date(2025, 4, 1)), CellValue::Number(0.3)),
    ];
    let forward = clean_records(&records).unwrap();
    records.reverse();
    let backward = clean_records(&records).unwrap();

    assert_eq!(forward.series, backward.series);
    assert_eq!(forward.stats, backward.stats);
}

#[test]
fn rows_on_the_same_date_are_summed() {
    let records = vec![
        record(2, CellValue::Date(date(2025, 6, 1)), CellValue::Number(10.0)),
        record(3, CellValue::Date(date(2025, 6, 1)), CellValue::Number(20.0)),
    ];
    let cleaned = clean_records(&records).unwrap();
    assert_eq!(cleaned.series.len(), 1);
    assert_eq!(cleaned.series.get(date(2025, 6, 1)), Some(30.0));
}

#[test]
fn zero_parseable_rows_fail_before_forecasting() {
    let source = StubSource::with(vec![
        record(2, CellValue::text("nope"), CellValue::Number(1.0)),
        record(3, CellValue::text("2025-01-01"), CellValue::Bool(true)),
    ]);
    let engine = counting_baseline();
    let sink = MemorySink::default();
    let clock = clock();

    let result = ForecastPipeline::new(&source, &engine, &sink, &clock).run(&settings(2026));

    assert!(matches!(result, Err(CoreError::DataQuality(_))));
    assert_eq!(engine.calls.get(), 0);
    assert!(sink.written.borrow().is_none());
}

#[test]
fn source_errors_abort_the_run() {
    let source = StubSource {
        records: Err(|path| CoreError::SourceNotFound(path.to_path_buf())),
    };
    let engine = counting_baseline();
    let sink = MemorySink::default();
    let clock = clock();

    let result = ForecastPipeline::new(&source, &engine, &sink, &clock).run(&settings(2026));

    assert!(matches!(
        result,
        Err(CoreError::SourceNotFound(path)) if path == Path::new("sales.xlsx")
    ));
    assert_eq!(engine.calls.get(), 0);
}

#[test]
fn single_day_history_is_insufficient() {
    let source = StubSource::with(daily_records(date(2025, 5, 1), 1, 50.0));
    let engine = counting_baseline();
    let sink = MemorySink::default();
    let clock = clock();

    let result = ForecastPipeline::new(&source, &engine, &sink, &clock).run(&settings(2026));

    assert!(matches!(
        result,
        Err(CoreError::InsufficientHistory {
            distinct_days: 1,
            required: 2
        })
    ));
    assert_eq!(engine.calls.get(), 0);
}

#[test]
fn configured_minimum_history_is_enforced() {
    let source = StubSource::with(daily_records(date(2025, 5, 1), 10, 50.0));
    let engine = counting_baseline();
    let sink = MemorySink::default();
    let clock = clock();
    let mut settings = settings(2026);
    settings.min_history_days = 30;

    let result = ForecastPipeline::new(&source, &engine, &sink, &clock).run(&settings);
    assert!(matches!(
        result,
        Err(CoreError::InsufficientHistory { required: 30, .. })
    ));
}

#[test]
fn monthly_totals_match_daily_sums() {
    let start = date(2024, 1, 1);
    let records: Vec<RawRecord> = (0..700)
        .map(|i| {
            let day = start + Duration::days(i);
            let value = 100.0 + (day.weekday().num_days_from_monday() as f64) * 15.0;
            record(i as usize + 2, CellValue::Date(day), CellValue::Number(value))
        })
        .collect();
    let source = StubSource::with(records);
    let engine = DecompositionEngine::new(EngineSettings::default()).unwrap();
    let sink = MemorySink::default();
    let clock = clock();

    let run = ForecastPipeline::new(&source, &engine, &sink, &clock)
        .run(&settings(2026))
        .unwrap();

    let daily: Vec<_> = run.forecast.points_in_year(2026).collect();
    assert_eq!(daily.len(), 365);
    assert_eq!(run.projection.months.len(), 12);

    let close = |a: f64, b: f64| (a - b).abs() <= 1e-6 * b.abs().max(1.0);
    let daily_point: f64 = daily.iter().map(|p| p.point).sum();
    let daily_lower: f64 = daily.iter().map(|p| p.lower).sum();
    let daily_upper: f64 = daily.iter().map(|p| p.upper).sum();
    let month_point: f64 = run.projection.months.iter().map(|m| m.point).sum();
    let month_lower: f64 = run.projection.months.iter().map(|m| m.lower).sum();
    let month_upper: f64 = run.projection.months.iter().map(|m| m.upper).sum();
    assert!(close(month_point, daily_point));
    assert!(close(month_lower, daily_lower));
    assert!(close(month_upper, daily_upper));
    assert!(close(run.projection.total_point, daily_point));

    let march = run.projection.month(3).unwrap();
    let march_sum: f64 = daily
        .iter()
        .filter(|p| p.date.month() == 3)
        .map(|p| p.point)
        .sum();
    assert!(close(march.point, march_sum));
    assert_eq!(march.days, 31);
    assert_eq!(march.label, "March");

    let written = sink.written.borrow();
    let report = written.as_ref().unwrap();
    assert_eq!(report.daily.len(), 365);
    assert!(report.daily.iter().all(|p| p.date.year() == 2026));
    assert_eq!(report.summary.last().unwrap().value, engine.name());
    assert_eq!(report.summary[4].value, "2025-11-03 09:30");
}

#[test]
fn constant_history_forecasts_near_constant() {
    let source = StubSource::with(daily_records(date(2024, 9, 1), 400, 100.0));
    let engine = DecompositionEngine::new(EngineSettings::default()).unwrap();
    let sink = MemorySink::default();
    let clock = clock();

    let run = ForecastPipeline::new(&source, &engine, &sink, &clock)
        .run(&settings(2026))
        .unwrap();

    assert!(run.horizon.end == date(2026, 12, 31));
    for point in run.forecast.future_points() {
        assert!(
            (point.point - 100.0).abs() < 1.0,
            "{} forecast {}",
            point.date,
            point.point
        );
    }
}

#[test]
fn projection_uses_configured_month_language() {
    let start = date(2025, 1, 1);
    let history = DailySeries::from_observations(
        (0..60).map(|i| Observation::new(start + Duration::days(i), 10.0)),
    );
    let plan = plan_horizon(date(2025, 3, 1), 2025, 365).unwrap();
    let forecast = WeekdayProfileEngine::default()
        .forecast(&history, &plan)
        .unwrap();

    let projection = project_year(&forecast, 2025, MonthLanguage::Italian);
    assert_eq!(projection.months[0].label, "Gennaio");
    assert_eq!(projection.months.len(), 12);
    assert_eq!(projection.days, 365);
}

#[test]
fn chart_failures_are_isolated() {
    let source = StubSource::with(daily_records(date(2025, 1, 1), 90, 10.0));
    let engine = WeekdayProfileEngine::default();
    let sink = MemorySink::default();
    let charts = FlakyCharts::default();
    let clock = clock();

    let run = ForecastPipeline::new(&source, &engine, &sink, &clock)
        .with_charts(&charts)
        .run(&settings(2025))
        .unwrap();

    assert_eq!(charts.calls.get(), 4);
    assert_eq!(run.charts.len(), 4);
    let failed: Vec<_> = run.failed_charts().map(|outcome| outcome.kind).collect();
    assert_eq!(failed, vec![ChartKind::Components]);
}

#[test]
fn export_failure_is_fatal_and_skips_charts() {
    let source = StubSource::with(daily_records(date(2025, 1, 1), 90, 10.0));
    let engine = WeekdayProfileEngine::default();
    let sink = MemorySink {
        fail: true,
        ..MemorySink::default()
    };
    let charts = FlakyCharts::default();
    let clock = clock();

    let result = ForecastPipeline::new(&source, &engine, &sink, &clock)
        .with_charts(&charts)
        .run(&settings(2025));

    assert!(matches!(result, Err(CoreError::Export(_))));
    assert_eq!(charts.calls.get(), 0);
}
