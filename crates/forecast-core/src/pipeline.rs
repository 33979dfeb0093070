//! Single linear pass: load → clean → forecast → aggregate → export → chart.

use std::path::PathBuf;

use forecast_domain::{
    CurrencyCode, DailySeries, Forecast, MonthLanguage, NumberFormat, SeriesStats, YearProjection,
};

use crate::{
    aggregate::project_year,
    cleaning::clean_records,
    engine::ForecastEngine,
    horizon::{plan_horizon, HorizonPlan},
    sinks::{ChartInputs, ChartKind, ChartOutcome, ChartSink, ForecastReport, ReportSink},
    source::{ColumnSpec, RecordSource},
    summary::summary_rows,
    time::Clock,
    CoreError,
};

/// History shorter than this still fits but yearly terms are poorly identified.
pub const RECOMMENDED_HISTORY_DAYS: i64 = 366;

/// Fully resolved inputs of one run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub input_path: PathBuf,
    pub sheet: String,
    pub columns: ColumnSpec,
    pub target_year: i32,
    pub horizon_fallback_days: u32,
    /// Minimum distinct days before fitting; values below 2 are raised to 2.
    pub min_history_days: usize,
    pub month_language: MonthLanguage,
    pub currency: CurrencyCode,
    pub number_format: NumberFormat,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records_read: usize,
    pub rows_dropped: usize,
    pub series: DailySeries,
    pub stats: SeriesStats,
    pub horizon: HorizonPlan,
    pub forecast: Forecast,
    pub projection: YearProjection,
    pub report_path: PathBuf,
    pub charts: Vec<ChartOutcome>,
}

impl RunReport {
    pub fn failed_charts(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.charts.iter().filter(|outcome| !outcome.is_ok())
    }
}

/// Wires the collaborators of one run together.
pub struct ForecastPipeline<'a> {
    source: &'a dyn RecordSource,
    engine: &'a dyn ForecastEngine,
    report: &'a dyn ReportSink,
    charts: Option<&'a dyn ChartSink>,
    clock: &'a dyn Clock,
}

impl<'a> ForecastPipeline<'a> {
    pub fn new(
        source: &'a dyn RecordSource,
        engine: &'a dyn ForecastEngine,
        report: &'a dyn ReportSink,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            source,
            engine,
            report,
            charts: None,
            clock,
        }
    }

    pub fn with_charts(mut self, charts: &'a dyn ChartSink) -> Self {
        self.charts = Some(charts);
        self
    }

    pub fn run(&self, settings: &PipelineSettings) -> Result<RunReport, CoreError> {
        tracing::info!(
            path = %settings.input_path.display(),
            sheet = %settings.sheet,
            "loading sales records"
        );
        let records =
            self.source
                .read_records(&settings.input_path, &settings.sheet, &settings.columns)?;
        tracing::info!(rows = records.len(), "records loaded");

        let cleaned = clean_records(&records)?;
        let series = cleaned.series;
        ensure_history(&series, settings.min_history_days)?;

        let last_history = series
            .last_date()
            .ok_or_else(|| CoreError::DataQuality("daily series is empty".into()))?;
        let horizon = plan_horizon(
            last_history,
            settings.target_year,
            settings.horizon_fallback_days,
        )?;
        if horizon.used_fallback {
            tracing::warn!(
                target_year = settings.target_year,
                fallback_days = horizon.days,
                "history already covers the target year, using fallback horizon"
            );
        }
        tracing::info!(
            engine = self.engine.name(),
            days = horizon.days,
            until = %horizon.end,
            "fitting forecast"
        );

        let forecast = self.engine.forecast(&series, &horizon)?;
        let expected = series.len() + horizon.days as usize;
        if forecast.points.len() != expected {
            return Err(CoreError::Engine(format!(
                "engine returned {} points, expected {}",
                forecast.points.len(),
                expected
            )));
        }

        let projection = project_year(&forecast, settings.target_year, settings.month_language);
        tracing::info!(
            year = projection.year,
            days = projection.days,
            total = projection.total_point,
            lower = projection.total_lower,
            upper = projection.total_upper,
            "target year projected"
        );

        let report = ForecastReport {
            year: settings.target_year,
            daily: forecast
                .points_in_year(settings.target_year)
                .copied()
                .collect(),
            summary: summary_rows(
                &projection,
                &forecast.method,
                self.clock.report_timestamp(),
                &settings.currency,
                &settings.number_format,
            ),
            projection: projection.clone(),
        };
        let report_path = self.report.write_report(&report)?;
        tracing::info!(path = %report_path.display(), "report written");

        let charts = match self.charts {
            Some(sink) => {
                let inputs = ChartInputs {
                    history: &series,
                    forecast: &forecast,
                    projection: &projection,
                    currency: &settings.currency,
                };
                render_all(sink, &inputs)
            }
            None => Vec::new(),
        };

        Ok(RunReport {
            records_read: cleaned.records_read,
            rows_dropped: cleaned.bad_dates + cleaned.bad_revenues,
            series,
            stats: cleaned.stats,
            horizon,
            forecast,
            projection,
            report_path,
            charts,
        })
    }
}

fn ensure_history(series: &DailySeries, min_history_days: usize) -> Result<(), CoreError> {
    let required = min_history_days.max(2);
    if series.len() < required {
        return Err(CoreError::InsufficientHistory {
            distinct_days: series.len(),
            required,
        });
    }
    if series.span_days() < RECOMMENDED_HISTORY_DAYS {
        tracing::warn!(
            span_days = series.span_days(),
            recommended = RECOMMENDED_HISTORY_DAYS,
            "short history, seasonal terms may be unreliable"
        );
    }
    Ok(())
}

/// Renders every chart; a failure is logged and recorded, never propagated.
fn render_all(sink: &dyn ChartSink, inputs: &ChartInputs<'_>) -> Vec<ChartOutcome> {
    ChartKind::ALL
        .iter()
        .map(|&kind| {
            let result = match sink.render(kind, inputs) {
                Ok(path) => {
                    tracing::info!(chart = %kind, path = %path.display(), "chart saved");
                    Ok(path)
                }
                Err(err) => {
                    tracing::warn!(chart = %kind, error = %err, "chart failed");
                    Err(err.to_string())
                }
            };
            ChartOutcome { kind, result }
        })
        .collect()
}
