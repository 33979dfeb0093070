//! Turns a [`Config`] into a wired [`ForecastPipeline`] and runs it.

use std::path::{Path, PathBuf};

use forecast_config::{Config, EngineKind};
use forecast_core::{
    Clock, ColumnSpec, DecompositionEngine, ForecastEngine, ForecastPipeline, PipelineSettings,
    RunReport, WeekdayProfileEngine,
};
use forecast_storage_xlsx::{ReportLayout, XlsxReportWriter, XlsxSource};

use crate::{charts::PlottersChartRenderer, errors::Result};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub input: Option<PathBuf>,
    pub sheet: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub target_year: Option<i32>,
    pub horizon_fallback_days: Option<u32>,
    pub engine: Option<EngineKind>,
    pub skip_charts: bool,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.sheet_name = sheet.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(year) = self.target_year {
            config.target_year = Some(year);
        }
        if let Some(days) = self.horizon_fallback_days {
            config.horizon_fallback_days = days;
        }
        if let Some(kind) = self.engine {
            config.engine.kind = kind;
        }
        if self.skip_charts {
            config.charts.enabled = false;
        }
    }
}

pub fn build_engine(config: &Config) -> Result<Box<dyn ForecastEngine>> {
    let settings = &config.engine.settings;
    let engine: Box<dyn ForecastEngine> = match config.engine.kind {
        EngineKind::Decomposition => Box::new(DecompositionEngine::new(settings.clone())?),
        EngineKind::Baseline => Box::new(WeekdayProfileEngine::new(settings.interval_width)?),
    };
    Ok(engine)
}

/// Resolves every run input; relative input paths resolve against `config_dir`.
pub fn pipeline_settings(
    config: &Config,
    target_year: i32,
    config_dir: Option<&Path>,
) -> PipelineSettings {
    PipelineSettings {
        input_path: config.resolve_input_path(config_dir),
        sheet: config.sheet_name.clone(),
        columns: ColumnSpec::new(config.date_column.trim(), config.revenue_column.trim()),
        target_year,
        horizon_fallback_days: config.horizon_fallback_days,
        min_history_days: config.min_history_days,
        month_language: config.month_language(),
        currency: config.currency_code(),
        number_format: config.number_format(),
    }
}

/// Runs the full pipeline described by `config`.
pub fn run_forecast(
    config: &Config,
    config_dir: Option<&Path>,
    clock: &dyn Clock,
) -> Result<RunReport> {
    config.validate()?;
    let target_year = config.resolve_target_year(clock.today());
    let settings = pipeline_settings(config, target_year, config_dir);
    let output_dir = config.resolve_output_dir();

    let source = XlsxSource::new();
    let engine = build_engine(config)?;
    let writer = XlsxReportWriter::new(
        output_dir.join(config.report.file_name_for(target_year)),
        ReportLayout {
            daily_sheet: config.report.daily_sheet.clone(),
            monthly_sheet: config.report.monthly_sheet.clone(),
            summary_sheet: config.report.summary_sheet.clone(),
        },
    );
    let charts =
        PlottersChartRenderer::from_config(output_dir.clone(), &config.charts, target_year);

    tracing::info!(
        target_year,
        engine = %config.engine.kind,
        output_dir = %output_dir.display(),
        "starting forecast run"
    );
    let mut pipeline = ForecastPipeline::new(&source, engine.as_ref(), &writer, clock);
    if config.charts.enabled {
        pipeline = pipeline.with_charts(&charts);
    }
    Ok(pipeline.run(&settings)?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use forecast_core::FixedClock;

    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        RunOverrides {
            sheet: Some("VEND".into()),
            target_year: Some(2026),
            engine: Some(EngineKind::Baseline),
            skip_charts: true,
            ..RunOverrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.sheet_name, "VEND");
        assert_eq!(config.target_year, Some(2026));
        assert_eq!(config.engine.kind, EngineKind::Baseline);
        assert!(!config.charts.enabled);
        assert_eq!(config.date_column, "Date");
    }

    #[test]
    fn engine_follows_config_kind() {
        let mut config = Config::default();
        assert_eq!(
            build_engine(&config).unwrap().name(),
            "Fourier decomposition regression"
        );
        config.engine.kind = EngineKind::Baseline;
        assert_eq!(build_engine(&config).unwrap().name(), "Weekday profile baseline");
    }

    #[test]
    fn settings_carry_locale_choices() {
        let config = Config {
            locale: "it-IT".into(),
            input_path: PathBuf::from("vendite.xlsx"),
            ..Config::default()
        };
        let settings = pipeline_settings(&config, 2026, Some(Path::new("/data")));
        assert_eq!(settings.input_path, PathBuf::from("/data/vendite.xlsx"));
        assert_eq!(settings.month_language, forecast_domain::MonthLanguage::Italian);
        assert_eq!(settings.target_year, 2026);
    }

    #[test]
    fn missing_input_surfaces_source_not_found() {
        let dir = std::env::temp_dir().join("revenue-forecast-missing-input");
        let config = Config {
            input_path: dir.join("absent.xlsx"),
            output_dir: Some(dir),
            target_year: Some(2026),
            ..Config::default()
        };
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2025, 11, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        let err = run_forecast(&config, None, &clock).unwrap_err();
        assert!(matches!(
            err,
            crate::errors::ForecastError::Core(forecast_core::CoreError::SourceNotFound(_))
        ));
    }
}
