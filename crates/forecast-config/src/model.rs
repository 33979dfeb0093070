use chrono::{Datelike, NaiveDate};
use forecast_domain::{CurrencyCode, EngineSettings, MonthLanguage, NumberFormat};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::ConfigError;

const YEAR_PLACEHOLDER: &str = "{year}";
const MIN_CHART_SIDE: u32 = 200;

/// Everything a forecast run needs to know, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub sheet_name: String,
    pub date_column: String,
    pub revenue_column: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Where reports and charts land. Defaults to `~/Documents/Revenue Forecast`.
    pub output_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Year to project. Defaults to the year after today.
    pub target_year: Option<i32>,

    pub horizon_fallback_days: u32,
    pub min_history_days: usize,
    pub locale: String,
    pub currency: String,
    pub engine: EngineConfig,
    pub report: ReportConfig,
    pub charts: ChartConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("sales.xlsx"),
            sheet_name: "Sales".into(),
            date_column: "Date".into(),
            revenue_column: "Revenue".into(),
            output_dir: None,
            target_year: None,
            horizon_fallback_days: 365,
            min_history_days: 2,
            locale: "en-US".into(),
            currency: "EUR".into(),
            engine: EngineConfig::default(),
            report: ReportConfig::default(),
            charts: ChartConfig::default(),
        }
    }
}

impl Config {
    pub fn resolve_output_dir(&self) -> PathBuf {
        if let Some(path) = &self.output_dir {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Revenue Forecast")
    }

    pub fn resolve_target_year(&self, today: NaiveDate) -> i32 {
        self.target_year.unwrap_or_else(|| today.year() + 1)
    }

    /// Resolves a relative input path against the directory holding the
    /// configuration file.
    pub fn resolve_input_path(&self, config_dir: Option<&Path>) -> PathBuf {
        match config_dir {
            Some(dir) if self.input_path.is_relative() => dir.join(&self.input_path),
            _ => self.input_path.clone(),
        }
    }

    pub fn month_language(&self) -> MonthLanguage {
        MonthLanguage::from_locale(&self.locale)
    }

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(&self.currency)
    }

    /// Separators for printed amounts, following the locale's language.
    pub fn number_format(&self) -> NumberFormat {
        let primary = self
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "it" | "de" | "es" | "pt" | "nl" => NumberFormat {
                decimal_separator: ',',
                grouping_separator: '.',
            },
            _ => NumberFormat::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("sheet_name", &self.sheet_name),
            ("date_column", &self.date_column),
            ("revenue_column", &self.revenue_column),
            ("currency", &self.currency),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{}` must not be empty", field)));
            }
        }
        if self.horizon_fallback_days == 0 {
            return Err(ConfigError::Invalid(
                "`horizon_fallback_days` must be at least 1".into(),
            ));
        }
        if let Some(year) = self.target_year {
            if !(1900..=9999).contains(&year) {
                return Err(ConfigError::Invalid(format!(
                    "`target_year` {} is out of range",
                    year
                )));
            }
        }
        self.engine
            .settings
            .validate()
            .map_err(|reason| ConfigError::Invalid(format!("engine: {}", reason)))?;
        self.charts.validate()?;
        self.report.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Decomposition,
    Baseline,
}

impl EngineKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "decomposition" => Some(EngineKind::Decomposition),
            "baseline" => Some(EngineKind::Baseline),
            _ => None,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineKind::Decomposition => "decomposition",
            EngineKind::Baseline => "baseline",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub settings: EngineSettings,
}

/// Workbook layout. `file_name` may contain `{year}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub file_name: String,
    pub daily_sheet: String,
    pub monthly_sheet: String,
    pub summary_sheet: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: "revenue_forecast_{year}.xlsx".into(),
            daily_sheet: "Daily Forecast".into(),
            monthly_sheet: "Monthly Forecast".into(),
            summary_sheet: "Summary".into(),
        }
    }
}

impl ReportConfig {
    pub fn file_name_for(&self, year: i32) -> String {
        expand_year(&self.file_name, year)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("report file name is empty".into()));
        }
        let sheets = [&self.daily_sheet, &self.monthly_sheet, &self.summary_sheet];
        for (idx, sheet) in sheets.iter().enumerate() {
            // worksheet names are capped at 31 characters
            if sheet.trim().is_empty() || sheet.chars().count() > 31 {
                return Err(ConfigError::Invalid(format!(
                    "report sheet name `{}` must be 1 to 31 characters",
                    sheet
                )));
            }
            if sheets[..idx].contains(sheet) {
                return Err(ConfigError::Invalid(format!(
                    "report sheet name `{}` is used twice",
                    sheet
                )));
            }
        }
        Ok(())
    }
}

/// Chart output settings. File names may contain `{year}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub full_forecast_file: String,
    pub components_file: String,
    pub target_year_file: String,
    pub monthly_file: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// TrueType/OpenType font used for labels; common system fonts are tried otherwise.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            full_forecast_file: "forecast_full.png".into(),
            components_file: "forecast_components.png".into(),
            target_year_file: "forecast_{year}.png".into(),
            monthly_file: "forecast_monthly_{year}.png".into(),
            width: 2100,
            height: 1200,
            font_path: None,
        }
    }
}

impl ChartConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_CHART_SIDE || self.height < MIN_CHART_SIDE {
            return Err(ConfigError::Invalid(format!(
                "chart size {}x{} is below the {}px minimum",
                self.width, self.height, MIN_CHART_SIDE
            )));
        }
        let files = [
            &self.full_forecast_file,
            &self.components_file,
            &self.target_year_file,
            &self.monthly_file,
        ];
        if files.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid("chart file names must not be empty".into()));
        }
        Ok(())
    }
}

/// Replaces every `{year}` in `template`.
pub fn expand_year(template: &str, year: i32) -> String {
    template.replace(YEAR_PLACEHOLDER, &year.to_string())
}
