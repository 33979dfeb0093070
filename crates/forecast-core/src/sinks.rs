//! Output collaborators: the spreadsheet report and the chart images.

use std::{fmt, path::PathBuf};

use forecast_domain::{CurrencyCode, DailySeries, Forecast, ForecastPoint, YearProjection};

use crate::{summary::SummaryRow, CoreError};

/// Tables written by a [`ReportSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub year: i32,
    /// Daily points of the target year only.
    pub daily: Vec<ForecastPoint>,
    pub projection: YearProjection,
    pub summary: Vec<SummaryRow>,
}

/// Persists a finished report. Either the whole artifact is written or an
/// error is returned and any earlier artifact at the destination survives.
pub trait ReportSink {
    fn write_report(&self, report: &ForecastReport) -> Result<PathBuf, CoreError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    FullForecast,
    Components,
    TargetYear,
    Monthly,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::FullForecast,
        ChartKind::Components,
        ChartKind::TargetYear,
        ChartKind::Monthly,
    ];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChartKind::FullForecast => "full forecast",
            ChartKind::Components => "components",
            ChartKind::TargetYear => "target year",
            ChartKind::Monthly => "monthly",
        };
        f.write_str(label)
    }
}

/// Everything a chart may draw from.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    pub history: &'a DailySeries,
    pub forecast: &'a Forecast,
    pub projection: &'a YearProjection,
    pub currency: &'a CurrencyCode,
}

/// Renders one chart to an image and returns where it landed.
pub trait ChartSink {
    fn render(&self, kind: ChartKind, inputs: &ChartInputs<'_>) -> Result<PathBuf, CoreError>;
}

/// Result of one isolated chart render.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOutcome {
    pub kind: ChartKind,
    pub result: Result<PathBuf, String>,
}

impl ChartOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
