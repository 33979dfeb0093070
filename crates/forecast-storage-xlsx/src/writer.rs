use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use forecast_core::{CoreError, ForecastReport, ReportSink};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

const TMP_SUFFIX: &str = "tmp";
const DATE_FORMAT: &str = "%Y-%m-%d";
const AMOUNT_FORMAT: &str = "#,##0.00";

/// Worksheet names of the exported workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub daily_sheet: String,
    pub monthly_sheet: String,
    pub summary_sheet: String,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            daily_sheet: "Daily Forecast".into(),
            monthly_sheet: "Monthly Forecast".into(),
            summary_sheet: "Summary".into(),
        }
    }
}

/// Writes the three-sheet forecast workbook to a fixed path.
///
/// The workbook is built in memory and moved into place with a rename, so a
/// failed export never leaves a partial file behind.
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    path: PathBuf,
    layout: ReportLayout,
}

struct Formats {
    header: Format,
    amount: Format,
    text: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            amount: Format::new()
                .set_num_format(AMOUNT_FORMAT)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
        }
    }
}

impl XlsxReportWriter {
    pub fn new(path: PathBuf, layout: ReportLayout) -> Self {
        Self { path, layout }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialises `report` into xlsx bytes without touching the filesystem.
    pub fn render_to_bytes(&self, report: &ForecastReport) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let formats = Formats::new();

        self.add_daily_sheet(&mut workbook, report, &formats)?;
        self.add_monthly_sheet(&mut workbook, report, &formats)?;
        self.add_summary_sheet(&mut workbook, report, &formats)?;

        workbook.save_to_buffer()
    }

    fn add_daily_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ForecastReport,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.layout.daily_sheet)?;
        write_headers(sheet, &["Date", "Forecast", "Lower", "Upper"], formats)?;
        sheet.set_column_width(0, 12)?;

        for (idx, point) in report.daily.iter().enumerate() {
            let row = idx as u32 + 1;
            let date = point.date.format(DATE_FORMAT).to_string();
            sheet.write_string_with_format(row, 0, &date, &formats.text)?;
            sheet.write_number_with_format(row, 1, point.point, &formats.amount)?;
            sheet.write_number_with_format(row, 2, point.lower, &formats.amount)?;
            sheet.write_number_with_format(row, 3, point.upper, &formats.amount)?;
        }
        Ok(())
    }

    fn add_monthly_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ForecastReport,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.layout.monthly_sheet)?;
        write_headers(sheet, &["Month", "Forecast", "Lower", "Upper"], formats)?;
        sheet.set_column_width(0, 14)?;

        for (idx, month) in report.projection.months.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string_with_format(row, 0, &month.label, &formats.text)?;
            sheet.write_number_with_format(row, 1, month.point, &formats.amount)?;
            sheet.write_number_with_format(row, 2, month.lower, &formats.amount)?;
            sheet.write_number_with_format(row, 3, month.upper, &formats.amount)?;
        }
        Ok(())
    }

    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ForecastReport,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.layout.summary_sheet)?;
        write_headers(sheet, &["Metric", "Value"], formats)?;
        sheet.set_column_width(0, 32)?;
        sheet.set_column_width(1, 32)?;

        for (idx, entry) in report.summary.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string_with_format(row, 0, &entry.metric, &formats.text)?;
            sheet.write_string_with_format(row, 1, &entry.value, &formats.text)?;
        }
        Ok(())
    }
}

impl ReportSink for XlsxReportWriter {
    fn write_report(&self, report: &ForecastReport) -> Result<PathBuf, CoreError> {
        let bytes = self
            .render_to_bytes(report)
            .map_err(|err| CoreError::Export(format!("cannot build workbook: {}", err)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                CoreError::Export(format!("cannot create {}: {}", parent.display(), err))
            })?;
        }
        let tmp = tmp_path(&self.path);
        let written = write_bytes(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(CoreError::Export(format!(
                "cannot write {}: {}",
                self.path.display(),
                err
            )));
        }
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "workbook saved");
        Ok(self.path.clone())
    }
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[&str],
    formats: &Formats,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
        if col > 0 {
            sheet.set_column_width(col as u16, 14)?;
        }
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_bytes(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}
