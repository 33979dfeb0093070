use std::{fs::File, io::BufReader, path::Path};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use forecast_core::{ColumnSpec, CoreError, RecordSource};
use forecast_domain::{CellValue, RawRecord, SheetPreview};

type Workbook = Sheets<BufReader<File>>;

/// Reads xlsx, xls, xlsb and ods workbooks through calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSource;

impl XlsxSource {
    pub fn new() -> Self {
        Self
    }

    pub fn sheet_names(&self, path: &Path) -> Result<Vec<String>, CoreError> {
        Ok(open(path)?.sheet_names())
    }

    /// Header row plus at most `rows` data rows of `sheet`.
    pub fn preview(
        &self,
        path: &Path,
        sheet: &str,
        rows: usize,
    ) -> Result<SheetPreview, CoreError> {
        let mut workbook = open(path)?;
        let range = load_range(&mut workbook, sheet)?;
        let mut iter = range.rows();
        let headers = iter
            .next()
            .map(|row| row.iter().map(header_text).collect())
            .unwrap_or_default();
        let preview_rows = iter
            .take(rows)
            .map(|row| row.iter().map(to_cell).collect())
            .collect();

        Ok(SheetPreview {
            sheet: sheet.to_string(),
            headers,
            rows: preview_rows,
            total_rows: range.height().saturating_sub(1),
        })
    }
}

impl RecordSource for XlsxSource {
    fn read_records(
        &self,
        path: &Path,
        sheet: &str,
        columns: &ColumnSpec,
    ) -> Result<Vec<RawRecord>, CoreError> {
        let mut workbook = open(path)?;
        let range = load_range(&mut workbook, sheet)?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(header_text).collect())
            .unwrap_or_default();
        let date_idx = column_index(&headers, &columns.date, sheet)?;
        let revenue_idx = column_index(&headers, &columns.revenue, sheet)?;
        tracing::debug!(sheet, date_idx, revenue_idx, "located source columns");

        // calamine ranges start at the first used cell, not necessarily A1
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut records = Vec::with_capacity(range.height().saturating_sub(1));
        for (offset, row) in rows.enumerate() {
            let date = row.get(date_idx).map(to_cell).unwrap_or_default();
            let revenue = row.get(revenue_idx).map(to_cell).unwrap_or_default();
            if date.is_empty() && revenue.is_empty() {
                continue;
            }
            // header is spreadsheet row first_row + 1, data starts one below
            records.push(RawRecord::new(first_row + offset + 2, date, revenue));
        }
        Ok(records)
    }
}

fn open(path: &Path) -> Result<Workbook, CoreError> {
    if !path.exists() {
        return Err(CoreError::SourceNotFound(path.to_path_buf()));
    }
    open_workbook_auto(path)
        .map_err(|err| CoreError::Source(format!("cannot open {}: {}", path.display(), err)))
}

fn load_range(workbook: &mut Workbook, sheet: &str) -> Result<Range<Data>, CoreError> {
    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(CoreError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }
    workbook
        .worksheet_range(sheet)
        .map_err(|err| CoreError::Source(format!("cannot read sheet `{}`: {}", sheet, err)))
}

fn column_index(headers: &[String], column: &str, sheet: &str) -> Result<usize, CoreError> {
    let wanted = column.trim();
    headers
        .iter()
        .position(|header| header == wanted)
        .ok_or_else(|| CoreError::ColumnNotFound {
            column: wanted.to_string(),
            sheet: sheet.to_string(),
        })
}

fn header_text(cell: &Data) -> String {
    to_cell(cell).to_string().trim().to_string()
}

fn to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Bool(value) => CellValue::Bool(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(value) => CellValue::Text(value.clone()),
        Data::DateTime(value) => value
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(value.as_f64())),
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::Text(value.clone()),
        Data::Error(err) => CellValue::Error(err.to_string()),
    }
}
