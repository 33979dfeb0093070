//! Raw spreadsheet cells as handed over by a record source.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Storage-agnostic view of a single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Error(value) => write!(f, "#{}", value),
        }
    }
}

/// One source row reduced to the two columns the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based spreadsheet row number, header included.
    pub row: usize,
    pub date: CellValue,
    pub revenue: CellValue,
}

impl RawRecord {
    pub fn new(row: usize, date: CellValue, revenue: CellValue) -> Self {
        Self { row, date, revenue }
    }
}

/// Header row plus a bounded preview of a sheet, used by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetPreview {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub total_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_counts_as_empty() {
        assert!(CellValue::text("   ").is_empty());
        assert!(CellValue::Empty.is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn display_formats_dates_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2025-03-09");
        assert_eq!(CellValue::Error("DIV/0!".into()).to_string(), "#DIV/0!");
    }
}
