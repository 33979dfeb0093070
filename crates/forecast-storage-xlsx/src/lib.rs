//! forecast-storage-xlsx
//!
//! Spreadsheet adapters: reading sales sheets with calamine and writing the
//! forecast workbook with rust_xlsxwriter.

pub mod reader;
pub mod writer;

pub use reader::XlsxSource;
pub use writer::{ReportLayout, XlsxReportWriter};
