use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Sheet `{sheet}` not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },
    #[error("Column `{column}` not found in sheet `{sheet}`")]
    ColumnNotFound { column: String, sheet: String },
    #[error("Source read failed: {0}")]
    Source(String),
    #[error("Data quality error: {0}")]
    DataQuality(String),
    #[error("Insufficient history: {distinct_days} distinct day(s), at least {required} required")]
    InsufficientHistory {
        distinct_days: usize,
        required: usize,
    },
    #[error("Forecast engine failed: {0}")]
    Engine(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}
