use std::path::Path;

use forecast_domain::RawRecord;

use crate::CoreError;

/// Header names of the two columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub date: String,
    pub revenue: String,
}

impl ColumnSpec {
    pub fn new(date: impl Into<String>, revenue: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            revenue: revenue.into(),
        }
    }
}

/// Abstraction over tabular inputs capable of yielding sales records.
///
/// Implementations must report a missing file as
/// [`CoreError::SourceNotFound`] before touching any sheet, and a missing
/// sheet as [`CoreError::SheetNotFound`].
pub trait RecordSource {
    fn read_records(
        &self,
        path: &Path,
        sheet: &str,
        columns: &ColumnSpec,
    ) -> Result<Vec<RawRecord>, CoreError>;
}
