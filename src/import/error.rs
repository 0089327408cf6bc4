//! Batch-level import errors.
//!
//! Row-level problems are data, not errors (see `RowError`); this type
//! covers the cases where the whole upload is unusable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("workbook could not be read: {0}")]
    WorkbookRead(String),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("first worksheet has no header row")]
    EmptySheet,
}
