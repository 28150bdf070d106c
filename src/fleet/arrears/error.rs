use std::path::PathBuf;

use thiserror::Error;

use crate::fleet::arrears::model::FieldKey;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error type covering the failure cases of staging, opening, and encoding a
/// workbook. Per-sheet and per-row anomalies are absorbed by the extraction
/// engine and never surface here, except through [`ExtractError::SheetRead`]
/// which the workbook driver logs and skips.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the workbook container itself cannot be opened or parsed.
    #[error("unable to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Raised when a single sheet cannot be read.
    #[error("unable to read sheet '{sheet}': {reason}")]
    SheetRead { sheet: String, reason: String },

    /// Raised when the declared file extension is not a spreadsheet format.
    #[error("unsupported file extension '{0}'")]
    UnsupportedExtension(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when no sheet produced a single valid record.
    #[error("no valid data found in the file")]
    NoData,

    /// Raised when a custom field dictionary breaks its invariants.
    #[error("invalid field dictionary: {0}")]
    InvalidDictionary(String),

    /// Raised when a field dictionary lists the same key twice.
    #[error("field '{0}' appears more than once in the dictionary")]
    DuplicateField(FieldKey),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ExtractError {
    /// Whether the failure was caused by what the caller submitted rather than
    /// by the tool itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::NoData
                | ExtractError::UnsupportedExtension(_)
                | ExtractError::MissingInput(_)
        )
    }
}
