use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FintakeError {
    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("workbook has no sheet at index {0}")]
    SheetNotFound(usize),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("the sheet contains no cells")]
    EmptyGrid,

    #[error("No periods detected: no year, date or numeric header in the first {scanned} rows")]
    NoPeriods { scanned: usize },

    #[error("failed to load mapping from {path}: {reason}")]
    MappingLoad { path: PathBuf, reason: String },

    #[error("invalid mapping: {0}")]
    MappingInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
