//! Decoding of input files into a [`RawGrid`].

pub mod delimited;
pub mod workbook;

use std::path::Path;

use crate::error::FintakeError;
use crate::model::RawGrid;

pub use delimited::read_csv;
pub use workbook::read_workbook;

/// Input formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<InputFormat, FintakeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(InputFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Ok(InputFormat::Workbook),
            "pdf" => Err(FintakeError::UnsupportedFormat(
                "PDF statements must be exported to a spreadsheet first".into(),
            )),
            "" => Err(FintakeError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(FintakeError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Read a file from disk, choosing the decoder by extension.
pub fn read_path(path: &Path, sheet_index: usize) -> Result<RawGrid, FintakeError> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    match format {
        InputFormat::Csv => read_csv(&bytes),
        InputFormat::Workbook => read_workbook(&bytes, sheet_index),
    }
}
