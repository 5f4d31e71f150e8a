use std::path::PathBuf;

use thiserror::Error;

/// Failure to acquire or parse the input. Always fatal for the report.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download failed: {0}")]
    Http(String),

    #[error("download from {url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    #[error("invalid download link '{link}': {reason}")]
    InvalidLink { link: String, reason: String },

    #[error("cannot read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("sheet '{name}' not found (sheets: {})", available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("cannot parse CSV: {0}")]
    Csv(String),

    #[error("input has no header row")]
    Empty,
}

/// Failure to write a report workbook.
#[derive(Debug, Error)]
#[error("cannot write {}: {message}", path.display())]
pub struct ExportError {
    pub path: PathBuf,
    pub message: String,
}
