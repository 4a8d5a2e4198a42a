use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sales dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An operation that needs at least one row received none.
    #[error("No rows to process in {operation}")]
    EmptyInput { operation: &'static str },

    /// A numeric column had no usable values after excluding blanks and text.
    #[error("Column '{column}' has no valid numeric values")]
    NoValidValues { column: String },

    /// A date cell could not be turned into a calendar month.
    #[error("Invalid date in column '{column}' at row {row}: {value:?}")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    /// A numeric cell held something that is not a number.
    #[error("Invalid number in column '{column}' at row {row}: {value:?}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    /// A column required by a view is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet reader rejected the workbook.
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    /// A CSV record could not be decoded.
    #[error("Failed to read CSV: {0}")]
    Csv(String),

    /// The file extension is not a supported spreadsheet format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The workbook contains no worksheets.
    #[error("Workbook contains no worksheets")]
    NoSheets,

    /// The requested worksheet does not exist.
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// The worksheet has no header row.
    #[error("Worksheet has no header row")]
    EmptySheet,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The command line could not be parsed.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// A JSON document could not be produced.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
