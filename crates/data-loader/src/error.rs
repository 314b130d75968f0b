//! Error types for the data-loader crate.
//!
//! Covers everything that can go wrong between opening a Steam catalog file
//! and handing a validated `GameIndex` to the rest of the system.

use thiserror::Error;

/// Errors that can occur during catalog loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid JSON at all
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A single game entry couldn't be parsed
    ///
    /// Stores the app id of the offending record so the catalog can be fixed
    #[error("Parse error in record {record}: {reason}")]
    ParseError { record: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
