use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the contribution ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// An input directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// An input directory exists but could not be enumerated.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report file could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A structured (YAML) contribution file is not a flat date→count mapping.
    #[error("Failed to parse structured data in {path}: {message}")]
    StructuredParse { path: PathBuf, message: String },

    /// A markup (HTML) level file could not be tokenized.
    #[error("Failed to parse markup in {path}: {message}")]
    MarkupParse { path: PathBuf, message: String },

    /// The month component of a date key is not in `1..=12`.
    #[error("Invalid month number {month:?} in date {date}")]
    InvalidMonth { date: String, month: String },

    /// A date key is not a calendar date in `YYYY-MM-DD` form.
    #[error("Invalid date key {key:?} in {path}")]
    InvalidDateKey { path: PathBuf, key: String },

    /// A combined record lacks a field required by the active policy.
    #[error("Incomplete record for {date}: missing {missing}")]
    IncompleteRecord { date: String, missing: &'static str },

    /// The CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be produced.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// `true` for per-file markup failures that the level loader may skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LedgerError::MarkupParse { .. })
    }
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;
