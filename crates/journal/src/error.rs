use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read trade log: {0}")]
    Csv(#[from] csv::Error),

    #[error("Trade log missing {0} column")]
    MissingColumn(&'static str),

    #[error("Invalid timestamp format on line {line}: {value}")]
    InvalidTimestamp { line: u64, value: String },

    #[error("Invalid number in column '{column}' on line {line}: {value}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
}
