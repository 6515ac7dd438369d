use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that makes a trade log untrustworthy. Each one is terminal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read log: {0}")]
    Unreadable(String),

    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid timestamp format: {0}")]
    MalformedTimestamp(String),

    #[error("Daily loss {loss_pct:.2}% on {date} exceeds limit {limit_pct:.2}%")]
    RiskLimitBreach {
        date: NaiveDate,
        loss_pct: Decimal,
        limit_pct: Decimal,
    },

    #[error("Mismatch between open volume ({open}) and close volume ({close}).")]
    VolumeImbalance { open: Decimal, close: Decimal },

    #[error("Arithmetic overflow while accumulating {0}")]
    Overflow(&'static str),

    #[error("Invalid risk limits: {0}")]
    InvalidLimits(String),
}
