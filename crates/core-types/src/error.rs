use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
