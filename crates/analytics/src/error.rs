use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Trade log is empty")]
    EmptyLog,

    #[error("Trade log missing {0} column")]
    Schema(&'static str),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}
