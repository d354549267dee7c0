use lot_domain::TimestampError;
use thiserror::Error;

/// Failures raised by the ledger, billing and classification services.
///
/// Every variant is recoverable at the interaction boundary: the operation
/// that produced it leaves the ledger unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("No open session for token `{0}`")]
    NotFound(String),
    #[error("Time format error: {0}")]
    TimeFormat(String),
    #[error("No hourly rate configured for category `{0}`")]
    UnknownCategory(String),
    #[error("Invalid interval: exit {exit} is before entry {entry}")]
    InvalidInterval { entry: String, exit: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Classification failed: {0}")]
    Classification(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TimestampError> for CoreError {
    fn from(err: TimestampError) -> Self {
        CoreError::TimeFormat(err.to_string())
    }
}
