use thiserror::Error;

use crate::puzzle::MalformedSubmission;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    MalformedSubmission(#[from] MalformedSubmission),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record store could not complete a read or write; safe to retry
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl TrackerError {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        TrackerError::InvalidQuery(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        TrackerError::NotFound(what.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TrackerError::StoreFailure(_))
    }
}
