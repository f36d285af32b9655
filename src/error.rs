//! Error types for the retry loop

use thiserror::Error;

/// Result type alias using the loop's error type
pub type Result<T> = std::result::Result<T, RetryError>;

/// Why a stop-on-success loop returned without a value
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryError {
    /// The cancellation signal was observed before any attempt succeeded
    #[error("retry loop cancelled after {attempts} attempts without success")]
    Cancelled { attempts: u64 },
}

/// Failure of a deferred computation that never produced its own result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("operation panicked: {0}")]
    Panicked(String),
}

impl AttemptError {
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        AttemptError::Panicked(message)
    }
}
