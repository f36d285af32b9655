pub mod cancel;
pub mod config;
pub mod error;
pub mod observer;
pub mod retryable;
pub mod try_again;

pub use cancel::CancelSignal;
pub use config::{RetryConfig, RetrySettings};
pub use error::{AttemptError, Result, RetryError};
pub use observer::ProgressObserver;
pub use retryable::{with_arg, Deferred, IntoAttempt, Retryable, WithArg};
pub use try_again::{
    keep_trying, keep_trying_blocking, repeatedly_try, repeatedly_try_blocking, RunSummary,
};
