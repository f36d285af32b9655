//! run one operation again and again, pausing a fixed delay before every attempt, until
//!     - an attempt succeeds (only the `repeatedly_try` pair stops there)
//!     - the cancellation signal is raised
//! errors and panics of the operation never reach the caller, each attempt only turns into
//! a true/false report for the observer
//! the async entry points suspend while waiting, the `_blocking` ones drive the very same
//! loop on the calling thread and keep it busy until the loop is over

use crate::{
    cancel::Waited,
    config::RetryConfig,
    error::{AttemptError, Result, RetryError},
    retryable::{IntoAttempt, Retryable},
};
use std::{
    fmt::Debug,
    panic::{self, AssertUnwindSafe},
};

/// Counters of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u64,
    pub successes: u64,
}

impl RunSummary {
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.attempts - self.successes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    RunForever,
    StopOnSuccess,
}

enum Stopped<T> {
    Succeeded(T, RunSummary),
    Cancelled(RunSummary),
}

/// Stop-on-success, suspending.
///
/// Returns the value of the first attempt that succeeds, or
/// [`RetryError::Cancelled`] when the signal stops the loop first.
pub async fn repeatedly_try<OneTry>(
    config: &RetryConfig,
    do_this: OneTry,
) -> Result<OneTry::Output>
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    match drive(config, do_this, Completion::StopOnSuccess).await {
        Stopped::Succeeded(value, _) => Ok(value),
        Stopped::Cancelled(summary) => Err(RetryError::Cancelled {
            attempts: summary.attempts,
        }),
    }
}

/// Stop-on-success, blocking the calling thread.
/// Must not be called from inside an async task.
pub fn repeatedly_try_blocking<OneTry>(
    config: &RetryConfig,
    do_this: OneTry,
) -> Result<OneTry::Output>
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    async_std::task::block_on(repeatedly_try(config, do_this))
}

/// Run-forever, suspending. Only cancellation ends it.
pub async fn keep_trying<OneTry>(config: &RetryConfig, do_this: OneTry) -> RunSummary
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    match drive(config, do_this, Completion::RunForever).await {
        Stopped::Succeeded(_, summary) | Stopped::Cancelled(summary) => summary,
    }
}

/// Run-forever, blocking the calling thread.
/// Must not be called from inside an async task.
pub fn keep_trying_blocking<OneTry>(config: &RetryConfig, do_this: OneTry) -> RunSummary
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    async_std::task::block_on(keep_trying(config, do_this))
}

async fn drive<OneTry>(
    config: &RetryConfig,
    mut do_this: OneTry,
    completion: Completion,
) -> Stopped<OneTry::Output>
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    let signal = config.cancel_signal();
    let mut summary = RunSummary::default();
    loop {
        if signal.is_cancelled() {
            break;
        }
        // the wait ends early on cancellation, the second check also covers a
        // cancel that lands right as the delay runs out
        if signal.wait(config.delay()).await == Waited::Cancelled || signal.is_cancelled() {
            break;
        }
        summary.attempts += 1;
        let outcome = attempt(&mut do_this, summary.attempts).await;
        config.report(outcome.is_some());
        if let Some(value) = outcome {
            summary.successes += 1;
            if completion == Completion::StopOnSuccess {
                tracing::debug!(attempts = summary.attempts, "retry loop succeeded");
                return Stopped::Succeeded(value, summary);
            }
        }
    }
    tracing::debug!(
        attempts = summary.attempts,
        successes = summary.successes,
        "retry loop cancelled"
    );
    Stopped::Cancelled(summary)
}

async fn attempt<OneTry>(do_this: &mut OneTry, number: u64) -> Option<OneTry::Output>
where
    OneTry: Retryable,
    OneTry::Error: Debug,
{
    let settled = match panic::catch_unwind(AssertUnwindSafe(|| do_this.try_once())) {
        Ok(pending) => pending.settle().await,
        Err(payload) => Err(AttemptError::from_panic(payload.as_ref())),
    };
    match settled {
        Ok(Ok(value)) => {
            tracing::trace!(attempt = number, "attempt succeeded");
            Some(value)
        }
        Ok(Err(error)) => {
            tracing::debug!(attempt = number, error = ?error, "attempt failed");
            None
        }
        Err(error) => {
            tracing::warn!(attempt = number, %error, "attempt failed");
            None
        }
    }
}
