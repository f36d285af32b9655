//! the externally settable flag the retry loop checks between attempts
//! any clone can set it from any thread, the loop only ever reads it

use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

/// how an inter-attempt wait ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Waited {
    Elapsed,
    Cancelled,
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// request cancellation, idempotent
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// a signal that gets cancelled along with this one
    /// but whose own cancellation does not reach back up to the parent
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// sleep for `delay` unless cancellation shows up first
    /// works on whatever executor polls it, including `block_on` on a plain thread
    /// always suspends at least once, even for a zero delay
    pub(crate) async fn wait(&self, delay: Duration) -> Waited {
        match async_std::future::timeout(delay, self.token.cancelled()).await {
            Ok(()) => Waited::Cancelled,
            Err(_) => {
                // a zero or already expired timer is ready on first poll
                async_std::task::yield_now().await;
                Waited::Elapsed
            }
        }
    }
}

impl From<CancellationToken> for CancelSignal {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
