use crate::{cancel::CancelSignal, observer::ProgressObserver};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};

/// Everything one retry session needs: the pause between attempts,
/// the signal that stops the loop, and an optional sink for attempt outcomes.
///
/// Built by the caller once per session. The loop only reads it; the single
/// piece of state it shares with the outside world is the cancellation signal.
#[derive(Clone)]
pub struct RetryConfig {
    delay: Duration,
    cancel: CancelSignal,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl RetryConfig {
    #[must_use]
    pub fn new(delay: Duration, cancel: CancelSignal) -> Self {
        Self {
            delay,
            cancel,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: ProgressObserver + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    #[must_use]
    pub fn with_shared_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    pub(crate) fn report(&self, success: bool) {
        if let Some(observer) = &self.observer {
            observer.report(success);
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("delay", &self.delay)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// The serializable part of a [`RetryConfig`], e.g. read from a settings file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Delay, in milliseconds, before every attempt.
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { delay_ms: 1_000 }
    }
}

impl RetrySettings {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn into_config(self, cancel: CancelSignal) -> RetryConfig {
        RetryConfig::new(self.delay(), cancel)
    }
}

#[cfg(test)]
mod test {
    use super::{RetryConfig, RetrySettings};
    use crate::cancel::CancelSignal;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    #[test]
    fn settings_defaults_and_overrides() {
        let defaults: RetrySettings = serde_json::from_str("{}").expect("empty object is valid");
        assert_eq!(defaults, RetrySettings::default());
        assert_eq!(defaults.delay(), Duration::from_secs(1));

        let custom: RetrySettings =
            serde_json::from_str(r#"{"delay_ms": 50}"#).expect("valid settings");
        assert_eq!(custom.delay(), Duration::from_millis(50));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let parsed = serde_json::from_str::<RetrySettings>(r#"{"delay_ms": -5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_reports_to_observer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let signal = CancelSignal::new();
        let config = RetrySettings { delay_ms: 5 }
            .into_config(signal.clone())
            .with_observer(move |_ok: bool| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(config.delay(), Duration::from_millis(5));
        config.report(true);
        config.report(false);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        signal.cancel();
        assert!(config.cancel_signal().is_cancelled());
        assert_eq!(
            format!("{config:?}"),
            "RetryConfig { delay: 5ms, cancelled: true, observer: true }"
        );
    }

    #[test]
    fn shared_observer_outlives_sessions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let observer: Arc<dyn crate::observer::ProgressObserver> =
            Arc::new(move |_ok: bool| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        for _ in 0..2 {
            RetryConfig::new(Duration::ZERO, CancelSignal::new())
                .with_shared_observer(observer.clone())
                .report(true);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn no_observer_is_fine() {
        let config = RetryConfig::new(Duration::ZERO, CancelSignal::new());
        config.report(true);
        assert!(!config.cancel_signal().is_cancelled());
    }
}
