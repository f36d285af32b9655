//! Walks through both scheduling modes of the retry loop.
//!
//! Set `RUST_LOG=retry_loop=debug` to also see the loop's own events.

use retry_loop::{
    keep_trying_blocking, repeatedly_try, with_arg, CancelSignal, Deferred, RetryConfig,
    RetrySettings,
};
use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn session(settings: RetrySettings) -> (RetryConfig, CancelSignal) {
    let signal = CancelSignal::new();
    let config = settings
        .into_config(signal.clone())
        .with_observer(|ok: bool| info!(success = ok, "attempt reported"));
    (config, signal)
}

fn cancel_after(signal: &CancelSignal, after: Duration) {
    let setter = signal.clone();
    std::thread::spawn(move || {
        std::thread::sleep(after);
        info!("cancel requested");
        setter.cancel();
    });
}

fn blocking_demo() {
    let (config, signal) = session(RetrySettings { delay_ms: 50 });
    cancel_after(&signal, Duration::from_millis(170));
    let begun = Instant::now();
    let summary = keep_trying_blocking(&config, || {
        info!(elapsed = ?begun.elapsed(), "knocking");
        Err::<(), _>("nobody home")
    });
    info!(
        attempts = summary.attempts,
        failures = summary.failures(),
        "blocking loop stopped"
    );
}

async fn suspending_demo() {
    let (config, signal) = session(RetrySettings { delay_ms: 50 });
    cancel_after(&signal, Duration::from_secs(5));
    let calls = Arc::new(AtomicU32::new(0));
    let result = repeatedly_try(
        &config,
        with_arg("greeting.txt", move |name: &'static str| {
            let calls = calls.clone();
            Deferred::lazy(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async_std::task::sleep(Duration::from_millis(10)).await;
                if n < 3 {
                    Err(format!("{name} not there yet"))
                } else {
                    Ok(format!("{name} fetched on attempt {n}"))
                }
            })
        }),
    )
    .await;
    match result {
        Ok(value) => info!(%value, "suspending loop succeeded"),
        Err(error) => info!(%error, "suspending loop gave up"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    blocking_demo();
    async_std::task::block_on(suspending_demo());
}
