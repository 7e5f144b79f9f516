//! Poll-until-ready reconciler
//!
//! Remote objects are provisioned and torn down asynchronously, so every
//! lifecycle operation that must observe a settled state runs a poll loop.
//! Each poll yields an [`Attempt`]; [`Reconciler::run`] keeps polling until
//! one is ready, one is fatal, or the deadline passes.

use crate::error::{ProviderError, ProviderResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a single poll
#[derive(Debug)]
pub enum Attempt<T> {
    /// Desired state observed; stop with this value
    Ready(T),
    /// Not there yet; poll again after the backoff delay
    Retry(String),
    /// Give up immediately
    Fatal(ProviderError),
}

/// Delay between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `initial * factor^n`, never above `max`
    Exponential {
        initial: Duration,
        max: Duration,
        factor: u32,
    },
}

impl Backoff {
    /// Delay after the `retry`-th unsuccessful poll (0-based)
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(interval) => interval,
            Backoff::Exponential { initial, max, factor } => initial
                .saturating_mul(factor.saturating_pow(retry))
                .min(max),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(10),
            factor: 2,
        }
    }
}

/// Runs poll loops with a fixed backoff policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    backoff: Backoff,
}

impl Reconciler {
    pub fn new(backoff: Backoff) -> Self {
        Self { backoff }
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Poll `attempt` until it is ready or fatal, or `timeout` elapses.
    ///
    /// One last poll is made at the deadline before reporting a timeout.
    /// A timeout too large to represent as an instant never expires.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        timeout: Duration,
        mut attempt: F,
    ) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let deadline = Instant::now().checked_add(timeout);
        let mut retries: u32 = 0;

        loop {
            match attempt().await {
                Attempt::Ready(value) => {
                    tracing::debug!("{}: ready after {} poll(s)", operation, retries + 1);
                    return Ok(value);
                }
                Attempt::Fatal(err) => {
                    tracing::warn!("{}: giving up: {}", operation, err);
                    return Err(err);
                }
                Attempt::Retry(reason) => {
                    let mut delay = self.backoff.delay(retries);
                    if let Some(deadline) = deadline {
                        let now = Instant::now();
                        if now >= deadline {
                            tracing::warn!("{}: timed out, last status: {}", operation, reason);
                            return Err(ProviderError::Timeout {
                                operation: operation.to_string(),
                                timeout,
                            });
                        }
                        delay = delay.min(deadline - now);
                    }

                    tracing::debug!("{}: {}; polling again in {:?}", operation, reason, delay);
                    retries = retries.saturating_add(1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Poll `fetch` until its result satisfies `is_ready`.
    ///
    /// Retryable fetch errors (including not-found) keep the loop going;
    /// anything else aborts. `is_ready` explains why a state is not ready.
    pub async fn wait_until<T, F, Fut, P>(
        &self,
        operation: &str,
        timeout: Duration,
        mut fetch: F,
        is_ready: P,
    ) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
        P: Fn(&T) -> Result<(), String>,
    {
        let is_ready = &is_ready;
        self.run(operation, timeout, move || {
            let fetched = fetch();
            async move {
                match fetched.await {
                    Ok(state) => match is_ready(&state) {
                        Ok(()) => Attempt::Ready(state),
                        Err(reason) => Attempt::Retry(reason),
                    },
                    Err(err) if err.is_retryable() => Attempt::Retry(err.to_string()),
                    Err(err) => Attempt::Fatal(err),
                }
            }
        })
        .await
    }

    /// Poll `fetch` until it reports not-found
    pub async fn wait_until_gone<T, F, Fut>(
        &self,
        operation: &str,
        timeout: Duration,
        mut fetch: F,
    ) -> ProviderResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        self.run(operation, timeout, move || {
            let fetched = fetch();
            async move {
                match fetched.await {
                    Ok(_) => Attempt::Retry("still exists".to_string()),
                    Err(err) if err.is_not_found() => Attempt::Ready(()),
                    Err(err) if err.is_retryable() => Attempt::Retry(err.to_string()),
                    Err(err) => Attempt::Fatal(err),
                }
            }
        })
        .await
    }
}
