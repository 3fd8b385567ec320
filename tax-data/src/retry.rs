//! Exponential backoff for upstream fetches.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::FetchError;

const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Bounded retry with exponentially growing delays.
///
/// `max_attempts` counts every try, including the first. Only errors for
/// which [`FetchError::is_transient`] holds are retried; any other error
/// ends the loop on the spot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` tries (clamped to at least one),
    /// starting at a one second delay and doubling up to a minute, with full
    /// jitter.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: true,
        }
    }

    pub fn with_base_delay(
        mut self,
        base_delay: Duration,
    ) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(
        mut self,
        max_delay: Duration,
    ) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// With jitter on, each wait is drawn uniformly from zero up to the
    /// computed exponential delay.
    pub fn with_jitter(
        mut self,
        jitter: bool,
    ) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound of the wait after the `attempt`-th failure (1-based):
    /// `base * 2^(attempt - 1)`, capped at the maximum delay.
    pub fn backoff_ceiling(
        &self,
        attempt: u32,
    ) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Actual wait after the `attempt`-th failure.
    fn delay_for(
        &self,
        attempt: u32,
    ) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }

        let millis = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }

    /// Runs `operation` until it succeeds, fails terminally, or the attempt
    /// budget runs out.
    ///
    /// The closure receives the 1-based attempt number. Running out of
    /// attempts yields [`FetchError::Exhausted`] wrapping the last failure;
    /// a terminal failure is returned as is.
    pub async fn run<T, F, Fut>(
        &self,
        mut operation: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;

        loop {
            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                tracing::debug!(attempt, error = %err, "giving up on non-retryable error");
                return Err(err);
            }

            if attempt >= self.max_attempts {
                tracing::warn!(attempts = attempt, error = %err, "retries exhausted");
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.delay_for(attempt);
            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient upstream failure, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
