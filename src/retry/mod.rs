//! Retry with exponential backoff.
//!
//! Both external API calls (transcription and summarization) go through the
//! same [`RetryPolicy`] instead of carrying their own retry loops.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Failure of a single API call attempt.
#[derive(Debug, Error)]
pub enum ApiCallError {
    /// Worth another attempt: connection failures, rate limits, server errors.
    #[error("{0:#}")]
    Transient(anyhow::Error),
    /// The request itself was rejected; retrying would not help.
    #[error("{0:#}")]
    Permanent(anyhow::Error),
}

impl ApiCallError {
    /// Classify a non-success HTTP status: rate limits and server errors are
    /// transient, everything else is permanent.
    pub fn from_status(status: reqwest::StatusCode, err: anyhow::Error) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient(err)
        } else {
            Self::Permanent(err)
        }
    }

    pub fn into_inner(self) -> anyhow::Error {
        match self {
            Self::Transient(err) | Self::Permanent(err) => err,
        }
    }
}

/// Exponential backoff: `base_delay` after the first failure, doubling per
/// attempt, capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `attempt`-th failure (1-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(1u32 << (attempt - 1).min(31));
        doubled.min(self.max_delay)
    }

    /// Run `op` until it succeeds, hits a permanent error, or exhausts the
    /// attempt budget. `what` labels the operation in logs and errors.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ApiCallError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(ApiCallError::Permanent(err)) => {
                    return Err(err.context(format!("{} failed", what)));
                }
                Err(ApiCallError::Transient(err)) => {
                    if attempt >= self.max_attempts {
                        return Err(err.context(format!(
                            "{} failed after {} attempts",
                            what, self.max_attempts
                        )));
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {:#}, retrying in {:.1}s",
                        what,
                        attempt,
                        self.max_attempts,
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(10),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2), Duration::from_secs(60));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(2), Duration::from_secs(60));
        assert_eq!(policy.delay_for(5), Duration::from_secs(32));
        assert_eq!(policy.delay_for(6), Duration::from_secs(60));
        assert_eq!(policy.delay_for(30), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let started = Instant::now();

        let result = fast_policy(3)
            .run("test call", move || async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(ApiCallError::Transient(anyhow!("rate limited")))
                } else {
                    Ok("third time lucky")
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "third time lucky");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // two backoff delays: 10ms + 20ms
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fail() {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let err = fast_policy(3)
            .run("test call", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ApiCallError::Transient(anyhow!("still down")))
            })
            .await
            .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_permanent_error_aborts_immediately() {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;

        let err = fast_policy(3)
            .run("test call", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ApiCallError::Permanent(anyhow!("bad request")))
            })
            .await
            .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("test call failed"));
    }

    #[test]
    fn test_status_classification() {
        let transient = ApiCallError::from_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            anyhow!("rate limited"),
        );
        assert!(matches!(transient, ApiCallError::Transient(_)));

        let transient = ApiCallError::from_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            anyhow!("server error"),
        );
        assert!(matches!(transient, ApiCallError::Transient(_)));

        let permanent =
            ApiCallError::from_status(reqwest::StatusCode::BAD_REQUEST, anyhow!("bad request"));
        assert!(matches!(permanent, ApiCallError::Permanent(_)));
    }
}
