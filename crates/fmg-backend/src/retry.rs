//! Exponential backoff for transient backend failures.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fmg_auth::OnWake;
use fmg_config::RetrySettings;

use crate::error::BackendError;

/// Configuration for retrying transient errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: settings.base_delay(),
            max_delay: settings.max_delay(),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or
/// `max_attempts` is reached.
///
/// A 429 waits for its `Retry-After` when that is longer than the backoff
/// step, still capped at `max_delay`.
///
/// # Errors
///
/// Returns the last error from `op`.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut op: F) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < config.max_attempts => {
                let mut delay = config.delay_for(attempt);
                if let BackendError::RateLimited { retry_after_secs } = &e {
                    delay = delay.max(Duration::from_secs(*retry_after_secs)).min(config.max_delay);
                }
                tracing::debug!(
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts,
                    ?delay,
                    error = %e,
                    "transient backend error; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Wrap a refetch as a wake hook that retries transient failures.
///
/// Failures that survive the retries are logged and swallowed.
pub fn refetch_on_wake<F, Fut>(config: RetryConfig, refetch: F) -> OnWake
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BackendError>> + Send + 'static,
{
    let refetch = Arc::new(refetch);
    Arc::new(move || {
        let refetch = Arc::clone(&refetch);
        Box::pin(async move {
            if let Err(error) = with_retry(config, || refetch()).await {
                tracing::warn!(%error, "wake refetch failed");
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> BackendError {
        BackendError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[test]
    fn delays_double_and_cap() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_millis(100));
        assert_eq!(config.delay_for(1), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(800));
        assert_eq!(config.delay_for(5), Duration::from_secs(2));
        assert_eq!(config.delay_for(40), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result = with_retry(RetryConfig::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(server_error()) } else { Ok(n) } }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryConfig::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;
        assert!(matches!(result, Err(BackendError::Api { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryConfig::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(BackendError::Api {
                    status: 400,
                    message: "bad filter".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_for_retry_after_up_to_cap() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let _ = with_retry(RetryConfig::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(BackendError::RateLimited { retry_after_secs: 60 })
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn wake_hook_retries_and_swallows() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let hook = refetch_on_wake(RetryConfig::default(), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            }
        });
        hook().await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
