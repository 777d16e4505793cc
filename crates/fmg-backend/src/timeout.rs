use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;

/// Race `fut` against a timer; whichever settles first wins.
///
/// The request is dropped (and its connection released) when the timer wins.
///
/// # Errors
///
/// Returns `BackendError::Timeout` when `limit` elapses first, otherwise the
/// future's own result.
pub async fn with_soft_timeout<T, F>(limit: Duration, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    if let Ok(result) = tokio::time::timeout(limit, fut).await {
        result
    } else {
        tracing::warn!(?limit, "backend request timed out");
        Err(BackendError::Timeout(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fast_future_wins() {
        let result = with_soft_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, BackendError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out() {
        let result = with_soft_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, BackendError>(7)
        })
        .await;
        assert!(matches!(result, Err(BackendError::Timeout(d)) if d == Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn inner_error_passes_through() {
        let result: Result<(), _> =
            with_soft_timeout(Duration::from_secs(1), async { Err(BackendError::Cancelled) }).await;
        assert!(matches!(result, Err(BackendError::Cancelled)));
    }
}
