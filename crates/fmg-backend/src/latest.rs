//! Supersede-on-restart guard for list fetches.
//!
//! A list screen re-queries whenever its tab, search or page changes. Only the
//! newest query's result matters, so starting one aborts the previous.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::future::{AbortHandle, Abortable};

use crate::error::BackendError;

#[derive(Debug, Default)]
pub struct LatestRequest {
    current: Mutex<Option<AbortHandle>>,
}

impl LatestRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut`, aborting whichever request was started before it.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Cancelled` if a newer request starts (or
    /// [`cancel`](Self::cancel) is called) before `fut` settles.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        Abortable::new(fut, registration)
            .await
            .unwrap_or(Err(BackendError::Cancelled))
    }

    /// Abort the in-flight request, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
