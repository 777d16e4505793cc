//! Backend error types.

use std::time::Duration;

use fmg_auth::AuthError;
use fmg_core::errors::WizardError;
use thiserror::Error;

/// Errors from the hosted backend's REST and realtime surfaces.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `message` field of the error body, or the raw body.
        message: String,
    },

    /// The REST API returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Expected a row but none was returned.
    #[error("{table} row not found: {id}")]
    NotFound { table: String, id: String },

    /// A response body did not match the expected row shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A state machine transition was attempted that is not allowed.
    #[error("invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Input rejected before anything was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// No bearer token could be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The soft timeout elapsed before the request settled.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A newer request superseded this one.
    #[error("request superseded by a newer one")]
    Cancelled,

    /// Websocket transport or protocol error.
    #[error("realtime error: {0}")]
    Realtime(String),
}

impl BackendError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, timeouts, 5xx and 429 are transient. Client errors,
    /// decode failures, auth failures and supersession are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Realtime(_) => true,
            Self::NotFound { .. }
            | Self::Decode(_)
            | Self::InvalidTransition { .. }
            | Self::Validation(_)
            | Self::Auth(_)
            | Self::Cancelled => false,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. } | Self::Auth(_))
    }
}

/// Step of the project submission fan-out that runs after the project row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutStage {
    Milestones,
    PaymentSchedule,
    ReferenceLinks,
}

impl std::fmt::Display for FanOutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Milestones => "milestones",
            Self::PaymentSchedule => "payment_schedule",
            Self::ReferenceLinks => "reference_links",
        })
    }
}

/// Errors from [`crate::BackendClient::submit_project`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The payload failed re-validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] WizardError),

    /// Loading the catalog or inserting the project failed; nothing was written.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The project row exists but a later insert failed. Nothing is rolled back.
    #[error("project {project_id} created but {stage} insert failed: {source}")]
    Partial {
        project_id: String,
        stage: FanOutStage,
        #[source]
        source: BackendError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(404, false)]
    #[case(409, false)]
    fn api_status_transience(#[case] status: u16, #[case] transient: bool) {
        let err = BackendError::Api {
            status,
            message: String::new(),
        };
        assert_eq!(err.is_transient(), transient);
    }

    #[test]
    fn timeouts_and_rate_limits_are_transient() {
        assert!(BackendError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(BackendError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(!BackendError::Cancelled.is_transient());
    }

    #[test]
    fn partial_failure_names_stage_and_project() {
        let err = SubmissionError::Partial {
            project_id: "prj-1".into(),
            stage: FanOutStage::PaymentSchedule,
            source: BackendError::Api {
                status: 500,
                message: "boom".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("prj-1"));
        assert!(msg.contains("payment_schedule"));
    }
}
