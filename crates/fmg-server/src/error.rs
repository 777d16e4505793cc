//! HTTP error mapping.
//!
//! Every handler returns [`ApiError`]; library errors convert into it with a
//! status code and a `{"error": ".."}` body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fmg_auth::AuthError;
use fmg_backend::{BackendError, SubmissionError};
use fmg_core::responses::ErrorResponse;
use fmg_meetings::MeetingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), error = %self.message, "request rejected");
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Http(_) => Self::new(StatusCode::BAD_GATEWAY, err.to_string()),
            AuthError::KeyringError(_) | AuthError::TokenStoreError(_) | AuthError::Other(_) => {
                Self::internal(err.to_string())
            }
            _ => Self::unauthorized(err.to_string()),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        let status = match &err {
            BackendError::NotFound { .. } => StatusCode::NOT_FOUND,
            BackendError::Validation(_) => StatusCode::BAD_REQUEST,
            BackendError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BackendError::Auth(_) => StatusCode::UNAUTHORIZED,
            BackendError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BackendError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Invalid(e) => Self::bad_request(e.to_string()),
            SubmissionError::Backend(e) => e.into(),
            partial @ SubmissionError::Partial { .. } => Self::internal(partial.to_string()),
        }
    }
}

impl From<MeetingError> for ApiError {
    fn from(err: MeetingError) -> Self {
        let status = match &err {
            MeetingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MeetingError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            MeetingError::TokenExchange { .. }
            | MeetingError::Api { .. }
            | MeetingError::MissingJoinUrl(_)
            | MeetingError::Http(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}
