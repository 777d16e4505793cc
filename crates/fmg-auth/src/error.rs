use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated: sign in first")]
    NotAuthenticated,

    #[error("token expired: sign in again")]
    TokenExpired,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("keyring error: {0}")]
    KeyringError(String),

    #[error("token store error: {0}")]
    TokenStoreError(String),

    #[error("{0}")]
    Other(String),
}
