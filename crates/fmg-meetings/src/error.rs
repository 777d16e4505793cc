use thiserror::Error;

/// Errors from the meeting providers.
#[derive(Debug, Error)]
pub enum MeetingError {
    /// Credentials for the provider are missing from the config.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The OAuth token endpoint rejected the credentials.
    #[error("{provider} token exchange failed ({status}): {message}")]
    TokenExchange {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The provider's API returned a non-success status code.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The provider created the meeting but returned no join link.
    #[error("{0} returned no join link")]
    MissingJoinUrl(&'static str),

    #[error("invalid meeting request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
