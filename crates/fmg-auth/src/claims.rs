use chrono::{DateTime, Utc};

use crate::error::AuthError;

/// Claims read from an access token without signature verification.
///
/// The hosted backend verifies signatures on every request; the hub only needs
/// the subject and expiry to decide when to refresh and who is calling.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    /// Raw JWT string (sent as the bearer token).
    pub raw_jwt: String,
    /// Auth user ID (`sub` claim).
    pub user_id: String,
    /// `email` claim, if present.
    pub email: Option<String>,
    /// Database role the token maps to (`role` claim, e.g. `"authenticated"`).
    pub role: Option<String>,
    /// Token expiration time (from `exp` claim).
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Decode the claims of `jwt`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Other` if the token is not a three-part JWT, the
    /// payload is not JSON, or `sub`/`exp` are missing.
    pub fn decode(jwt: &str) -> Result<Self, AuthError> {
        let payload = crate::refresh::decode_payload(jwt)?;
        let user_id = payload["sub"]
            .as_str()
            .ok_or_else(|| AuthError::Other("missing sub claim".into()))?
            .to_string();
        let expires_at = crate::refresh::exp_from_payload(&payload)?;
        Ok(Self {
            raw_jwt: jwt.to_string(),
            user_id,
            email: payload["email"].as_str().map(String::from),
            role: payload["role"].as_str().map(String::from),
            expires_at,
        })
    }

    /// Check if the token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        crate::refresh::needs_refresh(Some(self.expires_at), Utc::now(), buffer_secs)
    }
}
