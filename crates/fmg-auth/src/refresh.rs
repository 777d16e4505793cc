use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::AuthError;

/// Refresh when fewer than this many seconds remain on the access token.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Whether a session expiring at `expires_at` must be refreshed at `now`.
///
/// True when there is no session, the token has expired, or it expires within
/// `buffer_secs`.
#[must_use]
pub fn needs_refresh(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>, buffer_secs: i64) -> bool {
    expires_at.is_none_or(|exp| (exp - now).num_seconds() <= buffer_secs)
}

/// Decode JWT `exp` claim without signature verification (for quick expiry checks).
///
/// # Errors
///
/// Returns `AuthError::Other` if the JWT format is invalid or the `exp` claim
/// is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let payload = decode_payload(jwt)?;
    exp_from_payload(&payload)
}

pub(crate) fn decode_payload(jwt: &str) -> Result<serde_json::Value, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Other("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::Other(format!("base64 decode failed: {e}")))?;
    serde_json::from_slice(&payload).map_err(|e| AuthError::Other(format!("JSON parse failed: {e}")))
}

pub(crate) fn exp_from_payload(payload: &serde_json::Value) -> Result<DateTime<Utc>, AuthError> {
    let exp = payload["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Other("missing exp claim".into()))?;
    DateTime::from_timestamp(exp, 0).ok_or_else(|| AuthError::Other("invalid exp timestamp".into()))
}
