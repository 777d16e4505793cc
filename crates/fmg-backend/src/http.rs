//! Shared HTTP response handling.

use crate::error::BackendError;

/// Check an HTTP response for errors, returning the response on success.
///
/// - **429**: returns `BackendError::RateLimited` with `Retry-After` seconds (default 60).
/// - **Other non-2xx**: returns `BackendError::Api` with the status code and the
///   `message` field of the error body (PostgREST and GoTrue both send one).
///
/// # Errors
///
/// Returns `BackendError::RateLimited` for 429 responses, or
/// `BackendError::Api` for any other non-success status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(BackendError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status,
            message: error_message(&body),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v[*k].as_str().map(String::from))
        })
        .unwrap_or_else(|| body.to_string())
}
