//! REST client for the hosted backend's PostgREST surface.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use fmg_auth::{AuthApi, AuthError, SessionManager};
use fmg_config::BackendConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BackendError;
use crate::http::check_response;
use crate::query::Query;

/// Supplies the bearer token for each request.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Pin<Box<dyn Future<Output = Result<String, AuthError>> + Send + '_>>;
}

impl<A: AuthApi> TokenSource for SessionManager<A> {
    fn bearer_token(&self) -> Pin<Box<dyn Future<Output = Result<String, AuthError>> + Send + '_>> {
        Box::pin(self.access_token())
    }
}

/// Typed CRUD over `{backend}/rest/v1/{table}`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    rest_url: String,
    api_key: String,
    session: Option<Arc<dyn TokenSource>>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("rest_url", &self.rest_url)
            .field("has_session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Client that authenticates every request with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be constructed.
    pub fn new(rest_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            session: None,
        })
    }

    /// Client acting as the signed-in user (anon key plus session bearer).
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be constructed.
    pub fn for_user(config: &BackendConfig, session: Arc<dyn TokenSource>) -> Result<Self, BackendError> {
        let mut client = Self::new(
            config.rest_url(),
            config.anon_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )?;
        client.session = Some(session);
        Ok(client)
    }

    /// Client with the service-role key, bypassing row-level security.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Validation` when no service-role key is configured,
    /// or `BackendError::Http` if the HTTP client cannot be constructed.
    pub fn service_role(config: &BackendConfig) -> Result<Self, BackendError> {
        if !config.has_service_role() {
            return Err(BackendError::Validation(
                "backend.service_role_key is not configured".into(),
            ));
        }
        Self::new(
            config.rest_url(),
            config.service_role_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    #[must_use]
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    async fn bearer(&self) -> Result<String, BackendError> {
        match &self.session {
            Some(session) => Ok(session.bearer_token().await?),
            None => Ok(self.api_key.clone()),
        }
    }

    fn url(&self, table: &str, query: &Query) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("{}/{table}", self.rest_url)
        } else {
            format!("{}/{table}?{qs}", self.rest_url)
        }
    }

    async fn request(&self, method: reqwest::Method, url: String) -> Result<reqwest::RequestBuilder, BackendError> {
        let bearer = self.bearer().await?;
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer))
    }

    /// `GET` rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport, status or decode failure.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>, BackendError> {
        let resp = self
            .request(reqwest::Method::GET, self.url(table, query))
            .await?
            .send()
            .await?;
        decode(check_response(resp).await?, table).await
    }

    /// First row matching `query`, if any.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport, status or decode failure.
    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Option<T>, BackendError> {
        let rows = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row or an array of rows, returning the stored representation.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport, status or decode failure.
    pub async fn insert<T, B>(&self, table: &str, body: &B) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .request(reqwest::Method::POST, self.url(table, &Query::new()))
            .await?
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        decode(check_response(resp).await?, table).await
    }

    /// Insert a single row and return it.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Decode` if the backend returns no row.
    pub async fn insert_one<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.insert(table, body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {table} returned no row")))
    }

    /// `PATCH` rows matching the filters of `query`, returning the updated rows.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport, status or decode failure.
    pub async fn update<T, B>(&self, table: &str, query: &Query, patch: &B) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .request(reqwest::Method::PATCH, self.url(table, &query.filters_only()))
            .await?
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        decode(check_response(resp).await?, table).await
    }

    /// `DELETE` rows matching the filters of `query`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or status failure.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        let resp = self
            .request(reqwest::Method::DELETE, self.url(table, &query.filters_only()))
            .await?
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    /// Exact row count for the filters of `query`, read from `Content-Range`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Decode` when the header is missing or malformed.
    pub async fn count(&self, table: &str, query: &Query) -> Result<u64, BackendError> {
        let resp = self
            .request(reqwest::Method::HEAD, self.url(table, &query.filters_only()))
            .await?
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::Decode(format!("{table}: missing Content-Range total")))
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, table: &str) -> Result<Vec<T>, BackendError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(format!("{table}: {e}")))
}

/// Total from a `Content-Range` value such as `0-24/57` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-24/57"), Some(57));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn url_omits_empty_query() {
        let client = BackendClient::new("http://localhost/rest/v1/", "key", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("projects", &Query::new()), "http://localhost/rest/v1/projects");
        assert_eq!(
            client.url("projects", &Query::new().eq("id", "p1")),
            "http://localhost/rest/v1/projects?id=eq.p1"
        );
    }

    #[test]
    fn service_role_requires_key() {
        let config = BackendConfig {
            url: "http://localhost".into(),
            anon_key: "anon".into(),
            service_role_key: String::new(),
            request_timeout_ms: 1000,
        };
        assert!(matches!(
            BackendClient::service_role(&config),
            Err(BackendError::Validation(_))
        ));
    }
}
