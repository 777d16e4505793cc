//! Fakes for the server tests: an auth service keyed by bearer token, a
//! PostgREST-shaped table store, and a Zoom provider.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use fmg_auth::{AuthApi, AuthError, AuthUser, Session};
use fmg_backend::BackendClient;
use fmg_config::ZoomConfig;
use fmg_meetings::ZoomClient;
use fmg_server::AppState;
use serde_json::{Value, json};

pub const CLIENT_TOKEN: &str = "client-token";
pub const STAFF_TOKEN: &str = "staff-token";
pub const NEWCOMER_TOKEN: &str = "newcomer-token";

/// Resolves the three well-known tokens; anything else is unauthenticated.
pub struct FakeAuth;

impl AuthApi for FakeAuth {
    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        Err(AuthError::Other("not used by the server".into()))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<Session, AuthError> {
        Err(AuthError::Other("not used by the server".into()))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let id = match access_token {
            CLIENT_TOKEN => "usr-client",
            STAFF_TOKEN => "usr-staff",
            NEWCOMER_TOKEN => "usr-new",
            _ => return Err(AuthError::NotAuthenticated),
        };
        Ok(AuthUser {
            id: id.into(),
            email: Some(format!("{id}@example.com")),
        })
    }
}

#[derive(Default)]
pub struct FakeDb {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_inserts_into: Mutex<Option<String>>,
    next_id: Mutex<u64>,
}

impl FakeDb {
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn fail_inserts_into(&self, table: &str) {
        *self.fail_inserts_into.lock().unwrap() = Some(table.to_string());
    }

    fn next_id(&self, table: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{table}-{next}")
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

/// Only `eq` filters matter to the server's queries.
fn matching(rows: Vec<Value>, params: &[(String, String)]) -> Vec<Value> {
    rows.into_iter()
        .filter(|row| {
            params.iter().all(|(column, expr)| match expr.strip_prefix("eq.") {
                Some(arg) => as_text(&row[column]) == arg,
                None => true,
            })
        })
        .collect()
}

async fn rest(
    State(db): State<Arc<FakeDb>>,
    Path(table): Path<String>,
    method: Method,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    if headers.get("apikey").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "No API key found"}))).into_response();
    }
    match method {
        Method::GET | Method::HEAD => {
            let rows = matching(db.rows(&table), &params);
            let total = rows.len();
            let limit = params
                .iter()
                .find(|(k, _)| k == "limit")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(usize::MAX);
            let page: Vec<Value> = rows.into_iter().take(limit).collect();
            let range = if total == 0 {
                "*/0".to_string()
            } else {
                format!("0-{}/{total}", total - 1)
            };
            ([("content-range", range)], Json(Value::Array(page))).into_response()
        }
        Method::POST => {
            if db.fail_inserts_into.lock().unwrap().as_deref() == Some(table.as_str()) {
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "insert failed"})))
                    .into_response();
            }
            let Ok(value) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let items = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            let now = chrono::Utc::now().to_rfc3339();
            let inserted: Vec<Value> = items
                .into_iter()
                .map(|mut row| {
                    if row.get("id").is_none() {
                        row["id"] = json!(db.next_id(&table));
                    }
                    for stamp in ["created_at", "updated_at"] {
                        if row.get(stamp).is_none() {
                            row[stamp] = json!(now);
                        }
                    }
                    row
                })
                .collect();
            db.seed(&table, inserted.clone());
            (StatusCode::CREATED, Json(Value::Array(inserted))).into_response()
        }
        Method::PATCH => {
            let Ok(patch) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let mut tables = db.tables.lock().unwrap();
            let rows = tables.entry(table).or_default();
            let mut updated = Vec::new();
            for row in rows.iter_mut() {
                if matching(vec![row.clone()], &params).is_empty() {
                    continue;
                }
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
            Json(Value::Array(updated)).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn zoom_token() -> Json<Value> {
    Json(json!({"access_token": "z-access", "expires_in": 3600}))
}

async fn zoom_webinar(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer z-access") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid access token."})));
    }
    assert_eq!(body["type"], 5);
    (
        StatusCode::CREATED,
        Json(json!({"id": 81_234_567_890_u64, "join_url": "https://zoom.us/j/81234567890"})),
    )
}

/// Start the fakes; returns their base URL.
async fn serve(db: Arc<FakeDb>) -> String {
    let app = Router::new()
        .route("/rest/v1/:table", any(rest))
        .with_state(db)
        .route("/oauth/token", post(zoom_token))
        .route("/v2/users/:user_id/webinars", post(zoom_webinar));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn profile_row(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{id}@example.com"),
        "full_name": null,
        "role": role,
        "company": null,
        "created_at": "2026-01-01T00:00:00Z"
    })
}

pub fn service_row(key: &str, price: u64) -> Value {
    json!({ "key": key, "name": key, "default_price": price, "category": null, "active": true })
}

pub fn project_row(id: &str) -> Value {
    json!({
        "id": id,
        "client_id": "usr-client",
        "title": "Debut EP",
        "description": null,
        "stage": "in_review",
        "pic_id": null,
        "service_keys": ["mixing"],
        "bundle_id": null,
        "total_amount": 100,
        "payment_plan": {"kind": "full"},
        "start_date": "2026-03-01",
        "deadline": "2026-04-01",
        "created_at": "2026-02-01T10:00:00Z",
        "updated_at": "2026-02-01T10:00:00Z"
    })
}

/// State wired to the fakes, with a seeded client and staff profile. Zoom is
/// configured, Google is not.
pub async fn test_state() -> (AppState<FakeAuth>, Arc<FakeDb>) {
    let db = Arc::new(FakeDb::default());
    db.seed(
        "profiles",
        vec![profile_row("usr-client", "client"), profile_row("usr-staff", "staff")],
    );
    let base = serve(Arc::clone(&db)).await;
    let backend = BackendClient::new(format!("{base}/rest/v1"), "service-role-key", Duration::from_secs(5)).unwrap();
    let zoom = ZoomClient::new(
        ZoomConfig {
            account_id: "acct-1".into(),
            client_id: "zid".into(),
            client_secret: "zsecret".into(),
            user_id: "me".into(),
            api_base: format!("{base}/v2"),
            oauth_base: format!("{base}/oauth"),
        },
        Duration::from_secs(5),
    )
    .unwrap();
    (AppState::new(backend, FakeAuth).with_zoom(zoom), db)
}
