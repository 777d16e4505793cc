//! In-process fake of the hosted REST surface, backed by in-memory tables.
//!
//! Supports the subset of PostgREST the hub uses: `eq`, `neq`, `gt`, `in`,
//! `ilike` and `is.null` filters, single-column ordering, `offset`/`limit`,
//! `Prefer: return=representation` and `Prefer: count=exact`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use fmg_backend::BackendClient;
use serde_json::{Value, json};

#[derive(Default)]
pub struct FakeDb {
    pub tables: Mutex<HashMap<String, Vec<Value>>>,
    pub fail_inserts_into: Mutex<Option<String>>,
    pub bearers: Mutex<Vec<String>>,
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
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail_inserts_into(&self, table: &str) {
        *self.fail_inserts_into.lock().unwrap() = Some(table.to_string());
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.bearers.lock().unwrap().last().cloned()
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

fn matches(row: &Value, column: &str, expr: &str) -> bool {
    let field = &row[column];
    let Some((op, arg)) = expr.split_once('.') else {
        return true;
    };
    match op {
        "eq" => as_text(field) == arg,
        "neq" => as_text(field) != arg,
        "gt" => as_text(field).as_str() > arg,
        "is" => arg == "null" && field.is_null(),
        "in" => arg
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .any(|v| v.trim_matches('"') == as_text(field)),
        "ilike" => {
            let text = as_text(field).to_lowercase();
            let pattern = arg.to_lowercase();
            match (pattern.starts_with('*'), pattern.ends_with('*')) {
                (true, true) => text.contains(pattern.trim_matches('*')),
                (false, true) => text.starts_with(pattern.trim_end_matches('*')),
                (true, false) => text.ends_with(pattern.trim_start_matches('*')),
                (false, false) => text == pattern,
            }
        }
        _ => true,
    }
}

const RESERVED: [&str; 4] = ["select", "order", "offset", "limit"];

fn filtered(rows: &[Value], params: &[(String, String)]) -> Vec<Value> {
    rows.iter()
        .filter(|row| {
            params
                .iter()
                .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
                .all(|(k, v)| matches(row, k, v))
        })
        .cloned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

async fn handle(
    State(db): State<Arc<FakeDb>>,
    Path(table): Path<String>,
    method: Method,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    if headers.get("apikey").is_none() {
        return (StatusCode::UNAUTHORIZED, axum::Json(json!({"message": "No API key found"})))
            .into_response();
    }
    if let Some(bearer) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        db.bearers.lock().unwrap().push(bearer.to_string());
    }

    match method {
        Method::GET | Method::HEAD => {
            let mut rows = filtered(&db.rows(&table), &params);
            let total = rows.len();
            if let Some(order) = param(&params, "order") {
                let (col, dir) = order.split_once('.').unwrap_or((order, "asc"));
                rows.sort_by_key(|r| as_text(&r[col]));
                if dir == "desc" {
                    rows.reverse();
                }
            }
            let offset = param(&params, "offset").and_then(|v| v.parse().ok()).unwrap_or(0);
            let limit = param(&params, "limit").and_then(|v| v.parse().ok()).unwrap_or(usize::MAX);
            let page: Vec<Value> = rows.into_iter().skip(offset).take(limit).collect();
            let range = if total == 0 {
                "*/0".to_string()
            } else {
                format!("0-{}/{total}", total - 1)
            };
            ([("content-range", range)], axum::Json(Value::Array(page))).into_response()
        }
        Method::POST => {
            if db.fail_inserts_into.lock().unwrap().as_deref() == Some(table.as_str()) {
                return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(json!({"message": "insert failed"})))
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
            (StatusCode::CREATED, axum::Json(Value::Array(inserted))).into_response()
        }
        Method::PATCH => {
            let Ok(patch) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let mut tables = db.tables.lock().unwrap();
            let rows = tables.entry(table).or_default();
            let mut updated = Vec::new();
            for row in rows.iter_mut() {
                if filtered(std::slice::from_ref(row), &params).is_empty() {
                    continue;
                }
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
            axum::Json(Value::Array(updated)).into_response()
        }
        Method::DELETE => {
            let mut tables = db.tables.lock().unwrap();
            let rows = tables.entry(table).or_default();
            rows.retain(|row| filtered(std::slice::from_ref(row), &params).is_empty());
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

/// Start the fake and return its REST base URL.
pub async fn serve(db: Arc<FakeDb>) -> String {
    let app = Router::new()
        .route("/rest/v1/:table", any(handle))
        .with_state(db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/rest/v1")
}

pub async fn service_client() -> (BackendClient, Arc<FakeDb>) {
    let db = Arc::new(FakeDb::default());
    let url = serve(Arc::clone(&db)).await;
    let client = BackendClient::new(url, "service-role-key", Duration::from_secs(5)).unwrap();
    (client, db)
}

pub fn project_row(id: &str, title: &str, stage: &str, day: u32) -> Value {
    json!({
        "id": id,
        "client_id": "usr-client",
        "title": title,
        "description": null,
        "stage": stage,
        "pic_id": null,
        "service_keys": ["mixing"],
        "bundle_id": null,
        "total_amount": 100,
        "payment_plan": {"kind": "full"},
        "start_date": "2026-03-01",
        "deadline": "2026-04-01",
        "created_at": format!("2026-02-{day:02}T10:00:00Z"),
        "updated_at": "2026-02-01T10:00:00Z"
    })
}

pub fn service_row(key: &str, price: u64) -> Value {
    json!({ "key": key, "name": key, "default_price": price, "category": null, "active": true })
}
