//! Router behaviour through `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use common::{CLIENT_TOKEN, NEWCOMER_TOKEN, STAFF_TOKEN, project_row, service_row, test_state};
use fmg_server::build_router;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn post(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn submission(total: u64) -> Value {
    json!({
        "title": "Debut EP",
        "service_keys": ["mixing", "mastering"],
        "start_date": "2026-03-01",
        "deadline": "2026-04-01",
        "milestones": [{"title": "Rough mix", "due_date": "2026-03-15"}],
        "reference_links": [{"url": "https://example.com/ref"}],
        "payment_plan": {"kind": "split"},
        "total_amount": total
    })
}

fn meeting_request(project_id: &str) -> Value {
    json!({
        "project_id": project_id,
        "topic": "Kickoff",
        "starts_at": "2026-03-02T09:00:00Z",
        "duration_minutes": 30
    })
}

#[tokio::test]
async fn health_reports_service() {
    let (state, _) = test_state().await;
    let resp = build_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fmg-server");
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let (state, _) = test_state().await;
    let resp = build_router(state)
        .oneshot(post("/api/projects/submit", None, &submission(300)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["error"], "missing bearer token");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (state, _) = test_state().await;
    let resp = build_router(state)
        .oneshot(post("/api/owner/bootstrap", Some("forged"), &json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submission_fans_out_and_returns_created() {
    let (state, db) = test_state().await;
    db.seed("services", vec![service_row("mixing", 100), service_row("mastering", 200)]);

    let resp = build_router(state)
        .oneshot(post("/api/projects/submit", Some(CLIENT_TOKEN), &submission(300)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["total_amount"], 300);
    assert_eq!(body["milestones"], 1);
    assert_eq!(body["payment_rows"], 2);
    assert_eq!(body["reference_links"], 1);

    let projects = db.rows("projects");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["client_id"], "usr-client");
    assert_eq!(projects[0]["stage"], "submitted");
    assert_eq!(db.rows("payment_schedules").len(), 2);
}

#[tokio::test]
async fn submission_with_wrong_total_is_bad_request() {
    let (state, db) = test_state().await;
    db.seed("services", vec![service_row("mixing", 100), service_row("mastering", 200)]);

    let resp = build_router(state)
        .oneshot(post("/api/projects/submit", Some(CLIENT_TOKEN), &submission(1)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = json_body(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("does not match"), "{error}");
    assert!(db.rows("projects").is_empty());
}

#[tokio::test]
async fn malformed_submission_is_bad_request() {
    let (state, _) = test_state().await;
    let resp = build_router(state)
        .oneshot(post("/api/projects/submit", Some(CLIENT_TOKEN), &json!({"title": 3})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn failed_fan_out_is_internal_and_names_stage() {
    let (state, db) = test_state().await;
    db.seed("services", vec![service_row("mixing", 100), service_row("mastering", 200)]);
    db.fail_inserts_into("reference_links");

    let resp = build_router(state)
        .oneshot(post("/api/projects/submit", Some(CLIENT_TOKEN), &submission(300)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("reference_links"), "{error}");
    assert_eq!(db.rows("projects").len(), 1);
}

#[tokio::test]
async fn first_bootstrap_promotes_caller_and_second_conflicts() {
    let (state, db) = test_state().await;
    db.seed("profiles", vec![common::profile_row("usr-new", "client")]);
    let app = build_router(state);

    let first = app
        .clone()
        .oneshot(post("/api/owner/bootstrap", Some(NEWCOMER_TOKEN), &json!({})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await, json!({"user_id": "usr-new", "role": "owner"}));

    let second = app
        .oneshot(post("/api/owner/bootstrap", Some(STAFF_TOKEN), &json!({})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let staff = db
        .rows("profiles")
        .into_iter()
        .find(|p| p["id"] == "usr-staff")
        .unwrap();
    assert_eq!(staff["role"], "staff");
}

#[tokio::test]
async fn concurrent_bootstraps_promote_exactly_one_owner() {
    let (state, db) = test_state().await;
    db.seed("profiles", vec![common::profile_row("usr-new", "client")]);
    let app = build_router(state);

    let (a, b) = tokio::join!(
        app.clone()
            .oneshot(post("/api/owner/bootstrap", Some(NEWCOMER_TOKEN), &json!({}))),
        app.oneshot(post("/api/owner/bootstrap", Some(CLIENT_TOKEN), &json!({}))),
    );
    let mut statuses = vec![a.unwrap().status(), b.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let owners = db
        .rows("profiles")
        .into_iter()
        .filter(|p| p["role"] == "owner")
        .count();
    assert_eq!(owners, 1);
}

#[tokio::test]
async fn clients_cannot_schedule_meetings() {
    let (state, db) = test_state().await;
    db.seed("projects", vec![project_row("prj-1")]);
    let resp = build_router(state)
        .oneshot(post("/api/meetings/zoom", Some(CLIENT_TOKEN), &meeting_request("prj-1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(db.rows("meetings").is_empty());
}

#[tokio::test]
async fn staff_schedules_zoom_webinar_and_it_is_recorded() {
    let (state, db) = test_state().await;
    db.seed("projects", vec![project_row("prj-1")]);
    let resp = build_router(state)
        .oneshot(post("/api/meetings/zoom", Some(STAFF_TOKEN), &meeting_request("prj-1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["provider"], "zoom");
    assert_eq!(body["join_url"], "https://zoom.us/j/81234567890");

    let meetings = db.rows("meetings");
    assert_eq!(meetings.len(), 1);
    assert_eq!(meetings[0]["id"], body["meeting_id"]);
    assert_eq!(meetings[0]["created_by"], "usr-staff");
    assert_eq!(meetings[0]["project_id"], "prj-1");
}

#[tokio::test]
async fn meeting_for_unknown_project_is_not_found() {
    let (state, db) = test_state().await;
    let resp = build_router(state)
        .oneshot(post("/api/meetings/zoom", Some(STAFF_TOKEN), &meeting_request("prj-missing")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(db.rows("meetings").is_empty());
}

#[tokio::test]
async fn unconfigured_provider_is_unavailable() {
    let (state, db) = test_state().await;
    db.seed("projects", vec![project_row("prj-1")]);
    let resp = build_router(state)
        .oneshot(post("/api/meetings/google", Some(STAFF_TOKEN), &meeting_request("prj-1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(resp).await["error"], "google is not configured");
}
