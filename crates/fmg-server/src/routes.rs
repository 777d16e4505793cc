use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use fmg_auth::AuthApi;
use fmg_backend::NewMeeting;
use fmg_core::enums::Role;
use fmg_core::identity::AuthIdentity;
use fmg_core::responses::{
    BootstrapResponse, HealthResponse, MeetingCreatedResponse, MeetingRequest, SubmissionResponse,
};
use fmg_core::submission::ProjectSubmission;
use fmg_meetings::{MeetingError, MeetingScheduler, validate_request};

use crate::caller::require_staff;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

type Payload<T> = Result<Json<T>, JsonRejection>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: "fmg-server".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// `POST /api/projects/submit`
pub async fn submit_project<A: AuthApi>(
    State(state): State<AppState<A>>,
    caller: AuthIdentity,
    payload: Payload<ProjectSubmission>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let Json(submission) = payload?;
    let created = state.backend.submit_project(&caller.user_id, &submission).await?;
    tracing::info!(
        project_id = %created.project_id,
        client_id = %caller.user_id,
        total = created.total_amount,
        "project submitted"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/owner/bootstrap`
///
/// Promotes the caller to owner while the studio has none. The count and the
/// promotion run under `bootstrap_lock`; across server instances the database must
/// carry a unique partial index on `profiles (role) where role = 'owner'`.
pub async fn bootstrap_owner<A: AuthApi>(
    State(state): State<AppState<A>>,
    caller: AuthIdentity,
) -> ApiResult<Json<BootstrapResponse>> {
    let _guard = state.bootstrap_lock.lock().await;
    if state.backend.count_owners().await? > 0 {
        return Err(ApiError::conflict("an owner already exists"));
    }
    let profile = state.backend.set_role(&caller.user_id, Role::Owner).await?;
    tracing::warn!(user_id = %profile.id, "owner bootstrapped");
    Ok(Json(BootstrapResponse {
        user_id: profile.id,
        role: profile.role,
    }))
}

/// `POST /api/meetings/google`
pub async fn create_google_meeting<A: AuthApi>(
    State(state): State<AppState<A>>,
    caller: AuthIdentity,
    payload: Payload<MeetingRequest>,
) -> ApiResult<(StatusCode, Json<MeetingCreatedResponse>)> {
    let scheduler = state.google.clone();
    schedule(&state, &caller, scheduler.as_deref(), "google", payload).await
}

/// `POST /api/meetings/zoom`
pub async fn create_zoom_meeting<A: AuthApi>(
    State(state): State<AppState<A>>,
    caller: AuthIdentity,
    payload: Payload<MeetingRequest>,
) -> ApiResult<(StatusCode, Json<MeetingCreatedResponse>)> {
    let scheduler = state.zoom.clone();
    schedule(&state, &caller, scheduler.as_deref(), "zoom", payload).await
}

async fn schedule<A: AuthApi, S: MeetingScheduler>(
    state: &AppState<A>,
    caller: &AuthIdentity,
    scheduler: Option<&S>,
    name: &'static str,
    payload: Payload<MeetingRequest>,
) -> ApiResult<(StatusCode, Json<MeetingCreatedResponse>)> {
    require_staff(caller)?;
    let Json(request) = payload?;
    validate_request(&request)?;
    let scheduler = scheduler.ok_or(MeetingError::NotConfigured(name))?;

    // 404 before anything is created on the provider.
    state.backend.get_project(&request.project_id).await?;

    let meeting = scheduler.create_meeting(&request).await?;
    let recorded = state
        .backend
        .record_meeting(&NewMeeting {
            project_id: request.project_id.clone(),
            provider: meeting.provider,
            topic: request.topic.trim().to_string(),
            starts_at: request.starts_at,
            duration_minutes: request.duration_minutes,
            join_url: meeting.join_url.clone(),
            created_by: caller.user_id.clone(),
        })
        .await?;
    tracing::info!(
        meeting_id = %recorded.id,
        project_id = %request.project_id,
        provider = %meeting.provider,
        external_id = %meeting.external_id,
        "meeting scheduled"
    );
    Ok((
        StatusCode::CREATED,
        Json(MeetingCreatedResponse {
            meeting_id: recorded.id,
            join_url: meeting.join_url,
            provider: meeting.provider,
        }),
    ))
}
