//! # fmg-server
//!
//! The hub's server-side handlers: project submission fan-out, owner
//! bootstrap and meeting scheduling. Everything else the apps do talks to the
//! hosted backend directly.

pub mod caller;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use fmg_auth::AuthApi;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Build the router with all routes mounted.
pub fn build_router<A: AuthApi>(state: AppState<A>) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/projects/submit", post(routes::submit_project::<A>))
        .route("/api/owner/bootstrap", post(routes::bootstrap_owner::<A>))
        .route("/api/meetings/google", post(routes::create_google_meeting::<A>))
        .route("/api/meetings/zoom", post(routes::create_zoom_meeting::<A>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
