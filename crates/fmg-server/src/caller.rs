//! Bearer-token caller extraction.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use fmg_auth::AuthApi;
use fmg_core::enums::Role;
use fmg_core::identity::AuthIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// # Errors
///
/// Returns 403 for client accounts.
pub fn require_staff(caller: &AuthIdentity) -> Result<(), ApiError> {
    if caller.is_staff_side() {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "role {} may not perform this action",
            caller.role
        )))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the bearer token with the auth service, then reads the role from
/// the caller's profile row. A user without a profile row is a client.
#[async_trait]
impl<A: AuthApi> FromRequestParts<AppState<A>> for AuthIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<A>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let user = state.auth.get_user(token).await?;
        let role = state
            .backend
            .get_profile(&user.id)
            .await?
            .map_or(Role::Client, |profile| profile.role);
        tracing::debug!(user_id = %user.id, %role, "caller resolved");
        Ok(Self {
            user_id: user.id,
            email: user.email,
            role,
        })
    }
}
