use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::entity::Actor;
use crate::error::ApiError;

use super::auth::AuthUser;

/// Resolve the JWT subject to an active user and its branch, and inject the
/// resulting [`Actor`] into the request
pub async fn load_actor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before actor lookup"))?;

    let row = state.store.fetch_first(&Actor::lookup_sql(auth_user.user_id)).await.map_err(|e| {
        tracing::error!("Database error loading actor {}: {}", auth_user.user_id, e);
        ApiError::internal("Failed to validate user")
    })?;

    let actor = row
        .as_ref()
        .and_then(|row| Actor::from_row(row, &auth_user.access))
        .ok_or_else(|| {
            tracing::warn!("Actor lookup failed: user {} not found or inactive", auth_user.user_id);
            ApiError::unauthorized("User is not active")
        })?;

    tracing::debug!(actor_id = actor.id, branch = ?actor.company_branch_id, "Actor loaded");
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}
