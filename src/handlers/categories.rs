use axum::extract::{Query, State};
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult, Page, RequestParams};
use crate::app::AppState;
use crate::entity::Entity;
use crate::scope::QuerySpec;
use crate::services::listing;

/// GET /api/categories - Shared lookup table, not owned by any tenant
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page> {
    let params = RequestParams::from(query);
    let page = listing::list(state.store.as_ref(), QuerySpec::unrestricted(Entity::Category), &params, &[]).await?;
    Ok(ApiResponse::success(page))
}
