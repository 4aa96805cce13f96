use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult, RequestParams};
use crate::app::AppState;
use crate::connections::expand;
use crate::entity::{Entity, Row};
use crate::error::ApiError;
use crate::filter::{Filter, TrashedState};
use crate::services::{lifecycle, listing};

use super::is_blank;

/// GET /api/jobcards/:id/lifecycle - The jobcard's first lifecycle allocation
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Row> {
    let params = RequestParams::from(query);
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    let mut filter = Filter::new(lifecycle::jobcard_lifecycle_spec(id));
    filter.order("id asc")?.paginate(Some(1), Some(1))?;
    let row = store.fetch_first(&filter.to_sql()?).await?.ok_or(ApiError::NoResource)?;

    let mut rows = [row];
    expand(store, Entity::FormAllocation, &mut rows, &params.connections()).await?;
    let [row] = rows;
    Ok(ApiResponse::success(row))
}

/// PUT /api/jobcards/:id/lifecycle - Store the edited template and move the
/// jobcard to `nextStep`
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Vec<Row>> {
    if is_blank(body.get("template")) {
        return Err(ApiError::unprocessable("Include the updated lifecycle"));
    }
    if is_blank(body.get("nextStep")) {
        return Err(ApiError::unprocessable("Include the next lifecycle step"));
    }

    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    let updated = store
        .execute(&lifecycle::advance_lifecycle(id, &body["template"], &body["nextStep"])?)
        .await?;
    if updated == 0 {
        return Err(ApiError::NoResource);
    }

    let mut filter = Filter::new(lifecycle::jobcard_lifecycle_spec(id));
    filter.order("id asc")?;
    let rows = store.fetch_rows(&filter.to_sql()?).await?;
    Ok(ApiResponse::success(rows))
}
