use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::activity::{record_quietly, Activity};
use crate::api::{ApiResponse, ApiResult, RequestParams};
use crate::app::AppState;
use crate::database::Mutation;
use crate::entity::jobcard::{fillable_columns, new_jobcard};
use crate::entity::{Actor, Entity, Row};
use crate::error::ApiError;
use crate::filter::TrashedState;
use crate::services::listing;

/// GET /api/jobcards/:id - One jobcard, honoring `withtrashed` / `onlytrashed` and `connections`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Row> {
    let params = RequestParams::from(query);
    let row = listing::show(state.store.as_ref(), Entity::Jobcard, id, &params)
        .await?
        .ok_or(ApiError::NoResource)?;
    Ok(ApiResponse::success(row))
}

/// POST /api/jobcards - Create a jobcard owned by the actor's branch
pub async fn post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<Value>,
) -> ApiResult<Row> {
    let columns = new_jobcard(&body, &actor).map_err(ApiError::unprocessable)?;
    let row = state
        .store
        .fetch_first(&Mutation::insert(Entity::Jobcard, &columns)?)
        .await?
        .ok_or_else(|| ApiError::query("Insert returned no row"))?;

    if let Some(id) = row.get("id").and_then(Value::as_i64) {
        tracing::info!(jobcard_id = id, actor_id = actor.id, "Jobcard created");
        record_quietly(state.activities.as_ref(), &actor, Activity::on(Entity::Jobcard, id, "created", &row)).await;
    }

    Ok(ApiResponse::created(row))
}

/// PUT /api/jobcards/:id - Update fillable columns, even on a trashed jobcard
pub async fn put(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Row> {
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::WithTrashed)
        .await?
        .ok_or(ApiError::NoResource)?;

    let columns = fillable_columns(&body);
    if let Some(Value::String(title)) = columns.get("title") {
        if title.trim().is_empty() {
            return Err(ApiError::unprocessable("The title field is required"));
        }
    }

    store.execute(&Mutation::update_by_id(Entity::Jobcard, id, &columns)?).await?;
    let row = listing::find(store, Entity::Jobcard, id, TrashedState::WithTrashed)
        .await?
        .ok_or(ApiError::NoResource)?;

    record_quietly(state.activities.as_ref(), &actor, Activity::on(Entity::Jobcard, id, "updated", &row)).await;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/jobcards/:id - Trash the jobcard, or remove it for good with `permanent=1`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<()> {
    let params = RequestParams::from(query);
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::WithTrashed)
        .await?
        .ok_or(ApiError::NoResource)?;

    let permanent = params.flag("permanent");
    store.execute(&Mutation::delete(Entity::Jobcard, id, permanent)?).await?;
    tracing::info!(jobcard_id = id, permanent, "Jobcard deleted");
    Ok(ApiResponse::no_content())
}
