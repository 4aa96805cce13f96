use axum::extract::{Path, Query, State};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult, Page, RequestParams};
use crate::app::AppState;
use crate::database::Mutation;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::filter::TrashedState;
use crate::scope::{relation_spec, Predicate, JOBCARD_CONTRACTORS_TABLE};
use crate::services::listing;

const CONTRACTORS: &str = "contractorsList";

/// GET /api/jobcards/:id/contractors - Contractor companies linked to the jobcard,
/// with the pivot keys under `pivot`
pub async fn contractors(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page> {
    let params = RequestParams::from(query);
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    let relation = Entity::Jobcard
        .def()
        .relation(CONTRACTORS)
        .ok_or_else(|| ApiError::internal("Jobcards have no contractor relation"))?;
    let spec = relation_spec(Entity::Jobcard, relation, vec![Value::from(id)])
        .with_order_join(JOBCARD_CONTRACTORS_TABLE);

    let page = listing::list(store, spec, &params, &[]).await?;
    Ok(ApiResponse::success(page))
}

/// DELETE /api/jobcards/:id/client - Detach the client
pub async fn remove_client(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    store.execute(&Mutation::clear_column(Entity::Jobcard, id, "client_id")?).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/jobcards/:id/contractors/:contractor_id - Detach one contractor
pub async fn remove_contractor(
    State(state): State<AppState>,
    Path((id, contractor_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    let store = state.store.as_ref();
    listing::find(store, Entity::Jobcard, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    let detach = Mutation::delete_where(
        JOBCARD_CONTRACTORS_TABLE,
        &[
            Predicate::eq(JOBCARD_CONTRACTORS_TABLE, "jobcard_id", id),
            Predicate::eq(JOBCARD_CONTRACTORS_TABLE, "contractor_id", contractor_id),
        ],
    )?;
    store.execute(&detach).await?;
    Ok(ApiResponse::no_content())
}
