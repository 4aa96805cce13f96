use axum::extract::{Query, State};
use axum::Extension;
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult, Page, RequestParams};
use crate::app::AppState;
use crate::entity::Actor;
use crate::scope::{resolve_directory, Association, DirectoryKind, DirectorySelector, DirectoryType};
use crate::services::listing;

/// Query-string keys consumed by the directory selector
const SCOPE_KEYS: &[&str] = &["association", "kind", "type"];

/// GET /api/directory - Clients and suppliers listed by the actor's company or branch
pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page> {
    let params = RequestParams::from(query);
    let selector = DirectorySelector {
        association: Association::parse(params.get("association")),
        kind: DirectoryKind::parse(params.get("kind")),
        listing_type: DirectoryType::parse(params.get("type")),
    };

    let spec = resolve_directory(&actor, &selector)?;
    let page = listing::list(state.store.as_ref(), spec, &params, SCOPE_KEYS).await?;
    Ok(ApiResponse::success(page))
}
