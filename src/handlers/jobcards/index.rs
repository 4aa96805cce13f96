use axum::extract::{Query, State};
use axum::Extension;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::{ApiResponse, ApiResult, Page, RequestParams};
use crate::app::AppState;
use crate::entity::Actor;
use crate::error::ApiError;
use crate::scope::{apply_step, parse_model_id, resolve_jobcards, JobcardModel, JobcardSelector, ScopeError};
use crate::services::{lifecycle, listing};

/// Query-string keys consumed by the jobcard selector
const SCOPE_KEYS: &[&str] = &["model", "modelId", "step"];

/// GET /api/jobcards - Jobcards of the actor's company, branch or a third party,
/// optionally narrowed to one lifecycle step
pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page> {
    let params = RequestParams::from(query);
    let selector = JobcardSelector {
        model: JobcardModel::parse(params.get("model")),
        model_id: parse_model_id(params.get("modelId")),
        step: params.get("step").map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
    };

    let mut spec = resolve_jobcards(&actor, &selector)?;
    if let Some(step) = &selector.step {
        let template_id = lifecycle::jobcard_template_id(state.store.as_ref(), &actor).await?;
        spec = apply_step(spec, template_id, step);
    }

    let page = listing::list(state.store.as_ref(), spec, &params, SCOPE_KEYS).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/jobcards/lifecycle-stages - Allocation counts per step of the
/// company's selected template
pub async fn lifecycle_stages(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let template = lifecycle::selected_template(store, &actor, None)
        .await?
        .ok_or(ApiError::from(ScopeError::TemplateNotSelected))?;
    let template_id = template
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::internal("Form template row has no id"))?;

    let allocations = lifecycle::stage_counts(store, template_id).await?;
    let template = template.get("form_template").cloned().unwrap_or(Value::Null);
    Ok(ApiResponse::success(json!({ "template": template, "allocations": allocations })))
}
