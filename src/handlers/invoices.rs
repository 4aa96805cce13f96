use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::activity::{record_quietly, Activity};
use crate::api::{ApiResponse, ApiResult, Page, RequestParams};
use crate::app::AppState;
use crate::database::Mutation;
use crate::entity::invoice::{reference_number, InvoicePayload, Trackable};
use crate::entity::{Actor, Entity, Row};
use crate::error::ApiError;
use crate::filter::TrashedState;
use crate::scope::{resolve_invoices, InvoiceModel, InvoiceSelector};
use crate::services::listing;

const SCOPE_KEYS: &[&str] = &["model", "modelId"];

/// Body of invoice create and update
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceRequest {
    pub invoice: Option<InvoicePayload>,
    pub model: Option<String>,
    #[serde(rename = "modelId")]
    pub model_id: Option<Value>,
}

impl InvoiceRequest {
    fn trackable(&self) -> Trackable {
        let model_id = match &self.model_id {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Trackable {
            model: self.model.clone().filter(|m| !m.is_empty()),
            model_id,
        }
    }
}

/// GET /api/invoices - Invoices of the actor's company or branch
pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page> {
    let params = RequestParams::from(query);
    let selector = InvoiceSelector { model: InvoiceModel::parse(params.get("model")) };

    let spec = resolve_invoices(&actor, &selector)?;
    let page = listing::list(state.store.as_ref(), spec, &params, SCOPE_KEYS).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/invoices/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Row> {
    let params = RequestParams::from(query);
    let row = listing::show(state.store.as_ref(), Entity::Invoice, id, &params)
        .await?
        .ok_or(ApiError::NoResource)?;
    Ok(ApiResponse::success(row))
}

/// POST /api/invoices - Create an invoice and number it after its id
pub async fn store(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<InvoiceRequest>,
) -> ApiResult<Row> {
    let payload = request
        .invoice
        .as_ref()
        .ok_or_else(|| ApiError::unprocessable("Include the invoice"))?;
    let columns = payload.to_columns(&request.trackable(), &actor)?;

    let store = state.store.as_ref();
    let activities = state.activities.as_ref();
    let inserted = match store.fetch_first(&Mutation::insert(Entity::Invoice, &columns)?).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            record_quietly(activities, &actor, Activity::failure("invoice creation failed")).await;
            return Err(ApiError::query("Insert returned no row"));
        }
        Err(e) => {
            tracing::error!(actor_id = actor.id, "Invoice insert failed: {}", e);
            record_quietly(activities, &actor, Activity::failure("invoice creation failed")).await;
            return Err(e.into());
        }
    };

    let id = inserted
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::internal("Inserted invoice has no id"))?;

    let mut numbering = Row::new();
    numbering.insert("reference_no_value".to_string(), Value::String(reference_number(id)));
    store.execute(&Mutation::update_by_id(Entity::Invoice, id, &numbering)?).await?;

    let invoice = listing::find(store, Entity::Invoice, id, TrashedState::WithTrashed)
        .await?
        .ok_or(ApiError::NoResource)?;

    tracing::info!(invoice_id = id, actor_id = actor.id, "Invoice created");
    record_quietly(activities, &actor, Activity::on(Entity::Invoice, id, "created", &invoice)).await;
    record_quietly(activities, &actor, Activity::on(Entity::Invoice, id, "authourized", &invoice)).await;

    Ok(ApiResponse::created(invoice))
}

/// PUT /api/invoices/:id - Replace the invoice document
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<InvoiceRequest>,
) -> ApiResult<Row> {
    let payload = request.invoice.as_ref().ok_or(ApiError::NoResource)?;
    let columns = payload.to_columns(&request.trackable(), &actor)?;

    let store = state.store.as_ref();
    let activities = state.activities.as_ref();
    let updated = store.execute(&Mutation::update_active_by_id(Entity::Invoice, id, &columns)?).await?;
    if updated == 0 {
        record_quietly(activities, &actor, Activity::failure("invoice update failed")).await;
        return Err(ApiError::NoResource);
    }

    let invoice = listing::find(store, Entity::Invoice, id, TrashedState::Active)
        .await?
        .ok_or(ApiError::NoResource)?;

    record_quietly(activities, &actor, Activity::on(Entity::Invoice, id, "updated", &invoice)).await;
    record_quietly(activities, &actor, Activity::on(Entity::Invoice, id, "authourized", &invoice)).await;

    Ok(ApiResponse::success(invoice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trackable_accepts_numeric_strings() {
        let request: InvoiceRequest =
            serde_json::from_value(json!({ "invoice": {}, "model": "jobcard", "modelId": "12" })).unwrap();
        assert_eq!(request.trackable(), Trackable { model: Some("jobcard".into()), model_id: Some(12) });

        let request: InvoiceRequest = serde_json::from_value(json!({ "modelId": 4 })).unwrap();
        assert_eq!(request.trackable().model_id, Some(4));
        assert!(request.invoice.is_none());
    }
}
