//! The pipeline every list and show endpoint shares:
//! scope → filter → count and page → eager loads.

use tracing::debug;

use crate::api::{Page, RequestParams};
use crate::connections::expand;
use crate::database::EntityStore;
use crate::entity::{Entity, Row};
use crate::error::ApiError;
use crate::filter::{Filter, TrashedState};
use crate::scope::QuerySpec;

/// Run a scoped listing. `scope_keys` are the query-string keys the endpoint
/// consumed for scope resolution.
pub async fn list(
    store: &dyn EntityStore,
    spec: QuerySpec,
    params: &RequestParams,
    scope_keys: &[&str],
) -> Result<Page, ApiError> {
    let entity = spec.entity();
    let mut filter = Filter::new(spec);
    filter.trashed(params.trashed());
    filter.assign(params.filter_data(scope_keys)?)?;
    let pagination = filter
        .pagination()
        .ok_or_else(|| ApiError::internal("Listing filter was not paginated"))?;

    if filter.spec().is_empty_scope() {
        debug!("Empty scope for {}, skipping query", entity.table());
        return Ok(Page::empty(pagination));
    }

    let total = store.fetch_count(&filter.to_count_sql()?).await?;
    let mut rows = if total > 0 { store.fetch_rows(&filter.to_sql()?).await? } else { vec![] };

    expand(store, entity, &mut rows, &params.connections()).await?;
    Ok(Page::new(rows, pagination, total))
}

/// Load one row by id, without connections
pub async fn find(
    store: &dyn EntityStore,
    entity: Entity,
    id: i64,
    trashed: TrashedState,
) -> Result<Option<Row>, ApiError> {
    let mut filter = Filter::new(QuerySpec::record(entity, id));
    filter.trashed(trashed);
    Ok(store.fetch_first(&filter.to_sql()?).await?)
}

/// Load one row by id honoring the trashed flags, then its connections
pub async fn show(
    store: &dyn EntityStore,
    entity: Entity,
    id: i64,
    params: &RequestParams,
) -> Result<Option<Row>, ApiError> {
    let Some(row) = find(store, entity, id, params.trashed()).await? else {
        return Ok(None);
    };

    let mut rows = [row];
    expand(store, entity, &mut rows, &params.connections()).await?;
    let [row] = rows;
    Ok(Some(row))
}
