//! Eager loading of related rows requested through `connections`.

pub mod graph;

pub use graph::{ConnectionGraph, ConnectionNode};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::database::{DatabaseError, EntityStore};
use crate::entity::{Entity, RelationDef, RelationKind, Row};
use crate::filter::error::FilterError;
use crate::filter::Filter;
use crate::scope::relation_spec;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Call to undefined relationship [{relation}] on model [{entity}]")]
    UnknownRelation { entity: &'static str, relation: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Attach every relation in `graph` to every row, one batched query per
/// relation and level. A no-op when either side is empty.
pub fn expand<'a>(
    store: &'a dyn EntityStore,
    entity: Entity,
    rows: &'a mut [Row],
    graph: &'a ConnectionGraph,
) -> BoxFuture<'a, Result<(), ConnectionError>> {
    async move {
        if rows.is_empty() || graph.is_empty() {
            return Ok(());
        }
        for node in graph.nodes() {
            let relation = entity.def().relation(&node.name).ok_or_else(|| ConnectionError::UnknownRelation {
                entity: entity.table(),
                relation: node.name.clone(),
            })?;
            load_relation(store, entity, rows, relation, &node.children).await?;
        }
        Ok(())
    }
    .boxed()
}

async fn load_relation(
    store: &dyn EntityStore,
    parent: Entity,
    rows: &mut [Row],
    relation: &'static RelationDef,
    children: &ConnectionGraph,
) -> Result<(), ConnectionError> {
    let parent_column = match relation.kind {
        RelationKind::BelongsTo { foreign_key } => foreign_key,
        _ => "id",
    };
    let keys = distinct_keys(rows, parent_column);

    let mut related = if keys.is_empty() {
        vec![]
    } else {
        let sql = Filter::new(relation_spec(parent, relation, keys)).to_sql()?;
        store.fetch_rows(&sql).await?
    };
    debug!("Loaded {} {} rows for {}", related.len(), relation.name, parent.table());

    expand(store, relation.target, &mut related, children).await?;

    let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
    for row in related {
        if let Some(key) = related_key(relation, &row) {
            grouped.entry(key).or_default().push(Value::Object(row));
        }
    }

    for row in rows.iter_mut() {
        let matches = row.get(parent_column).and_then(key_of).and_then(|k| grouped.get(&k));
        let value = if relation.is_single() {
            matches.and_then(|m| m.first().cloned()).unwrap_or(Value::Null)
        } else {
            Value::Array(matches.cloned().unwrap_or_default())
        };
        row.insert(relation.name.to_string(), value);
    }
    Ok(())
}

/// Column of a loaded related row that points back at its parent
fn related_key(relation: &RelationDef, row: &Row) -> Option<String> {
    let value = match relation.kind {
        RelationKind::BelongsTo { .. } => row.get("id"),
        RelationKind::HasMany { foreign_key } => row.get(foreign_key),
        RelationKind::BelongsToMany { parent_key, .. } => row.get("pivot").and_then(|p| p.get(parent_key)),
        RelationKind::MorphMany => row.get("trackable_id"),
    };
    value.and_then(key_of)
}

/// Ids may come back as numbers or numeric strings depending on the column
fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn distinct_keys(rows: &[Row], column: &str) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .filter_map(|row| row.get(column))
        .filter(|v| key_of(v).map(|k| seen.insert(k)).unwrap_or(false))
        .cloned()
        .collect()
}
