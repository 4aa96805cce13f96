//! Audit trail of what actors did, stored in `recent_activities`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::database::{DatabaseError, EntityStore, Mutation};
use crate::entity::{Actor, Entity, Row};

pub const ACTIVITY_TABLE: &str = "recent_activities";

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Row the activity is about; absent when the action failed before one existed
    pub target: Option<(Entity, i64)>,
    pub kind: String,
    pub payload: Value,
}

impl Activity {
    pub fn on(entity: Entity, id: i64, kind: &str, data: &Row) -> Self {
        Self {
            target: Some((entity, id)),
            kind: kind.to_string(),
            payload: json!({ "type": kind, "data": data }),
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            target: None,
            kind: "fail".to_string(),
            payload: json!({ "type": "fail", "message": message }),
        }
    }
}

#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    async fn record(&self, actor: &Actor, activity: Activity) -> Result<(), DatabaseError>;
}

/// Writes activities through the entity store
pub struct StoreActivityRecorder {
    store: Arc<dyn EntityStore>,
}

impl StoreActivityRecorder {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivityRecorder for StoreActivityRecorder {
    async fn record(&self, actor: &Actor, activity: Activity) -> Result<(), DatabaseError> {
        let (trackable_type, trackable_id) = match activity.target {
            Some((entity, id)) => (Value::from(entity.morph_type()), Value::from(id)),
            None => (Value::Null, Value::Null),
        };
        let mut values = Row::new();
        values.insert("trackable_type".into(), trackable_type);
        values.insert("trackable_id".into(), trackable_id);
        values.insert("type".into(), Value::from(activity.kind));
        values.insert("activity".into(), activity.payload);
        values.insert("created_by".into(), Value::from(actor.id));
        values.insert("company_branch_id".into(), actor.company_branch_id.into());
        values.insert("company_id".into(), actor.company_id.into());

        let sql = Mutation::insert_into(ACTIVITY_TABLE, &values)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        self.store.execute(&sql).await?;
        Ok(())
    }
}

/// Record an activity without letting a failure reach the caller
pub async fn record_quietly(recorder: &dyn ActivityRecorder, actor: &Actor, activity: Activity) {
    let kind = activity.kind.clone();
    if let Err(e) = recorder.record(actor, activity).await {
        warn!(actor_id = actor.id, kind = %kind, "Failed to record activity: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;

    #[tokio::test]
    async fn failure_activity_has_no_target() {
        let store = Arc::new(RecordingStore::default());
        let recorder = StoreActivityRecorder::new(store.clone());
        record_quietly(&recorder, &Actor::new(1, Some(3), Some(2)), Activity::failure("invoice creation failed")).await;

        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].query.starts_with("INSERT INTO \"recent_activities\""));
        let document = &statements[0].params[0];
        assert_eq!(document["type"], Value::from("fail"));
        assert_eq!(document["trackable_id"], Value::Null);
        assert_eq!(document["activity"]["message"], Value::from("invoice creation failed"));
    }
}
