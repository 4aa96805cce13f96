use serde_json::Value;

use crate::database::{EntityStore, Mutation};
use crate::entity::{Actor, Entity, Row};
use crate::error::ApiError;
use crate::filter::{Filter, SqlParams, SqlResult};
use crate::scope::{Predicate, QuerySpec, ScopeError, ScopeRoot};

/// The company's currently selected form template, optionally of one type
pub async fn selected_template(
    store: &dyn EntityStore,
    actor: &Actor,
    template_type: Option<&str>,
) -> Result<Option<Row>, ApiError> {
    let company_id = actor.company_id.ok_or(ScopeError::ActorWithoutCompany)?;
    let table = Entity::FormTemplate.table();
    let mut spec = QuerySpec::new(Entity::FormTemplate, ScopeRoot::Company(company_id))
        .with_predicate(Predicate::eq(table, "company_id", company_id))
        .with_predicate(Predicate::eq(table, "selected", true));
    if let Some(template_type) = template_type {
        spec = spec.with_predicate(Predicate::eq(table, "type", template_type));
    }
    Ok(store.fetch_first(&Filter::new(spec).to_sql()?).await?)
}

/// Id of the jobcard lifecycle template used by step filtering
pub async fn jobcard_template_id(store: &dyn EntityStore, actor: &Actor) -> Result<i64, ApiError> {
    selected_template(store, actor, Some("jobcard"))
        .await?
        .and_then(|row| row.get("id").and_then(Value::as_i64))
        .ok_or_else(|| ScopeError::TemplateNotSelected.into())
}

/// `[{count, step}]` allocations per step of a template
pub async fn stage_counts(store: &dyn EntityStore, template_id: i64) -> Result<Vec<Value>, ApiError> {
    let mut params = SqlParams::new();
    let template = params.push(Value::from(template_id));
    let sql = SqlResult::new(
        format!(
            "SELECT jsonb_build_object('count', COUNT(\"step\"), 'step', \"step\") AS row FROM \"{}\" WHERE \"form_template_id\" = {} GROUP BY \"step\"",
            Entity::FormAllocation.table(),
            template
        ),
        params.into_values(),
    );
    Ok(store.fetch_rows(&sql).await?.into_iter().map(Value::Object).collect())
}

/// Lifecycle allocations of one jobcard, oldest first
pub fn jobcard_lifecycle_spec(jobcard_id: i64) -> QuerySpec {
    let table = Entity::FormAllocation.table();
    QuerySpec::new(Entity::FormAllocation, ScopeRoot::Related)
        .with_predicate(Predicate::eq(table, "trackable_type", Entity::Jobcard.morph_type()))
        .with_predicate(Predicate::eq(table, "trackable_id", jobcard_id))
}

/// Move every lifecycle allocation of a jobcard to `next_step`
pub fn advance_lifecycle(jobcard_id: i64, template: &Value, next_step: &Value) -> Result<SqlResult, ApiError> {
    let mut values = Row::new();
    values.insert("template".to_string(), Value::String(serde_json::to_string(template)?));
    values.insert("step".to_string(), next_step.clone());
    Ok(Mutation::update(Entity::FormAllocation, &values, jobcard_lifecycle_spec(jobcard_id).predicates())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use serde_json::json;

    #[tokio::test]
    async fn missing_template_is_a_query_error() {
        let store = RecordingStore::default();
        let err = jobcard_template_id(&store, &Actor::new(1, Some(3), Some(2))).await.unwrap_err();
        assert!(matches!(err, ApiError::Query(_)));
        let sql = &store.statements()[0];
        assert!(sql.query.contains("\"form_templates\".\"selected\" = $2"));
        assert_eq!(sql.params, vec![json!(2), json!(true), json!("jobcard")]);
    }

    #[test]
    fn advance_targets_jobcard_allocations() {
        let sql = advance_lifecycle(5, &json!({ "steps": [] }), &json!("closed")).unwrap();
        assert!(sql.query.starts_with("UPDATE \"form_allocations\""));
        assert_eq!(sql.params[1], json!("jobcard"));
        assert_eq!(sql.params[2], json!(5));
    }
}
