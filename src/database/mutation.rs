//! INSERT / UPDATE / DELETE statements for catalog entities.
//!
//! Values travel as one JSONB document and are spread over the table's own
//! column types with `jsonb_populate_record`, so a date or numeric column
//! never sees a text-typed parameter.

use chrono::Utc;
use serde_json::Value;

use crate::entity::{Entity, Row};
use crate::filter::error::FilterError;
use crate::filter::types::{qualified, quote_ident, SqlParams, SqlResult};
use crate::scope::query::row_json;
use crate::scope::Predicate;

pub struct Mutation;

impl Mutation {
    /// `INSERT ... RETURNING to_jsonb(..) AS row`, stamping both timestamps
    pub fn insert(entity: Entity, values: &Row) -> Result<SqlResult, FilterError> {
        Self::insert_returning(entity.table(), values, row_json(entity)?)
    }

    /// Insert into any table, including audit tables outside the catalog
    pub fn insert_into(table: &str, values: &Row) -> Result<SqlResult, FilterError> {
        let returning = format!("to_jsonb({}.*)", quote_ident(table)?);
        Self::insert_returning(table, values, returning)
    }

    fn insert_returning(table: &str, values: &Row, returning: String) -> Result<SqlResult, FilterError> {
        let table = quote_ident(table)?;
        let mut values = values.clone();
        let now = Value::String(Utc::now().to_rfc3339());
        values.entry("created_at").or_insert_with(|| now.clone());
        values.entry("updated_at").or_insert(now);

        let columns = Self::column_list(&values)?;
        let mut params = SqlParams::new();
        let document = params.push(Value::Object(values));

        let query = format!(
            "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, {document}) RETURNING {returning} AS row"
        );
        Ok(SqlResult::new(query, params.into_values()))
    }

    /// Update every row matching `predicates`, refreshing `updated_at`
    pub fn update(entity: Entity, values: &Row, predicates: &[Predicate]) -> Result<SqlResult, FilterError> {
        let table = quote_ident(entity.table())?;
        let mut values = values.clone();
        values.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));

        let columns = Self::column_list(&values)?;
        let mut params = SqlParams::new();
        let document = params.push(Value::Object(values));
        let where_clause = Self::where_clause(predicates, &mut params)?;

        let query = format!(
            "UPDATE {table} SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, {document})){where_clause}"
        );
        Ok(SqlResult::new(query, params.into_values()))
    }

    pub fn update_by_id(entity: Entity, id: i64, values: &Row) -> Result<SqlResult, FilterError> {
        Self::update(entity, values, &[Predicate::eq(entity.table(), "id", id)])
    }

    /// Like [`Mutation::update_by_id`], but trashed rows are left untouched
    pub fn update_active_by_id(entity: Entity, id: i64, values: &Row) -> Result<SqlResult, FilterError> {
        let mut predicates = vec![Predicate::eq(entity.table(), "id", id)];
        if entity.def().soft_deletes {
            predicates.push(Predicate::eq(entity.table(), "deleted_at", Value::Null));
        }
        Self::update(entity, values, &predicates)
    }

    /// Set a single column to NULL
    pub fn clear_column(entity: Entity, id: i64, column: &str) -> Result<SqlResult, FilterError> {
        let table = quote_ident(entity.table())?;
        let mut params = SqlParams::new();
        let id_param = params.push(Value::from(id));
        let query = format!(
            "UPDATE {table} SET {} = NULL, \"updated_at\" = NOW() WHERE {} = {}",
            quote_ident(column)?,
            qualified(entity.table(), "id")?,
            id_param
        );
        Ok(SqlResult::new(query, params.into_values()))
    }

    /// Trash a soft-deleting row, or remove it when `permanent`
    pub fn delete(entity: Entity, id: i64, permanent: bool) -> Result<SqlResult, FilterError> {
        let predicate = [Predicate::eq(entity.table(), "id", id)];
        if permanent || !entity.def().soft_deletes {
            return Self::delete_where(entity.table(), &predicate);
        }
        let table = quote_ident(entity.table())?;
        let mut params = SqlParams::new();
        let where_clause = Self::where_clause(&predicate, &mut params)?;
        Ok(SqlResult::new(
            format!("UPDATE {table} SET \"deleted_at\" = NOW(){where_clause}"),
            params.into_values(),
        ))
    }

    /// Hard delete from any table, including pivots outside the catalog
    pub fn delete_where(table: &str, predicates: &[Predicate]) -> Result<SqlResult, FilterError> {
        let mut params = SqlParams::new();
        let where_clause = Self::where_clause(predicates, &mut params)?;
        Ok(SqlResult::new(format!("DELETE FROM {}{}", quote_ident(table)?, where_clause), params.into_values()))
    }

    fn column_list(values: &Row) -> Result<String, FilterError> {
        if values.is_empty() {
            return Err(FilterError::InvalidColumn("No columns to write".to_string()));
        }
        let quoted: Result<Vec<String>, FilterError> = values.keys().map(|k| quote_ident(k)).collect();
        Ok(quoted?.join(", "))
    }

    fn where_clause(predicates: &[Predicate], params: &mut SqlParams) -> Result<String, FilterError> {
        // Unbounded writes are never intended here
        if predicates.is_empty() {
            return Err(FilterError::InvalidWhereClause("Refusing to write without a WHERE clause".to_string()));
        }
        let rendered: Result<Vec<String>, FilterError> = predicates.iter().map(|p| p.render(params)).collect();
        Ok(format!(" WHERE {}", rendered?.join(" AND ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn insert_populates_from_one_document() {
        let sql = Mutation::insert(Entity::Invoice, &row(json!({ "heading": "Quote" }))).unwrap();
        assert!(sql.query.starts_with("INSERT INTO \"invoices\" ("));
        assert!(sql.query.contains("jsonb_populate_record(NULL::\"invoices\", $1)"));
        assert!(sql.query.ends_with("RETURNING to_jsonb(\"invoices\".*) AS row"));
        assert_eq!(sql.params.len(), 1);
        assert_eq!(sql.params[0]["heading"], json!("Quote"));
        assert!(sql.params[0].get("created_at").is_some());
    }

    #[test]
    fn insert_returns_user_without_credentials() {
        let sql = Mutation::insert(Entity::User, &row(json!({ "first_name": "Ada" }))).unwrap();
        assert!(sql.query.ends_with("RETURNING (to_jsonb(\"users\".*) - 'password' - 'remember_token') AS row"));
    }

    #[test]
    fn update_binds_document_before_predicates() {
        let sql = Mutation::update_by_id(Entity::Jobcard, 4, &row(json!({ "title": "Roof" }))).unwrap();
        assert!(sql.query.ends_with("WHERE \"jobcards\".\"id\" = $2"));
        assert_eq!(sql.params[1], json!(4));
    }

    #[test]
    fn active_update_skips_trashed_rows() {
        let sql = Mutation::update_active_by_id(Entity::Invoice, 4, &row(json!({ "heading": "Quote" }))).unwrap();
        assert!(sql.query.ends_with("WHERE \"invoices\".\"id\" = $2 AND \"invoices\".\"deleted_at\" IS NULL"));
        assert_eq!(sql.params.len(), 2);

        let sql = Mutation::update_active_by_id(Entity::FormAllocation, 4, &row(json!({ "status": "done" }))).unwrap();
        assert!(!sql.query.contains("deleted_at"));
    }

    #[test]
    fn soft_delete_unless_permanent() {
        let soft = Mutation::delete(Entity::Jobcard, 4, false).unwrap();
        assert!(soft.query.starts_with("UPDATE \"jobcards\" SET \"deleted_at\" = NOW()"));
        let hard = Mutation::delete(Entity::Jobcard, 4, true).unwrap();
        assert!(hard.query.starts_with("DELETE FROM \"jobcards\""));
    }

    #[test]
    fn rejects_unsafe_column_names() {
        let values = row(json!({ "title = 'x'; --": 1 }));
        assert!(Mutation::update_by_id(Entity::Jobcard, 1, &values).is_err());
        assert!(Mutation::delete_where("jobcard_contractors", &[]).is_err());
    }
}
