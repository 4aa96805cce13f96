use serde_json::Value;

use crate::entity::Entity;
use crate::filter::error::FilterError;
use crate::filter::types::{qualified, quote_ident, SqlParams};

/// Which organizational root a query starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRoot {
    Company(i64),
    Branch(i64),
    Client(i64),
    Contractor(i64),
    /// Rows reached through a relation from a known set of parent rows
    Related,
    /// One row looked up by primary key
    Record(i64),
    Unrestricted,
    /// Nothing can match; the store is never queried
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self { table: table.into(), column: column.into() }
    }

    pub fn render(&self) -> Result<String, FilterError> {
        qualified(&self.table, &self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: ColumnRef, value: Value },
    In { column: ColumnRef, values: Vec<Value> },
    /// `EXISTS (SELECT 1 FROM table WHERE inner = outer AND ...)`
    Exists {
        table: String,
        inner: ColumnRef,
        outer: ColumnRef,
        conditions: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn eq(table: &str, column: &str, value: impl Into<Value>) -> Self {
        Predicate::Eq { column: ColumnRef::new(table, column), value: value.into() }
    }

    pub fn render(&self, params: &mut SqlParams) -> Result<String, FilterError> {
        match self {
            Predicate::Eq { column, value } => {
                if value.is_null() {
                    Ok(format!("{} IS NULL", column.render()?))
                } else {
                    Ok(format!("{} = {}", column.render()?, params.push(value.clone())))
                }
            }
            Predicate::In { column, values } => {
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let placeholders: Vec<String> = values.iter().map(|v| params.push(v.clone())).collect();
                Ok(format!("{} IN ({})", column.render()?, placeholders.join(", ")))
            }
            Predicate::Exists { table, inner, outer, conditions } => {
                let mut parts = vec![format!("{} = {}", inner.render()?, outer.render()?)];
                for condition in conditions {
                    parts.push(condition.render(params)?);
                }
                Ok(format!(
                    "EXISTS (SELECT 1 FROM {} WHERE {})",
                    quote_ident(table)?,
                    parts.join(" AND ")
                ))
            }
        }
    }
}

/// `INNER JOIN table ON left = right AND ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
    pub conditions: Vec<Predicate>,
}

impl Join {
    pub fn render(&self, params: &mut SqlParams) -> Result<String, FilterError> {
        let mut on = vec![format!("{} = {}", self.left.render()?, self.right.render()?)];
        for condition in &self.conditions {
            on.push(condition.render(params)?);
        }
        Ok(format!("INNER JOIN {} ON {}", quote_ident(&self.table)?, on.join(" AND ")))
    }
}

/// What each result row is rendered as
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// `to_jsonb("root".*)` without hidden columns
    Row,
    /// Root row plus a `pivot` object carrying the pivot table's keys
    RowWithPivot { pivot: String, keys: Vec<String> },
}

/// A deferred, immutable description of a scoped query.
///
/// Built once by the scope resolver and passed by value through the
/// filter and the eager-load expander.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    entity: Entity,
    root: ScopeRoot,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    order_join: String,
    selection: Selection,
}

impl QuerySpec {
    pub fn new(entity: Entity, root: ScopeRoot) -> Self {
        Self {
            entity,
            root,
            joins: vec![],
            predicates: vec![],
            order_join: entity.table().to_string(),
            selection: Selection::Row,
        }
    }

    pub fn unrestricted(entity: Entity) -> Self {
        Self::new(entity, ScopeRoot::Unrestricted)
    }

    pub fn empty(entity: Entity) -> Self {
        Self::new(entity, ScopeRoot::Empty)
    }

    pub fn record(entity: Entity, id: i64) -> Self {
        Self::new(entity, ScopeRoot::Record(id)).with_predicate(Predicate::eq(entity.table(), "id", id))
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_order_join(mut self, table: impl Into<String>) -> Self {
        self.order_join = table.into();
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn root(&self) -> ScopeRoot {
        self.root
    }

    pub fn is_empty_scope(&self) -> bool {
        self.root == ScopeRoot::Empty
    }

    pub fn table(&self) -> &'static str {
        self.entity.table()
    }

    pub fn order_join(&self) -> &str {
        &self.order_join
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Tables that may be named by `order_join`
    pub fn has_table(&self, table: &str) -> bool {
        self.table() == table || self.joins.iter().any(|j| j.table == table)
    }

    pub fn render_selection(&self) -> Result<String, FilterError> {
        let root = row_json(self.entity)?;
        match &self.selection {
            Selection::Row => Ok(format!("{} AS row", root)),
            Selection::RowWithPivot { pivot, keys } => {
                let mut pairs = Vec::with_capacity(keys.len());
                for key in keys {
                    pairs.push(format!("'{}', {}", key, qualified(pivot, key)?));
                }
                Ok(format!(
                    "({} || jsonb_build_object('pivot', jsonb_build_object({}))) AS row",
                    root,
                    pairs.join(", ")
                ))
            }
        }
    }

    /// `FROM "root" INNER JOIN ...`
    pub fn render_from(&self, params: &mut SqlParams) -> Result<String, FilterError> {
        let mut parts = vec![format!("FROM {}", quote_ident(self.table())?)];
        for join in &self.joins {
            parts.push(join.render(params)?);
        }
        Ok(parts.join(" "))
    }

    pub fn render_predicates(&self, params: &mut SqlParams) -> Result<Vec<String>, FilterError> {
        self.predicates.iter().map(|p| p.render(params)).collect()
    }
}

/// `to_jsonb("table".*)`, minus the entity's hidden columns
pub fn row_json(entity: Entity) -> Result<String, FilterError> {
    let table = quote_ident(entity.table())?;
    let hidden = entity.def().hidden;
    if hidden.is_empty() {
        return Ok(format!("to_jsonb({}.*)", table));
    }
    let stripped: Vec<String> = hidden.iter().map(|column| format!(" - '{}'", column)).collect();
    Ok(format!("(to_jsonb({}.*){})", table, stripped.concat()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_exists_with_correlated_key() {
        let predicate = Predicate::Exists {
            table: "jobcard_contractors".into(),
            inner: ColumnRef::new("jobcard_contractors", "jobcard_id"),
            outer: ColumnRef::new("jobcards", "id"),
            conditions: vec![Predicate::eq("jobcard_contractors", "contractor_id", 9)],
        };
        let mut params = SqlParams::new();
        let sql = predicate.render(&mut params).unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM \"jobcard_contractors\" WHERE \"jobcard_contractors\".\"jobcard_id\" = \"jobcards\".\"id\" AND \"jobcard_contractors\".\"contractor_id\" = $1)"
        );
        assert_eq!(params.into_values(), vec![Value::from(9)]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let predicate = Predicate::In { column: ColumnRef::new("phones", "trackable_id"), values: vec![] };
        assert_eq!(predicate.render(&mut SqlParams::new()).unwrap(), "1=0");
    }

    #[test]
    fn pivot_selection_embeds_keys() {
        let spec = QuerySpec::unrestricted(Entity::Company).with_selection(Selection::RowWithPivot {
            pivot: "jobcard_contractors".into(),
            keys: vec!["jobcard_id".into(), "contractor_id".into()],
        });
        let sql = spec.render_selection().unwrap();
        assert!(sql.contains("'pivot'"));
        assert!(sql.contains("'jobcard_id', \"jobcard_contractors\".\"jobcard_id\""));
    }

    #[test]
    fn user_rows_drop_credentials() {
        let sql = QuerySpec::unrestricted(Entity::User).render_selection().unwrap();
        assert_eq!(sql, "(to_jsonb(\"users\".*) - 'password' - 'remember_token') AS row");

        let pivot = QuerySpec::unrestricted(Entity::User).with_selection(Selection::RowWithPivot {
            pivot: "company_directory".into(),
            keys: vec!["company_id".into()],
        });
        assert!(pivot.render_selection().unwrap().starts_with("((to_jsonb(\"users\".*) - 'password' - 'remember_token') ||"));
    }

    #[test]
    fn order_join_defaults_to_root_table() {
        let spec = QuerySpec::unrestricted(Entity::Invoice);
        assert_eq!(spec.order_join(), "invoices");
        assert!(spec.has_table("invoices"));
        assert!(!spec.has_table("companies"));
    }
}
