use serde_json::Value;

use crate::entity::EntityDef;

use super::error::FilterError;
use super::types::{qualified, FilterOp, FilterWhereInfo, SqlParams};

/// Translates the JSON `where` grammar into SQL conditions over one table.
///
/// Columns outside the entity's filter allow-list are skipped, not rejected.
pub struct FilterWhere<'a> {
    entity: &'static EntityDef,
    table: &'a str,
    params: &'a mut SqlParams,
    max_depth: u32,
}

impl<'a> FilterWhere<'a> {
    pub fn new(entity: &'static EntityDef, table: &'a str, params: &'a mut SqlParams, max_depth: u32) -> Self {
        Self { entity, table, params, max_depth }
    }

    pub fn generate(&mut self, where_data: &Value) -> Result<Vec<String>, FilterError> {
        self.build(where_data, 0)
    }

    /// Bare `column=value` pairs from the query string. Compared as text so
    /// the string form works against any column type.
    pub fn generate_fields(&mut self, fields: &[(String, String)]) -> Result<Vec<String>, FilterError> {
        let mut out = vec![];
        for (column, value) in fields {
            if !self.entity.allows_filter(column) {
                tracing::debug!("Ignoring filter on non-filterable column {}.{}", self.table, column);
                continue;
            }
            let quoted = qualified(self.table, column)?;
            out.push(format!("CAST({} AS TEXT) = {}", quoted, self.param(Value::String(value.clone()))));
        }
        Ok(out)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            Value::String(_) => Err(FilterError::InvalidWhereClause(
                "Raw SQL predicates are not accepted".to_string(),
            )),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value, depth: u32) -> Result<Vec<String>, FilterError> {
        if depth > self.max_depth {
            return Err(FilterError::InvalidWhereClause(format!(
                "WHERE nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }
        Self::validate(where_data)?;

        let Value::Object(obj) = where_data else {
            return Ok(vec![]);
        };

        let mut sql_conditions = vec![];
        for (key, value) in obj {
            if key.starts_with('$') {
                if let Some(sql) = self.build_logical(key, value, depth)? {
                    sql_conditions.push(sql);
                }
                continue;
            }
            if !self.entity.allows_filter(key) {
                tracing::debug!("Ignoring filter on non-filterable column {}.{}", self.table, key);
                continue;
            }
            for condition in Self::parse_field_condition(key, value)? {
                sql_conditions.push(self.build_sql_condition(&condition)?);
            }
        }
        Ok(sql_conditions)
    }

    fn build_logical(&mut self, op: &str, value: &Value, depth: u32) -> Result<Option<String>, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let mut sql_parts = Vec::new();
                for v in arr {
                    let inner = self.build(v, depth + 1)?;
                    if !inner.is_empty() {
                        sql_parts.push(format!("({})", inner.join(" AND ")));
                    }
                }
                if sql_parts.is_empty() {
                    return Ok(None);
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(Some(format!("({})", sql_parts.join(joiner))))
            }
            "$not" => {
                let inner = self.build(value, depth + 1)?;
                if inner.is_empty() {
                    return Ok(None);
                }
                Ok(Some(format!("NOT ({})", inner.join(" AND "))))
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let mut out = vec![];
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                out.push(FilterWhereInfo { column: field.to_string(), operator, data: op_val.clone() });
            }
        } else {
            // Implicit equality: { field: value }
            out.push(FilterWhereInfo { column: field.to_string(), operator: FilterOp::Eq, data: value.clone() });
        }
        Ok(out)
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$between" => FilterOp::Between,
            "$null" => FilterOp::Null,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = qualified(self.table, &condition.column)?;
        let data = condition.data.clone();
        Ok(match condition.operator {
            FilterOp::Eq => {
                if data.is_null() { format!("{} IS NULL", quoted_column) }
                else { format!("{} = {}", quoted_column, self.param(data)) }
            }
            FilterOp::Ne => {
                if data.is_null() { format!("{} IS NOT NULL", quoted_column) }
                else { format!("{} <> {}", quoted_column, self.param(data)) }
            }
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(data)),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(data)),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(data)),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(data)),
            FilterOp::Like => format!("{} LIKE {}", quoted_column, self.param(data)),
            FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.param(data)),
            FilterOp::In | FilterOp::NIn => {
                let negate = condition.operator == FilterOp::NIn;
                match data {
                    Value::Array(values) if values.is_empty() => {
                        if negate { "1=1".to_string() } else { "1=0".to_string() }
                    }
                    Value::Array(values) => {
                        let params: Vec<String> = values.into_iter().map(|v| self.param(v)).collect();
                        let keyword = if negate { "NOT IN" } else { "IN" };
                        format!("{} {} ({})", quoted_column, keyword, params.join(", "))
                    }
                    scalar => {
                        let op = if negate { "<>" } else { "=" };
                        format!("{} {} {}", quoted_column, op, self.param(scalar))
                    }
                }
            }
            FilterOp::Between => match data {
                Value::Array(values) if values.len() == 2 => {
                    let low = self.param(values[0].clone());
                    let high = self.param(values[1].clone());
                    format!("{} BETWEEN {} AND {}", quoted_column, low, high)
                }
                _ => {
                    return Err(FilterError::InvalidOperatorData(
                        "$between requires array with 2 values".to_string(),
                    ))
                }
            },
            FilterOp::Null => match data {
                Value::Bool(true) => format!("{} IS NULL", quoted_column),
                Value::Bool(false) => format!("{} IS NOT NULL", quoted_column),
                _ => return Err(FilterError::InvalidOperatorData("$null requires a boolean".to_string())),
            },
        })
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value)
    }
}
