use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,

    #[serde(rename = "$like")] Like,
    #[serde(rename = "$ilike")] ILike,

    #[serde(rename = "$in")] In,
    #[serde(rename = "$nin")] NIn,

    #[serde(rename = "$between")] Between,
    #[serde(rename = "$null")] Null,
}

/// Soft-delete selection for a query. Exactly one applies per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrashedState {
    #[default]
    Active,
    OnlyTrashed,
    WithTrashed,
}

impl TrashedState {
    /// `withtrashed` is checked first, so it wins when both flags are set
    pub fn from_flags(with_trashed: bool, only_trashed: bool) -> Self {
        if with_trashed {
            TrashedState::WithTrashed
        } else if only_trashed {
            TrashedState::OnlyTrashed
        } else {
            TrashedState::Active
        }
    }
}

/// Caller-supplied filter directive, already split out of the query string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    /// Bare `column=value` equality pairs
    pub fields: Vec<(String, String)>,
    pub where_clause: Option<Value>,
    pub order: Option<String>,
    pub order_join: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Page window resolved from `page` / `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self { query: query.into(), params }
    }
}

/// Positional parameter collector shared by every clause of one statement
#[derive(Debug, Default)]
pub struct SqlParams {
    values: Vec<Value>,
}

impl SqlParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Quote an identifier after checking it is a plain SQL name
pub fn quote_ident(name: &str) -> Result<String, FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(FilterError::InvalidColumn(format!("Invalid identifier format: {}", name)));
    }
    Ok(format!("\"{}\"", name))
}

/// `"table"."column"`
pub fn qualified(table: &str, column: &str) -> Result<String, FilterError> {
    Ok(format!("{}.{}", quote_ident(table)?, quote_ident(column)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_trashed_wins_when_both_flags_set() {
        assert_eq!(TrashedState::from_flags(true, true), TrashedState::WithTrashed);
        assert_eq!(TrashedState::from_flags(false, true), TrashedState::OnlyTrashed);
        assert_eq!(TrashedState::from_flags(false, false), TrashedState::Active);
    }

    #[test]
    fn quote_ident_rejects_injection() {
        assert_eq!(quote_ident("created_at").unwrap(), "\"created_at\"");
        assert!(quote_ident("created_at; DROP TABLE users").is_err());
        assert!(quote_ident("1abc").is_err());
        assert!(quote_ident("").is_err());
    }

    #[test]
    fn params_are_numbered_in_push_order() {
        let mut params = SqlParams::new();
        assert_eq!(params.push(Value::from(1)), "$1");
        assert_eq!(params.push(Value::from("x")), "$2");
        assert_eq!(params.into_values().len(), 2);
    }
}
