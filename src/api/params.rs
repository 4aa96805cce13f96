use std::collections::HashMap;

use crate::connections::ConnectionGraph;
use crate::filter::error::FilterError;
use crate::filter::{FilterData, TrashedState};

/// Query-string keys that steer the listing pipeline rather than filter rows
const DIRECTIVE_KEYS: &[&str] = &[
    "where", "order", "order_join", "page", "limit",
    "withtrashed", "onlytrashed", "connections",
];

/// A request's query string
#[derive(Debug, Clone, Default)]
pub struct RequestParams(pub HashMap<String, String>);

impl RequestParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// `1` and `true` are truthy; anything else, or absence, is not
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true"))
    }

    pub fn trashed(&self) -> TrashedState {
        TrashedState::from_flags(self.flag("withtrashed"), self.flag("onlytrashed"))
    }

    pub fn connections(&self) -> ConnectionGraph {
        self.get("connections").map(ConnectionGraph::parse).unwrap_or_default()
    }

    /// Split the query string into a filter directive. Keys in `scope_keys`
    /// belong to the endpoint's scope selector and are not field filters.
    pub fn filter_data(&self, scope_keys: &[&str]) -> Result<FilterData, FilterError> {
        let mut fields: Vec<(String, String)> = self
            .0
            .iter()
            .filter(|(k, _)| !DIRECTIVE_KEYS.contains(&k.as_str()) && !scope_keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        // Stable parameter numbering regardless of map order
        fields.sort();

        let where_clause = match self.get("where") {
            Some(raw) if !raw.trim().is_empty() => Some(serde_json::from_str(raw)?),
            _ => None,
        };

        Ok(FilterData {
            fields,
            where_clause,
            order: self.get("order").filter(|s| !s.is_empty()).map(str::to_string),
            order_join: self.get("order_join").filter(|s| !s.is_empty()).map(str::to_string),
            page: Self::parse_number(self.get("page"), FilterError::InvalidPage)?,
            limit: Self::parse_number(self.get("limit"), FilterError::InvalidLimit)?,
        })
    }

    fn parse_number(value: Option<&str>, err: fn(String) -> FilterError) -> Result<Option<i64>, FilterError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => v.parse().map(Some).map_err(|_| err(format!("'{}' is not a number", v))),
        }
    }
}

impl From<HashMap<String, String>> for RequestParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> RequestParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>().into()
    }

    #[test]
    fn trashed_flags_accept_one_or_true() {
        assert_eq!(params(&[("withtrashed", "true")]).trashed(), TrashedState::WithTrashed);
        assert_eq!(params(&[("onlytrashed", "1")]).trashed(), TrashedState::OnlyTrashed);
        assert_eq!(params(&[("onlytrashed", "yes")]).trashed(), TrashedState::Active);
        assert_eq!(params(&[("withtrashed", "1"), ("onlytrashed", "1")]).trashed(), TrashedState::WithTrashed);
    }

    #[test]
    fn scope_keys_are_not_field_filters() {
        let data = params(&[("model", "client"), ("modelId", "4"), ("title", "Roof"), ("page", "2"), ("connections", "client")])
            .filter_data(&["model", "modelId", "step"])
            .unwrap();
        assert_eq!(data.fields, vec![("title".to_string(), "Roof".to_string())]);
        assert_eq!(data.page, Some(2));
    }

    #[test]
    fn where_is_parsed_as_json() {
        let data = params(&[("where", r#"{"priority":{"$gte":2}}"#)]).filter_data(&[]).unwrap();
        assert_eq!(data.where_clause, Some(json!({ "priority": { "$gte": 2 } })));
        assert!(matches!(params(&[("where", "{oops")]).filter_data(&[]), Err(FilterError::JsonError(_))));
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        assert!(matches!(params(&[("limit", "ten")]).filter_data(&[]), Err(FilterError::InvalidLimit(_))));
    }
}
