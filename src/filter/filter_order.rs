use crate::entity::EntityDef;

use super::error::FilterError;
use super::types::{qualified, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"created_at desc, name asc"` and check each column is orderable
    pub fn validate_and_parse(order: &str, entity: &EntityDef) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                if !entity.allows_order(col) {
                    return Err(FilterError::NotOrderable(col.to_string()));
                }
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    /// Columns are prefixed with `order_join` so same-named columns on
    /// joined tables cannot make the ORDER BY ambiguous.
    pub fn generate(infos: &[FilterOrderInfo], order_join: &str) -> Result<String, FilterError> {
        if infos.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            parts.push(format!("{} {}", qualified(order_join, &info.column)?, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    pub fn default_order() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo { column: "created_at".to_string(), sort: SortDirection::Desc }]
    }
}
