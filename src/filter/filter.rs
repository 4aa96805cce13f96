use serde_json::Value;

use crate::scope::QuerySpec;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{
    qualified, quote_ident, FilterData, FilterOrderInfo, Pagination, SqlParams, SqlResult, TrashedState,
};

/// Decorates a scoped query with trashed-state selection, allow-listed
/// field filters, join-aware ordering and pagination. Nothing runs here;
/// the output is SQL for the store to execute.
pub struct Filter {
    spec: QuerySpec,
    trashed: TrashedState,
    fields: Vec<(String, String)>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    order_join: String,
    pagination: Option<Pagination>,
}

impl Filter {
    pub fn new(spec: QuerySpec) -> Self {
        let order_join = spec.order_join().to_string();
        Self {
            spec,
            trashed: TrashedState::default(),
            fields: vec![],
            where_data: None,
            order_data: FilterOrder::default_order(),
            order_join,
            pagination: None,
        }
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        self.fields(data.fields);
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order_join) = data.order_join { self.order_join(&order_join)?; }
        if let Some(order) = data.order { self.order(&order)?; }
        self.paginate(data.page, data.limit)?;
        Ok(self)
    }

    pub fn trashed(&mut self, state: TrashedState) -> &mut Self {
        self.trashed = state;
        self
    }

    pub fn fields(&mut self, fields: Vec<(String, String)>) -> &mut Self {
        self.fields = fields;
        self
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &str) -> Result<&mut Self, FilterError> {
        let order_info = FilterOrder::validate_and_parse(order_spec, self.spec.entity().def())?;
        if !order_info.is_empty() {
            self.order_data = order_info;
        }
        Ok(self)
    }

    /// Override the table used to qualify ORDER BY columns. It must be part
    /// of the query, otherwise the ORDER BY would reference a missing table.
    pub fn order_join(&mut self, table: &str) -> Result<&mut Self, FilterError> {
        quote_ident(table)?;
        if !self.spec.has_table(table) {
            return Err(FilterError::InvalidOrderJoin(format!("{} is not part of this query", table)));
        }
        self.order_join = table.to_string();
        Ok(self)
    }

    pub fn paginate(&mut self, page: Option<i64>, limit: Option<i64>) -> Result<&mut Self, FilterError> {
        let filter_config = &crate::config::CONFIG.filter;

        let page = page.unwrap_or(1);
        if page < 1 { return Err(FilterError::InvalidPage("Page must be 1 or greater".to_string())); }

        let limit = limit.unwrap_or(filter_config.default_limit);
        if limit < 1 { return Err(FilterError::InvalidLimit("Limit must be 1 or greater".to_string())); }

        // Apply max limit from config
        let max_limit = filter_config.max_limit.unwrap_or(i64::MAX);
        let per_page = if limit > max_limit {
            if filter_config.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            }
            max_limit
        } else {
            limit
        };

        // The last row of the page must still be addressable
        if page.checked_mul(per_page).is_none() {
            return Err(FilterError::InvalidPage(format!("Page {} is out of range", page)));
        }

        self.pagination = Some(Pagination { page, per_page });
        Ok(self)
    }

    /// Drop pagination, e.g. for eager loads that must see every related row
    pub fn unpaginated(&mut self) -> &mut Self {
        self.pagination = None;
        self
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = SqlParams::new();
        let select_clause = self.spec.render_selection()?;
        let from_clause = self.spec.render_from(&mut params)?;
        let where_clause = self.build_where_clause(&mut params)?;
        let order_clause = FilterOrder::generate(&self.order_data, &self.order_join)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            from_clause,
            where_clause,
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: params.into_values() })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = SqlParams::new();
        let from_clause = self.spec.render_from(&mut params)?;
        let where_clause = self.build_where_clause(&mut params)?;

        let query = [
            "SELECT COUNT(*) AS count".to_string(),
            from_clause,
            where_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: params.into_values() })
    }

    fn build_where_clause(&self, params: &mut SqlParams) -> Result<String, FilterError> {
        let mut conditions = self.spec.render_predicates(params)?;

        if let Some(trashed) = self.trashed_condition()? {
            conditions.push(trashed);
        }

        let entity = self.spec.entity().def();
        let max_depth = crate::config::CONFIG.filter.max_nested_depth;
        let mut filter_where = FilterWhere::new(entity, self.spec.table(), params, max_depth);
        conditions.extend(filter_where.generate_fields(&self.fields)?);
        if let Some(ref where_data) = self.where_data {
            conditions.extend(filter_where.generate(where_data)?);
        }

        if conditions.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("WHERE {}", conditions.join(" AND ")))
        }
    }

    fn trashed_condition(&self) -> Result<Option<String>, FilterError> {
        if !self.spec.entity().def().soft_deletes {
            return Ok(None);
        }
        let column = qualified(self.spec.table(), "deleted_at")?;
        Ok(match self.trashed {
            TrashedState::Active => Some(format!("{} IS NULL", column)),
            TrashedState::OnlyTrashed => Some(format!("{} IS NOT NULL", column)),
            TrashedState::WithTrashed => None,
        })
    }

    fn build_limit_clause(&self) -> String {
        match self.pagination {
            Some(p) => format!("LIMIT {} OFFSET {}", p.per_page, p.offset()),
            None => String::new(),
        }
    }
}
