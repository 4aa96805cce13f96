//! The relational store, reached only through [`EntityStore`].
//!
//! Every SELECT issued by this service renders each result row as a single
//! JSON column named `row`, so the store never needs to know a table's shape.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row as _};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::CONFIG;
use crate::entity::Row;
use crate::filter::SqlResult;

use super::manager::{DatabaseError, DatabaseManager};

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Run a SELECT whose only column is the JSON object `row`
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Row>, DatabaseError>;

    /// Run a `SELECT COUNT(*) AS count ...`
    async fn fetch_count(&self, sql: &SqlResult) -> Result<i64, DatabaseError>;

    /// Run a statement and return the number of affected rows
    async fn execute(&self, sql: &SqlResult) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn fetch_first(&self, sql: &SqlResult) -> Result<Option<Row>, DatabaseError> {
        Ok(self.fetch_rows(sql).await?.into_iter().next())
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn log_timing(&self, sql: &SqlResult, started: Instant) {
        let config = &CONFIG.database;
        let elapsed = started.elapsed().as_millis() as u64;
        if config.enable_query_logging {
            debug!(elapsed_ms = elapsed, params = sql.params.len(), "{}", sql.query);
        }
        if config.enable_slow_query_warning && elapsed >= config.slow_query_threshold_ms {
            warn!(elapsed_ms = elapsed, "Slow query: {}", sql.query);
        }
    }
}

fn bind_params<'q>(sql: &'q SqlResult) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sql.params.iter().fold(sqlx::query(&sql.query), bind_param)
}

/// Bind one JSON value with the closest Postgres type
fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Lists are expanded into placeholders by the filter; anything left is a JSON document
        Value::Array(_) | Value::Object(_) => q.bind(v),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Row>, DatabaseError> {
        let started = Instant::now();
        let rows = bind_params(sql).fetch_all(&self.pool).await?;
        self.log_timing(sql, started);

        rows.into_iter()
            .map(|row| match row.try_get::<Value, _>("row")? {
                Value::Object(map) => Ok(map),
                other => Err(DatabaseError::QueryError(format!("Expected a JSON object row, got {}", other))),
            })
            .collect()
    }

    async fn fetch_count(&self, sql: &SqlResult) -> Result<i64, DatabaseError> {
        let started = Instant::now();
        let row = bind_params(sql).fetch_one(&self.pool).await?;
        self.log_timing(sql, started);
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn execute(&self, sql: &SqlResult) -> Result<u64, DatabaseError> {
        let started = Instant::now();
        let result = bind_params(sql).execute(&self.pool).await?;
        self.log_timing(sql, started);
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
