#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jobdesk_api::app::{router, AppState};
use jobdesk_api::auth::{generate_jwt, Claims};
use jobdesk_api::database::{DatabaseError, EntityStore};
use jobdesk_api::entity::Row;
use jobdesk_api::filter::SqlResult;

/// Substring of the users lookup issued by the actor middleware
pub const ACTOR_LOOKUP: &str = "FROM \"users\" LEFT JOIN \"company_branches\"";

enum Answer {
    Rows(Vec<Row>),
    Count(i64),
    Affected(u64),
    Fail(String),
}

/// In-memory store answering by query substring. The first rule whose
/// needle appears in the statement wins; unmatched statements get no rows,
/// a zero count, or one affected row.
#[derive(Default)]
pub struct ScriptedStore {
    rules: Mutex<Vec<(String, Answer)>>,
    statements: Mutex<Vec<SqlResult>>,
}

impl ScriptedStore {
    /// A store that knows one active user: id 1 on branch 3 of company 2
    pub fn with_actor() -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.rows(ACTOR_LOOKUP, serde_json::json!([{ "id": 1, "company_branch_id": 3, "company_id": 2 }]));
        store
    }

    pub fn rows(&self, needle: &str, rows: Value) {
        let rows = serde_json::from_value(rows).unwrap_or_default();
        self.push(needle, Answer::Rows(rows));
    }

    pub fn count(&self, needle: &str, count: i64) {
        self.push(needle, Answer::Count(count));
    }

    pub fn affected(&self, needle: &str, affected: u64) {
        self.push(needle, Answer::Affected(affected));
    }

    pub fn fail(&self, needle: &str, message: &str) {
        self.push(needle, Answer::Fail(message.to_string()));
    }

    pub fn statements(&self) -> Vec<SqlResult> {
        self.statements.lock().unwrap().clone()
    }

    /// Statements other than the actor lookup
    pub fn handler_statements(&self) -> Vec<SqlResult> {
        self.statements().into_iter().filter(|s| !s.query.contains(ACTOR_LOOKUP)).collect()
    }

    pub fn find(&self, needle: &str) -> Option<SqlResult> {
        self.statements().into_iter().find(|s| s.query.contains(needle))
    }

    fn push(&self, needle: &str, answer: Answer) {
        self.rules.lock().unwrap().push((needle.to_string(), answer));
    }

    fn answer<T>(&self, sql: &SqlResult, pick: impl Fn(&Answer) -> Option<T>) -> Result<Option<T>, DatabaseError> {
        self.statements.lock().unwrap().push(sql.clone());
        let rules = self.rules.lock().unwrap();
        for (needle, answer) in rules.iter() {
            if !sql.query.contains(needle.as_str()) {
                continue;
            }
            if let Answer::Fail(message) = answer {
                return Err(DatabaseError::QueryError(message.clone()));
            }
            if let Some(value) = pick(answer) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl EntityStore for ScriptedStore {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Row>, DatabaseError> {
        let rows = self.answer(sql, |a| match a {
            Answer::Rows(rows) => Some(rows.clone()),
            _ => None,
        })?;
        Ok(rows.unwrap_or_default())
    }

    async fn fetch_count(&self, sql: &SqlResult) -> Result<i64, DatabaseError> {
        let count = self.answer(sql, |a| match a {
            Answer::Count(n) => Some(*n),
            _ => None,
        })?;
        Ok(count.unwrap_or(0))
    }

    async fn execute(&self, sql: &SqlResult) -> Result<u64, DatabaseError> {
        let affected = self.answer(sql, |a| match a {
            Answer::Affected(n) => Some(*n),
            _ => None,
        })?;
        Ok(affected.unwrap_or(1))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub fn app(store: Arc<ScriptedStore>) -> Router {
    router(AppState::new(store))
}

pub fn token() -> String {
    generate_jwt(&Claims::new(1, "user")).expect("token")
}

/// Send an authenticated request and decode the JSON body (null when empty)
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body)?).await?;
    decode(response).await
}

pub async fn get(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, None).await
}

pub async fn decode(response: axum::response::Response) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}
