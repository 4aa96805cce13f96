// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};
use thiserror::Error;

use crate::api::{notify_error, notify_no_resource};
use crate::connections::ConnectionError;
use crate::database::DatabaseError;
use crate::filter::error::FilterError;
use crate::scope::ScopeError;

/// Title used for every failed query, with the cause in `detail`
pub const QUERY_ERROR_TITLE: &str = "Query Error";
pub const NO_RESOURCE_MESSAGE: &str = "No resource found";

/// HTTP API error. Every variant renders as `{"message": ...}`, plus
/// `detail` for query errors.
#[derive(Debug, Error)]
pub enum ApiError {
    // 404 with a fixed caller-facing message, e.g. a missing model id
    #[error("{0}")]
    ClientInput(String),

    // 404 "Query Error" with the underlying cause
    #[error("Query Error: {0}")]
    Query(String),

    // 404
    #[error("No resource found")]
    NoResource,

    // 422
    #[error("{0}")]
    Unprocessable(String),

    // 401
    #[error("{0}")]
    Unauthorized(String),

    // 503
    #[error("{0}")]
    ServiceUnavailable(String),

    // 500
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ClientInput(_) | ApiError::Query(_) | ApiError::NoResource => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-facing message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Query(_) => QUERY_ERROR_TITLE,
            ApiError::NoResource => NO_RESOURCE_MESSAGE,
            ApiError::ClientInput(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Query(detail) => Some(detail),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({ "message": self.message() });
        if let Some(detail) = self.detail() {
            body["detail"] = json!(detail);
        }
        body
    }
}

impl ApiError {
    pub fn client_input(message: impl Into<String>) -> Self {
        ApiError::ClientInput(message.into())
    }

    pub fn query(detail: impl Into<String>) -> Self {
        ApiError::Query(detail.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::Unprocessable(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert other error types to ApiError
impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        tracing::error!("Filter error: {}", err);
        ApiError::query(err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::QueryError(_) | DatabaseError::Sqlx(_) => {
                tracing::error!("Database query error: {}", err);
                ApiError::query(err.to_string())
            }
        }
    }
}

impl From<ScopeError> for ApiError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::MissingModelId(_) => ApiError::client_input(err.to_string()),
            ScopeError::ActorWithoutBranch | ScopeError::ActorWithoutCompany | ScopeError::TemplateNotSelected => {
                tracing::error!("Scope error: {}", err);
                ApiError::query(err.to_string())
            }
        }
    }
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::Filter(e) => e.into(),
            ConnectionError::Database(e) => e.into(),
            ConnectionError::UnknownRelation { .. } => {
                tracing::error!("Connection error: {}", err);
                ApiError::query(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {}", err);
        ApiError::query(err.to_string())
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NoResource => notify_no_resource(),
            _ => notify_error(self.message(), self.detail(), self.status_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_carry_detail() {
        let err = ApiError::query("relation \"x\" does not exist");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json(), json!({ "message": "Query Error", "detail": "relation \"x\" does not exist" }));
    }

    #[test]
    fn missing_model_id_is_client_input() {
        let err: ApiError = ScopeError::MissingModelId("contractor").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json(), json!({ "message": "include contractor id" }));
    }

    #[test]
    fn no_resource_shape() {
        assert_eq!(ApiError::NoResource.to_json(), json!({ "message": "No resource found" }));
    }

    #[test]
    fn nested_connection_errors_unwrap() {
        let err: ApiError = ConnectionError::Filter(FilterError::InvalidPage("0".into())).into();
        assert!(matches!(err, ApiError::Query(_)));
        let err: ApiError = ConnectionError::Database(DatabaseError::InvalidDatabaseUrl).into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }
}
