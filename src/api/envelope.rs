use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::entity::Row;
use crate::error::{ApiError, NO_RESOURCE_MESSAGE};
use crate::filter::Pagination;

/// Handler result carrying the raw payload and its status.
///
/// Unlike an error, a successful payload is never wrapped: clients read the
/// page or row directly from the body.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self { data, status_code: None }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code: Some(status_code) }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// 204, rendered without a body
    pub fn no_content() -> Self {
        ApiResponse::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        match serde_json::to_value(&self.data) {
            Ok(value) => notify(value, status),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Raw JSON payload at `status`
pub fn notify(payload: Value, status: StatusCode) -> Response {
    (status, Json(payload)).into_response()
}

/// `{"message": title}`, plus `detail` when given
pub fn notify_error(title: &str, detail: Option<&str>, status: StatusCode) -> Response {
    let mut body = json!({ "message": title });
    if let Some(detail) = detail {
        body["detail"] = json!(detail);
    }
    (status, Json(body)).into_response()
}

pub fn notify_no_resource() -> Response {
    notify_error(NO_RESOURCE_MESSAGE, None, StatusCode::NOT_FOUND)
}

/// Paginated list payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub data: Vec<Value>,
}

impl Page {
    pub fn new(rows: Vec<Row>, pagination: Pagination, total: i64) -> Self {
        let count = rows.len() as i64;
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            (Some(pagination.offset() + 1), Some(pagination.offset() + count))
        };
        let last_page = if total == 0 { 1 } else { (total - 1) / pagination.per_page + 1 };
        Self {
            current_page: pagination.page,
            per_page: pagination.per_page,
            total,
            last_page,
            from,
            to,
            data: rows.into_iter().map(Value::Object).collect(),
        }
    }

    pub fn empty(pagination: Pagination) -> Self {
        Self::new(vec![], pagination, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds() {
        let rows = vec![Row::new(), Row::new()];
        let page = Page::new(rows, Pagination { page: 2, per_page: 15 }, 17);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.from, Some(16));
        assert_eq!(page.to, Some(17));
    }

    #[test]
    fn empty_page_has_no_bounds() {
        let page = Page::empty(Pagination { page: 1, per_page: 15 });
        assert_eq!(page.total, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert!(page.data.is_empty());
    }
}
