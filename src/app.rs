use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::activity::{ActivityRecorder, StoreActivityRecorder};
use crate::config::CONFIG;
use crate::database::EntityStore;
use crate::handlers;
use crate::middleware::{jwt_auth_middleware, load_actor_middleware};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub activities: Arc<dyn ActivityRecorder>,
}

impl AppState {
    /// Activities are written through the same store the handlers read from
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let activities = Arc::new(StoreActivityRecorder::new(store.clone()));
        Self { store, activities }
    }
}

pub fn router(state: AppState) -> Router {
    build_router(state, CONFIG.api.enable_request_logging)
}

fn build_router(state: AppState, request_logging: bool) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .merge(api_routes(state.clone()))
        .layer(cors_layer());

    let routes = if request_logging {
        routes.layer(TraceLayer::new_for_http())
    } else {
        routes
    };

    routes.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use handlers::{categories, directory, invoices, jobcards};

    Router::new()
        .route("/api/directory", get(directory::index))
        .route("/api/categories", get(categories::index))
        .route("/api/jobcards", get(jobcards::index).post(jobcards::store))
        .route("/api/jobcards/lifecycle-stages", get(jobcards::lifecycle_stages))
        .route(
            "/api/jobcards/:id",
            get(jobcards::show).put(jobcards::update).delete(jobcards::destroy),
        )
        .route("/api/jobcards/:id/contractors", get(jobcards::contractors))
        .route("/api/jobcards/:id/client", delete(jobcards::remove_client))
        .route("/api/jobcards/:id/contractors/:contractor_id", delete(jobcards::remove_contractor))
        .route(
            "/api/jobcards/:id/lifecycle",
            get(jobcards::lifecycle).put(jobcards::update_lifecycle),
        )
        .route("/api/invoices", get(invoices::index).post(invoices::store))
        .route("/api/invoices/:id", get(invoices::show).put(invoices::update))
        // Layers run bottom-up: the token is checked before the actor is loaded
        .layer(from_fn_with_state(state, load_actor_middleware))
        .layer(from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &CONFIG.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database_error": e.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::testing::RecordingStore;

    #[tokio::test]
    async fn health_is_served_with_and_without_request_logging() {
        for request_logging in [true, false] {
            let state = AppState::new(Arc::new(RecordingStore::default()));
            let response = build_router(state, request_logging)
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
