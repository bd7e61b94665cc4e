use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::recommendations::Recommender,
};

pub mod recommendations;
pub mod titles;

/// Shared state handed to every handler
pub struct AppState {
    pub recommender: Recommender,
    pub default_top_n: usize,
}

impl AppState {
    pub fn new(recommender: Recommender, default_top_n: usize) -> Self {
        Self {
            recommender,
            default_top_n,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles/resolve", get(titles::resolve))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let shows = state.recommender.store().catalog().len();
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "shows": shows })),
    )
}
