use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::request_id::RequestId, routes::AppState,
    services::title_resolver::Resolution,
};

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    q: String,
}

/// Handler for the title resolution endpoint
///
/// Returns the closest canonical title and whether it needs the user's
/// confirmation before it can be sent back in `confirmed`.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ResolveQuery>,
) -> AppResult<Json<Resolution>> {
    let resolution = state.recommender.resolver().resolve(&params.q)?;

    tracing::info!(
        request_id = %request_id,
        input = %resolution.input,
        title = %resolution.title,
        confidence = resolution.confidence,
        auto_accepted = resolution.auto_accepted,
        "Title resolved"
    );

    Ok(Json(resolution))
}
