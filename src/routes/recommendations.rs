use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
    services::title_resolver::{ConfirmedTitles, Resolution},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub favorites: Vec<String>,
    /// Canonical titles the user approved after a low-confidence resolve
    #[serde(default)]
    pub confirmed: Vec<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationItem {
    pub title: String,
    pub similarity: f64,
    pub percent: u8,
}

impl From<Recommendation> for RecommendationItem {
    fn from(rec: Recommendation) -> Self {
        Self {
            percent: rec.percent(),
            title: rec.title,
            similarity: rec.similarity,
        }
    }
}

/// Favorite that was skipped, with the best guess the caller can confirm
#[derive(Debug, Serialize)]
pub struct RejectedItem {
    pub input: String,
    pub title: String,
    pub confidence: f64,
}

impl From<Resolution> for RejectedItem {
    fn from(resolution: Resolution) -> Self {
        Self {
            input: resolution.input,
            title: resolution.title,
            confidence: resolution.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationItem>,
    pub rejected: Vec<RejectedItem>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let top_n = request.top_n.unwrap_or(state.default_top_n);

    tracing::info!(
        request_id = %request_id,
        favorites = request.favorites.len(),
        confirmed = request.confirmed.len(),
        top_n,
        "Processing recommendation request"
    );

    let mut hook = ConfirmedTitles::new(request.confirmed);
    let run = state
        .recommender
        .recommend(request.favorites.as_slice(), top_n, &mut hook)?;

    Ok(Json(RecommendationResponse {
        recommendations: run
            .recommendations
            .into_iter()
            .map(RecommendationItem::from)
            .collect(),
        rejected: run.rejected.into_iter().map(RejectedItem::from).collect(),
    }))
}
