use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    #[error("Embeddings unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Unknown title: {0}")]
    UnknownTitle(String),

    #[error("No confident match for '{input}' (best candidate '{candidate}' at {confidence:.1})")]
    NoConfidentMatch {
        input: String,
        candidate: String,
        confidence: f64,
    },

    #[error("No favorite shows remain after resolution")]
    EmptyFavorites,

    #[error("Dimension mismatch for '{title}': expected {expected}, found {found}")]
    DimensionMismatch {
        title: String,
        expected: usize,
        found: usize,
    },

    #[error("Zero vector for '{0}': similarity is undefined")]
    ZeroVector(String),

    /// Raised by cache backends only; the vector store downgrades it to a miss
    #[error("Cache error: {0}")]
    Cache(String),
}

impl AppError {
    /// Stable machine-readable name for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DataUnavailable(_) => "data_unavailable",
            AppError::EmbeddingUnavailable(_) => "embedding_unavailable",
            AppError::UnknownTitle(_) => "unknown_title",
            AppError::NoConfidentMatch { .. } => "no_confident_match",
            AppError::EmptyFavorites => "empty_favorites",
            AppError::DimensionMismatch { .. } => "dimension_mismatch",
            AppError::ZeroVector(_) => "zero_vector",
            AppError::Cache(_) => "cache",
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Cache(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Cache(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::DataUnavailable(_) | AppError::EmbeddingUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::UnknownTitle(_) => StatusCode::NOT_FOUND,
            AppError::NoConfidentMatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptyFavorites => StatusCode::BAD_REQUEST,
            AppError::DimensionMismatch { .. } | AppError::ZeroVector(_) | AppError::Cache(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (AppError::DataUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::EmbeddingUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::UnknownTitle("x".into()), StatusCode::NOT_FOUND),
            (AppError::EmptyFavorites, StatusCode::BAD_REQUEST),
            (AppError::ZeroVector("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_no_confident_match_message() {
        let error = AppError::NoConfidentMatch {
            input: "frends".to_string(),
            candidate: "Friends".to_string(),
            confidence: 85.714,
        };
        assert_eq!(
            error.to_string(),
            "No confident match for 'frends' (best candidate 'Friends' at 85.7)"
        );
        assert_eq!(error.kind(), "no_confident_match");
    }
}
