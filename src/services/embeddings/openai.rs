//! OpenAI embeddings provider
//!
//! Calls `POST /v1/embeddings` with a single input string per request and
//! reads the first embedding from the response.

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::Embedding,
    services::embeddings::Embedder,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
}

#[derive(Clone)]
pub struct OpenAiEmbedder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, api_url: String, model: String) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::EmbeddingUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn parse_response(response: EmbeddingResponse) -> AppResult<Embedding> {
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                AppError::EmbeddingUnavailable("API response contained no embedding".to_string())
            })?;

        if embedding.is_empty() {
            return Err(AppError::EmbeddingUnavailable(
                "API returned an empty embedding".to_string(),
            ));
        }

        Ok(embedding)
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> AppResult<Embedding> {
        let url = format!("{}/v1/embeddings", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Embedding request failed");
            return Err(AppError::EmbeddingUnavailable(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable(format!("malformed response: {}", e)))?;

        Self::parse_response(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-ada-002"
        }"#;

        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        let embedding = OpenAiEmbedder::parse_response(response).unwrap();
        assert_eq!(embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_empty_data_is_unavailable() {
        let response = EmbeddingResponse { data: vec![] };
        let result = OpenAiEmbedder::parse_response(response);
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));
    }

    #[tokio::test]
    async fn test_embed_against_stub_server() {
        let app = Router::new().route(
            "/v1/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["input"], "Drama - A show.");
                Json(json!({ "data": [{ "embedding": [1.0, 2.0] }] }))
            }),
        );
        let url = spawn_stub(app).await;

        let embedder =
            OpenAiEmbedder::new("sk-test".to_string(), format!("{}/", url), "test-model".to_string())
                .unwrap();
        let embedding = embedder.embed("Drama - A show.").await.unwrap();

        assert_eq!(embedding, vec![1.0, 2.0]);
        assert_eq!(embedder.model(), "test-model");
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let app = Router::new().route(
            "/v1/embeddings",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let url = spawn_stub(app).await;

        let embedder =
            OpenAiEmbedder::new("bad".to_string(), url, "test-model".to_string()).unwrap();
        let result = embedder.embed("anything").await;

        match result {
            Err(AppError::EmbeddingUnavailable(msg)) => assert!(msg.contains("401")),
            other => panic!("expected EmbeddingUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let embedder = OpenAiEmbedder::new(
            "sk-test".to_string(),
            "http://127.0.0.1:1".to_string(),
            "test-model".to_string(),
        )
        .unwrap();

        let result = embedder.embed("anything").await;
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));
    }
}
