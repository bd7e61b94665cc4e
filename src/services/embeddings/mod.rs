//! Embedding collaborator abstraction
//!
//! The vector store treats an embedder as an opaque `text -> vector`
//! function. Implementations talk to whatever model backs them; the store
//! only requires that one embedder always returns vectors of one length.

use crate::{error::AppResult, models::Embedding};

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Trait for embedding providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds one show description
    ///
    /// Any transport or decoding failure must surface as
    /// `AppError::EmbeddingUnavailable`.
    async fn embed(&self, text: &str) -> AppResult<Embedding>;

    /// Model identifier, part of the cache fingerprint
    fn model(&self) -> &str;
}
