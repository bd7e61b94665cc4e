//! Embedding cache persistence
//!
//! The vector store receives one of these backends at construction time and
//! uses it as an opaque key-value blob store. Blobs are JSON-encoded
//! `CachedCatalog` values keyed by the catalog fingerprint, so any change to
//! the dataset or the embedding model lands on a different key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

use crate::{
    error::AppResult,
    models::{Embedding, ShowRecord},
};

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use redis::RedisCache;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Full title -> vector mapping for one catalog fingerprint
    Catalog(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Catalog(fingerprint) => write!(f, "catalog:{}", fingerprint),
        }
    }
}

impl CacheKey {
    /// Filesystem-safe rendering of the key
    pub fn file_name(&self) -> String {
        match self {
            CacheKey::Catalog(fingerprint) => format!("catalog-{}.json", fingerprint),
        }
    }
}

/// Storage backend for generated embeddings
#[async_trait::async_trait]
pub trait EmbeddingCache: Send + Sync {
    /// Returns the stored blob, or `None` when the key is absent
    async fn get(&self, key: &CacheKey) -> AppResult<Option<Vec<u8>>>;

    /// Stores a blob, replacing any previous value
    async fn put(&self, key: &CacheKey, blob: Vec<u8>) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Serialized form of a fully generated catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedCatalog {
    pub fingerprint: String,
    pub model: String,
    pub dimensions: usize,
    pub generated_at: DateTime<Utc>,
    pub vectors: BTreeMap<String, Embedding>,
}

impl CachedCatalog {
    pub fn to_blob(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_blob(blob: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(blob)
    }

    /// Explains why this entry cannot serve the given catalog, if it can't
    ///
    /// A usable entry matches the fingerprint and model, covers exactly the
    /// current titles and has one non-zero dimensionality throughout.
    pub fn rejection_reason(
        &self,
        fingerprint: &str,
        model: &str,
        records: &[ShowRecord],
    ) -> Option<String> {
        if self.fingerprint != fingerprint {
            return Some("fingerprint mismatch".to_string());
        }
        if self.model != model {
            return Some(format!("model mismatch ({} != {})", self.model, model));
        }
        if self.dimensions == 0 {
            return Some("zero dimensions".to_string());
        }
        if self.vectors.len() != records.len() {
            return Some(format!(
                "covers {} of {} titles",
                self.vectors.len(),
                records.len()
            ));
        }
        if let Some(missing) = records
            .iter()
            .find(|r| !self.vectors.contains_key(&r.title))
        {
            return Some(format!("missing title '{}'", missing.title));
        }
        if let Some((title, _)) = self
            .vectors
            .iter()
            .find(|(_, v)| v.len() != self.dimensions)
        {
            return Some(format!("inconsistent dimensions for '{}'", title));
        }
        None
    }
}
