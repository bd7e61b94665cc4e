use chrono::Utc;
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use crate::{
    cache::{CacheKey, CachedCatalog, EmbeddingCache},
    error::{AppError, AppResult},
    models::{Catalog, Embedding, ShowRecord},
    services::{dataset::DatasetSource, embeddings::Embedder},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const PROGRESS_EVERY: usize = 50;

/// Read-only owner of the catalog
#[derive(Debug, Clone)]
pub struct VectorStore {
    catalog: Arc<Catalog>,
    fingerprint: Option<String>,
}

impl VectorStore {
    /// Wraps an already assembled catalog (fixtures, embedding the core)
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fingerprint: None,
        }
    }

    /// Vector for an exact canonical title
    pub fn vector_of(&self, title: &str) -> AppResult<&[f32]> {
        self.catalog
            .get(title)
            .ok_or_else(|| AppError::UnknownTitle(title.to_string()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Fingerprint of the dataset the catalog was loaded for, if loaded
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

/// Assembles a `VectorStore` from its injected collaborators
///
/// Without an embedder the loader runs read-only: a valid cache entry is
/// required and a miss fails with `EmbeddingUnavailable`.
pub struct VectorStoreLoader {
    dataset: Arc<dyn DatasetSource>,
    cache: Arc<dyn EmbeddingCache>,
    embedder: Option<Arc<dyn Embedder>>,
    model: String,
    timeout: Duration,
}

impl VectorStoreLoader {
    /// `model` identifies the embedding model when no embedder is attached
    pub fn new(
        dataset: Arc<dyn DatasetSource>,
        cache: Arc<dyn EmbeddingCache>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            dataset,
            cache,
            embedder: None,
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Bound on the whole generation step
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn model(&self) -> &str {
        match &self.embedder {
            Some(embedder) => embedder.model(),
            None => &self.model,
        }
    }

    pub async fn load(&self) -> AppResult<VectorStore> {
        let records = self.dataset.load().await?;
        let model = self.model().to_string();
        let fingerprint = catalog_fingerprint(&model, &records);
        let key = CacheKey::Catalog(fingerprint.clone());

        tracing::info!(
            dataset = %self.dataset.describe(),
            shows = records.len(),
            model = %model,
            cache = self.cache.name(),
            fingerprint = %fingerprint,
            "Loading vector store"
        );

        if let Some(vectors) = self.read_cache(&key, &fingerprint, &model, &records).await {
            let catalog = Catalog::new(vectors)?;
            tracing::info!(
                shows = catalog.len(),
                dimensions = catalog.dimensions(),
                "Catalog loaded from cache"
            );
            return Ok(VectorStore {
                catalog: Arc::new(catalog),
                fingerprint: Some(fingerprint),
            });
        }

        let embedder = self.embedder.as_ref().ok_or_else(|| {
            AppError::EmbeddingUnavailable(
                "no valid embedding cache and no embedding access configured".to_string(),
            )
        })?;

        let vectors = tokio::time::timeout(self.timeout, generate(embedder.as_ref(), &records))
            .await
            .map_err(|_| {
                AppError::EmbeddingUnavailable(format!(
                    "embedding generation timed out after {:?}",
                    self.timeout
                ))
            })??;

        let catalog = Catalog::new(vectors)?;
        self.write_cache(&key, &fingerprint, &model, &catalog).await;

        tracing::info!(
            shows = catalog.len(),
            dimensions = catalog.dimensions(),
            "Catalog generated"
        );

        Ok(VectorStore {
            catalog: Arc::new(catalog),
            fingerprint: Some(fingerprint),
        })
    }

    /// Returns the cached vectors when a complete, matching entry exists
    ///
    /// Read failures and unusable entries are logged and treated as a miss.
    async fn read_cache(
        &self,
        key: &CacheKey,
        fingerprint: &str,
        model: &str,
        records: &[ShowRecord],
    ) -> Option<BTreeMap<String, Embedding>> {
        let blob = match self.cache.get(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!(key = %key, "Embedding cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Embedding cache read failed");
                return None;
            }
        };

        let entry = match CachedCatalog::from_blob(&blob) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Discarding corrupt embedding cache");
                return None;
            }
        };

        if let Some(reason) = entry.rejection_reason(fingerprint, model, records) {
            tracing::warn!(key = %key, reason = %reason, "Discarding stale embedding cache");
            return None;
        }

        tracing::debug!(key = %key, generated_at = %entry.generated_at, "Embedding cache hit");
        Some(entry.vectors)
    }

    async fn write_cache(&self, key: &CacheKey, fingerprint: &str, model: &str, catalog: &Catalog) {
        let entry = CachedCatalog {
            fingerprint: fingerprint.to_string(),
            model: model.to_string(),
            dimensions: catalog.dimensions(),
            generated_at: Utc::now(),
            vectors: catalog.as_map().clone(),
        };

        let blob = match entry.to_blob() {
            Ok(blob) => blob,
            Err(e) => {
                tracing::error!(error = %e, "Embedding cache serialization error");
                return;
            }
        };

        if let Err(e) = self.cache.put(key, blob).await {
            tracing::error!(error = %e, key = %key, "Failed to persist embedding cache");
        }
    }
}

/// Requests one vector per record, in record order
async fn generate(
    embedder: &dyn Embedder,
    records: &[ShowRecord],
) -> AppResult<BTreeMap<String, Embedding>> {
    let mut vectors = BTreeMap::new();
    let mut dimensions: Option<usize> = None;

    for (i, record) in records.iter().enumerate() {
        let vector = embedder
            .embed(&record.embedding_text())
            .await
            .map_err(|e| match e {
                AppError::EmbeddingUnavailable(_) => e,
                other => AppError::EmbeddingUnavailable(other.to_string()),
            })?;

        if vector.is_empty() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "empty embedding for '{}'",
                record.title
            )));
        }

        let expected = *dimensions.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(AppError::EmbeddingUnavailable(format!(
                "inconsistent embedding dimensions for '{}': expected {}, got {}",
                record.title,
                expected,
                vector.len()
            )));
        }

        vectors.insert(record.title.clone(), vector);

        if (i + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(done = i + 1, total = records.len(), "Embedding progress");
        }
    }

    Ok(vectors)
}

/// Hex SHA-256 over the model id and every (title, text) pair in title order
pub fn catalog_fingerprint(model: &str, records: &[ShowRecord]) -> String {
    let mut sorted: Vec<&ShowRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title));

    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    for record in sorted {
        hasher.update(record.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.embedding_text().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
