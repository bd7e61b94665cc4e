use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CacheKey, EmbeddingCache};
use crate::error::AppResult;

/// Process-local cache, mainly a test fixture
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry directly, bypassing the trait
    pub async fn insert(&self, key: &CacheKey, blob: Vec<u8>) {
        self.entries.write().await.insert(key.to_string(), blob);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl EmbeddingCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }

    async fn put(&self, key: &CacheKey, blob: Vec<u8>) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), blob);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        let key = CacheKey::Catalog("k".to_string());

        tokio_test::block_on(async {
            assert_eq!(cache.get(&key).await.unwrap(), None);
            cache.put(&key, vec![1, 2, 3]).await.unwrap();
            assert_eq!(cache.get(&key).await.unwrap(), Some(vec![1, 2, 3]));
            assert_eq!(cache.len().await, 1);
        });
    }
}
