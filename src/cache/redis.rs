use ::redis::{AsyncCommands, Client};

use super::{CacheKey, EmbeddingCache};
use crate::error::AppResult;

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis-backed cache storing each blob under its key's display form
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Client,
    ttl: Option<u64>,
}

impl RedisCache {
    /// `ttl` in seconds; `None` keeps entries until evicted
    pub fn new(redis_client: Client, ttl: Option<u64>) -> Self {
        Self { redis_client, ttl }
    }
}

#[async_trait::async_trait]
impl EmbeddingCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<Vec<u8>>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<Vec<u8>> = conn.get(key.to_string()).await?;
        Ok(cached)
    }

    async fn put(&self, key: &CacheKey, blob: Vec<u8>) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        match self.ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key.to_string(), blob, ttl).await?;
            }
            None => {
                let _: () = conn.set(key.to_string(), blob).await?;
            }
        }
        tracing::debug!(key = %key, ttl = ?self.ttl, "Cache entry stored in Redis");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    // Needs a running Redis at REDIS_URL
    #[tokio::test]
    #[ignore]
    async fn test_put_then_get() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        let cache = RedisCache::new(client.clone(), Some(60));

        let key = CacheKey::Catalog("showsuggest_test_key".to_string());
        cache.put(&key, b"payload".to_vec()).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"payload".to_vec()));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
