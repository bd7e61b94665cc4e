use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use showsuggest::{
    cache::{redis::create_redis_client, EmbeddingCache, FileCache, RedisCache},
    config::{CacheBackend, Config},
    routes::{create_router, AppState},
    services::{
        dataset::JsonDataset,
        embeddings::OpenAiEmbedder,
        Recommender, VectorStoreLoader,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("showsuggest=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let cache: Arc<dyn EmbeddingCache> = match config.cache_backend {
        CacheBackend::File => Arc::new(FileCache::new(&config.cache_dir)),
        CacheBackend::Redis => Arc::new(RedisCache::new(
            create_redis_client(&config.redis_url)?,
            config.cache_ttl_secs,
        )),
    };

    let mut loader = VectorStoreLoader::new(
        Arc::new(JsonDataset::new(&config.dataset_path)),
        cache,
        config.embedding_model.clone(),
    )
    .with_timeout(config.embedding_timeout());

    match config.api_key() {
        Some(key) => {
            let embedder = OpenAiEmbedder::new(
                key.to_string(),
                config.openai_api_url.clone(),
                config.embedding_model.clone(),
            )?;
            loader = loader.with_embedder(Arc::new(embedder));
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; serving from the embedding cache only");
        }
    }

    let store = loader.load().await?;
    let recommender = Recommender::new(store, config.auto_accept_threshold);
    let app = create_router(AppState::new(recommender, config.default_top_n));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
