use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Where generated embeddings are persisted between runs
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    File,
    Redis,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// JSON file holding the show catalog rows
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    #[serde(default = "default_cache_backend")]
    pub cache_backend: CacheBackend,

    /// Directory used by the file cache backend
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Expiry for Redis cache entries; entries never expire when unset
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// OpenAI API key; when absent the catalog is served from cache only
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Upper bound on the whole embedding generation step
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Fuzzy matches strictly above this confidence skip confirmation
    #[serde(default = "default_auto_accept_threshold")]
    pub auto_accept_threshold: f64,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("imdb_tvshows.json")
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::File
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
    300
}

fn default_auto_accept_threshold() -> f64 {
    90.0
}

fn default_top_n() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// API key with blank values treated as missing
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
