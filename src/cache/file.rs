use std::path::PathBuf;

use super::{CacheKey, EmbeddingCache};
use crate::error::AppResult;

/// On-disk cache: one file per key under a directory
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

#[async_trait::async_trait]
impl EmbeddingCache for FileCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &CacheKey, blob: Vec<u8>) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write beside the target then rename so readers never see a torn file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &blob).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), bytes = blob.len(), "Cache file written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
