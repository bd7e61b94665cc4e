use async_trait::async_trait;
use std::{collections::HashSet, path::PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::ShowRecord,
};

/// Supplier of catalog rows
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self) -> AppResult<Vec<ShowRecord>>;

    /// Source description for logging
    fn describe(&self) -> String;
}

/// JSON array of show records on disk
#[derive(Debug, Clone)]
pub struct JsonDataset {
    path: PathBuf,
}

impl JsonDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for JsonDataset {
    async fn load(&self) -> AppResult<Vec<ShowRecord>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::DataUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let rows: Vec<ShowRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::DataUnavailable(format!("cannot parse {}: {}", self.path.display(), e))
        })?;

        normalize_records(rows)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Rows held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticDataset {
    rows: Vec<ShowRecord>,
}

impl StaticDataset {
    pub fn new(rows: Vec<ShowRecord>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl DatasetSource for StaticDataset {
    async fn load(&self) -> AppResult<Vec<ShowRecord>> {
        normalize_records(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} rows)", self.rows.len())
    }
}

/// Trims titles, drops blank and duplicate titles (first row wins)
fn normalize_records(rows: Vec<ShowRecord>) -> AppResult<Vec<ShowRecord>> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for mut row in rows {
        row.title = row.title.trim().to_string();
        if row.title.is_empty() {
            tracing::warn!("Skipping dataset row with empty title");
            continue;
        }
        if !seen.insert(row.title.clone()) {
            tracing::warn!(title = %row.title, "Skipping duplicate dataset title");
            continue;
        }
        records.push(row);
    }

    if records.is_empty() {
        return Err(AppError::DataUnavailable(
            "dataset contains no shows".to_string(),
        ));
    }

    Ok(records)
}
