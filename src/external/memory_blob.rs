use async_trait::async_trait;
use dashmap::DashMap;

use crate::external::blob_store::{BlobStore, StorageError};

/// Blob store kept entirely in memory. Backs fixtures and tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<(String, String), String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, container: &str, path: &str, content: impl Into<String>) {
        self.blobs
            .insert((container.to_string(), path.to_string()), content.into());
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch_text(
        &self,
        container: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        self.blobs
            .get(&(container.to_string(), path.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                container: container.to_string(),
                path: path.to_string(),
            })
    }

    async fn list_blob_names(
        &self,
        container: &str,
    ) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self
            .blobs
            .iter()
            .filter(|entry| entry.key().0 == container)
            .map(|entry| entry.key().1.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
