use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::external::blob_store::{check_blob_path, BlobStore, StorageError};

/// Serves blobs from a directory tree laid out as `{root}/{container}/{path}`.
/// Used for local development against exported CSV files.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn fetch_text(
        &self,
        container: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        check_blob_path(container, path)?;

        let mut full_path = self.root.join(container);
        full_path.extend(path.split('/').filter(|s| !s.is_empty()));
        debug!("Reading local blob {}", full_path.display());

        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound {
                    container: container.to_string(),
                    path: path.to_string(),
                },
                _ => StorageError::Io(format!("{}: {}", full_path.display(), e)),
            })
    }

    async fn list_blob_names(
        &self,
        container: &str,
    ) -> Result<Vec<String>, StorageError> {
        if container.is_empty() || container.contains('/') || container == ".." {
            return Err(StorageError::InvalidPath(container.to_string()));
        }

        let container_dir = self.root.join(container);
        if !tokio::fs::try_exists(&container_dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            return Err(StorageError::NotFound {
                container: container.to_string(),
                path: String::new(),
            });
        }

        let mut names = Vec::new();
        let mut pending = vec![(container_dir, String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::Io(format!("{}: {}", dir.display(), e)))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                let blob_name = if prefix.is_empty() {
                    name
                } else {
                    format!("{}/{}", prefix, name)
                };

                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
                if file_type.is_dir() {
                    pending.push((entry.path(), blob_name));
                } else {
                    names.push(blob_name);
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
