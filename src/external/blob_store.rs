use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage not configured: {0}")]
    NotConfigured(String),

    #[error("blob not found: {container}/{path}")]
    NotFound { container: String, path: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("invalid blob path: {0}")]
    InvalidPath(String),
}

/// Read access to a blob container.
///
/// Credentials and transport are the implementation's concern; callers only
/// see text content or a [`StorageError`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch_text(
        &self,
        container: &str,
        path: &str,
    ) -> Result<String, StorageError>;

    /// Full names of every blob in the container. Paged listings are walked
    /// to the end before returning.
    async fn list_blob_names(
        &self,
        container: &str,
    ) -> Result<Vec<String>, StorageError>;
}

/// Rejects blob paths that could step outside their container.
pub(crate) fn check_blob_path(container: &str, path: &str) -> Result<(), StorageError> {
    let escapes = path
        .split('/')
        .any(|segment| segment == ".." || segment == ".");

    if container.is_empty() || container.contains('/') || path.is_empty() || escapes {
        return Err(StorageError::InvalidPath(format!("{}/{}", container, path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_nested_paths() {
        assert!(check_blob_path("symbols", "aapl/hour/1/data/aapl_historical.csv").is_ok());
    }

    #[test]
    fn test_rejects_parent_segments() {
        assert!(check_blob_path("symbols", "../secrets.csv").is_err());
        assert!(check_blob_path("symbols", "aapl/../../x").is_err());
        assert!(check_blob_path("", "aapl/x.csv").is_err());
        assert!(check_blob_path("a/b", "x.csv").is_err());
    }
}
