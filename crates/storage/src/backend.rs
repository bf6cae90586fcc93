use std::path::{Path, PathBuf};
use std::sync::Arc;

use object_store::local::LocalFileSystem;
use object_store::ObjectStore;
use tracing::info;

use crate::error::StorageError;

/// Local filesystem backend rooted at the configured store directory.
pub struct LocalBackend {
    pub store: Arc<dyn ObjectStore>,
    pub root: PathBuf,
}

impl LocalBackend {
    /// Open (creating if needed) the store directory.
    pub fn new(root: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let canonical = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let store = LocalFileSystem::new_with_prefix(&canonical)
            .map_err(|e| StorageError::Other(format!("local filesystem error: {e}")))?;
        info!("Storage: local backend at {}", canonical.display());
        Ok(Self {
            store: Arc::new(store),
            root: canonical,
        })
    }

    /// Filesystem path of an object key under this backend.
    pub fn local_path(&self, key: &object_store::path::Path) -> PathBuf {
        key.parts()
            .fold(self.root.clone(), |acc, part| acc.join(part.as_ref()))
    }
}
