use std::path::Path;
use std::sync::Arc;

use auraverse_ingest::IngestService;
use auraverse_storage::{ErrorLog, RawStore, StorageError};

pub struct AppState {
    pub ingest: IngestService,
}

impl AppState {
    /// Open the raw store and error log under `store_dir`.
    pub fn open(store_dir: &Path) -> Result<Self, StorageError> {
        let store = Arc::new(RawStore::new(store_dir)?);
        let errors = Arc::new(ErrorLog::new(store.root()));
        Ok(Self {
            ingest: IngestService::new(store, errors),
        })
    }
}
