//! Write-once raw payload store.
//!
//! Layout under the store root:
//!
//! ```text
//! raw/<job_id>.bin        payload bytes, exactly as submitted
//! raw/<job_id>.meta.json  RawMeta sidecar
//! ```
//!
//! Both objects are written with `PutMode::Create`, so an existing key is
//! never overwritten.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutMode};
use tracing::debug;

use auraverse_core::{IngestJob, JobId, RawMeta};

use crate::backend::LocalBackend;
use crate::error::StorageError;

const RAW_PREFIX: &str = "raw";
const PAYLOAD_SUFFIX: &str = ".bin";
const META_SUFFIX: &str = ".meta.json";

pub struct RawStore {
    backend: LocalBackend,
}

impl RawStore {
    /// Open a raw store rooted at `root`.
    pub fn new(root: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root.join(RAW_PREFIX))?;
        Ok(Self {
            backend: LocalBackend::new(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.backend.root
    }

    fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.backend.store
    }

    pub fn payload_key(job_id: &JobId) -> ObjectPath {
        ObjectPath::from(format!("{RAW_PREFIX}/{job_id}{PAYLOAD_SUFFIX}"))
    }

    pub fn meta_key(job_id: &JobId) -> ObjectPath {
        ObjectPath::from(format!("{RAW_PREFIX}/{job_id}{META_SUFFIX}"))
    }

    /// Persist the payload unmodified, then its metadata sidecar.
    ///
    /// Returns the sidecar that was written. Nothing is cleaned up if the
    /// sidecar write fails after the payload landed.
    pub async fn write(&self, job: &IngestJob) -> Result<RawMeta, StorageError> {
        let job_id = job.job_id();
        let payload_key = Self::payload_key(&job_id);
        let raw_path = self.backend.local_path(&payload_key);
        let meta = job.meta(raw_path.display().to_string());

        self.store()
            .put_opts(
                &payload_key,
                job.raw_payload().clone().into(),
                PutMode::Create.into(),
            )
            .await?;

        let meta_bytes = serde_json::to_vec_pretty(&meta)?;
        self.store()
            .put_opts(
                &Self::meta_key(&job_id),
                Bytes::from(meta_bytes).into(),
                PutMode::Create.into(),
            )
            .await?;

        debug!("Stored {} bytes for job {}", meta.size_bytes, job_id);
        Ok(meta)
    }

    /// Read back the stored payload bytes.
    pub async fn read(&self, job_id: &JobId) -> Result<Bytes, StorageError> {
        let result = self.store().get(&Self::payload_key(job_id)).await?;
        Ok(result.bytes().await?)
    }

    /// Read the metadata sidecar for a job.
    pub async fn read_meta(&self, job_id: &JobId) -> Result<RawMeta, StorageError> {
        let result = self.store().get(&Self::meta_key(job_id)).await?;
        let bytes = result.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// List stored jobs, newest first.
    ///
    /// Candidates are picked by sidecar modification time from the listing,
    /// so only `limit` sidecars are read. Sidecars that cannot be read or
    /// parsed are skipped.
    pub async fn list(&self, limit: usize) -> Result<Vec<RawMeta>, StorageError> {
        let prefix = ObjectPath::from(RAW_PREFIX);
        let mut stream = self.store().list(Some(&prefix));
        let mut candidates = Vec::new();

        while let Some(object) = stream.try_next().await? {
            if object.location.as_ref().ends_with(META_SUFFIX) {
                candidates.push((object.last_modified, object.location));
            }
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.truncate(limit);

        let mut metas = Vec::with_capacity(candidates.len());
        for (_, key) in candidates {
            let bytes = match self.store().get(&key).await {
                Ok(result) => result.bytes().await?,
                Err(e) => {
                    debug!("Skipping {}: {}", key, e);
                    continue;
                }
            };
            match serde_json::from_slice::<RawMeta>(&bytes) {
                Ok(meta) => metas.push(meta),
                Err(e) => debug!("Skipping unreadable sidecar {}: {}", key, e),
            }
        }

        metas.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(metas)
    }
}
