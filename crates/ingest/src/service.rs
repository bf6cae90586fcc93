use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use auraverse_core::JobId;
use auraverse_storage::{ErrorLog, RawStore};

use crate::error::IngestError;
use crate::stage::{StageError, StageInput, StageKind, StageOutput};
use crate::submission::Submission;

/// What the caller gets back for an accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub job_id: JobId,
    pub received_at: DateTime<Utc>,
    pub raw_path: String,
    pub size_bytes: u64,
    pub source_id: Option<String>,
}

/// Accepts submissions and writes them to the raw store.
///
/// Requests share nothing but the store directory: every job writes to keys
/// derived from its own fresh id, so no locking is needed.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<RawStore>,
    errors: Arc<ErrorLog>,
}

impl IngestService {
    pub fn new(store: Arc<RawStore>, errors: Arc<ErrorLog>) -> Self {
        Self { store, errors }
    }

    pub fn store(&self) -> &Arc<RawStore> {
        &self.store
    }

    pub fn errors(&self) -> &Arc<ErrorLog> {
        &self.errors
    }

    /// Persist one submission and return its receipt.
    ///
    /// Empty or malformed submissions fail before anything is written.
    pub async fn ingest(&self, submission: Submission) -> Result<IngestReceipt, IngestError> {
        let job = submission.into_job()?;
        let job_id = job.job_id();

        match self.store.write(&job).await {
            Ok(meta) => {
                info!(
                    "Accepted job {} ({} bytes, {}, source={})",
                    job_id,
                    meta.size_bytes,
                    meta.content_type,
                    meta.source_id.as_deref().unwrap_or("-")
                );
                Ok(IngestReceipt {
                    job_id,
                    received_at: meta.received_at,
                    raw_path: meta.raw_path,
                    size_bytes: meta.size_bytes,
                    source_id: meta.source_id,
                })
            }
            Err(source) => {
                let context = serde_json::json!({
                    "job_id": job_id,
                    "filename": job.filename(),
                    "source_id": job.source_id(),
                    "content_type": job.content_type(),
                });
                let error_id = self.errors.record(context, &source).await;
                error!("Failed to store job {} ({}): {}", job_id, error_id, source);
                Err(IngestError::StorageWrite { source, error_id })
            }
        }
    }

    /// Run a processing stage against a stored job.
    pub async fn run_stage(
        &self,
        job_id: &JobId,
        kind: StageKind,
    ) -> Result<StageOutput, StageError> {
        let meta = self.store.read_meta(job_id).await.map_err(|e| {
            if e.is_not_found() {
                StageError::JobNotFound(*job_id)
            } else {
                StageError::Storage(e)
            }
        })?;
        let payload = self.store.read(job_id).await?;

        let input = StageInput {
            job_id: *job_id,
            meta,
            payload,
        };
        kind.stage().process(&input).await
    }
}
