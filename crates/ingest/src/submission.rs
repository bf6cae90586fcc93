use bytes::Bytes;

use auraverse_core::{generate_source_id, validate_source_id, IngestJob, DEFAULT_CONTENT_TYPE};

use crate::error::IngestError;

/// One document as received from a client, before a job id exists.
#[derive(Debug, Clone)]
pub struct Submission {
    pub payload: Bytes,
    pub content_type: String,
    pub filename: Option<String>,
    pub source_id: Option<String>,
}

impl Submission {
    pub fn new(payload: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            filename: None,
            source_id: None,
        }
    }

    pub fn filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn source_id(mut self, source_id: Option<String>) -> Self {
        self.source_id = source_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self
    }

    /// Validate the submission and assign it a job.
    ///
    /// A missing source id is replaced by a generated one.
    pub fn into_job(self) -> Result<IngestJob, IngestError> {
        let source_id = match self.source_id {
            Some(id) => {
                validate_source_id(&id)?;
                id
            }
            None => generate_source_id(),
        };
        let job = IngestJob::new(self.payload, self.content_type)?
            .with_filename(self.filename)
            .with_source_id(Some(source_id));
        Ok(job)
    }
}
