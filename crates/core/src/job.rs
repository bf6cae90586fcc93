use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CoreError;

/// Content type recorded when the client did not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MAX_SOURCE_ID_LEN: usize = 64;

// ── Job identifier ────────────────────────────────────────────

/// Opaque, randomly generated job identifier (UUID v4, hyphenated form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidJobId(s.to_string()))
    }
}

// ── Source identifier ─────────────────────────────────────────

/// Check that a caller-supplied source id is safe to record and to use in paths.
pub fn validate_source_id(id: &str) -> Result<(), CoreError> {
    let ok = !id.is_empty()
        && id.len() <= MAX_SOURCE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidSourceId(id.to_string()))
    }
}

/// Generate a source id for submissions that did not name one (`src_` + 8 hex chars).
pub fn generate_source_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("src_{}", &hex[..8])
}

// ── Ingest job ────────────────────────────────────────────────

/// One accepted ingestion request.
///
/// The identifier and receive time are fixed when the job is constructed,
/// which always happens before anything is written to the raw store.
#[derive(Debug, Clone)]
pub struct IngestJob {
    job_id: JobId,
    received_at: DateTime<Utc>,
    content_type: String,
    filename: Option<String>,
    source_id: Option<String>,
    raw_payload: Bytes,
}

impl IngestJob {
    /// Create a job for a non-empty payload.
    pub fn new(raw_payload: Bytes, content_type: impl Into<String>) -> Result<Self, CoreError> {
        if raw_payload.is_empty() {
            return Err(CoreError::EmptyPayload);
        }
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };
        Ok(Self {
            job_id: JobId::generate(),
            received_at: Utc::now(),
            content_type,
            filename: None,
            source_id: None,
            raw_payload,
        })
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename.filter(|f| !f.is_empty());
        self
    }

    pub fn with_source_id(mut self, source_id: Option<String>) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn raw_payload(&self) -> &Bytes {
        &self.raw_payload
    }

    /// Hex-encoded SHA-256 of the payload.
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(&self.raw_payload))
    }

    /// Build the metadata sidecar for this job stored at `raw_path`.
    pub fn meta(&self, raw_path: impl Into<String>) -> RawMeta {
        RawMeta {
            job_id: self.job_id,
            received_at: self.received_at,
            content_type: self.content_type.clone(),
            filename: self.filename.clone(),
            source_id: self.source_id.clone(),
            size_bytes: self.raw_payload.len() as u64,
            sha256: self.checksum(),
            raw_path: raw_path.into(),
        }
    }
}

/// Metadata written next to each raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeta {
    pub job_id: JobId,
    pub received_at: DateTime<Utc>,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub size_bytes: u64,
    pub sha256: String,
    pub raw_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        let err = IngestJob::new(Bytes::new(), "application/json").unwrap_err();
        assert_eq!(err, CoreError::EmptyPayload);
    }

    #[test]
    fn new_jobs_get_distinct_ids() {
        let a = IngestJob::new(Bytes::from_static(b"{\"x\": \"y\"}"), "application/json").unwrap();
        let b = IngestJob::new(Bytes::from_static(b"{\"x\": \"y\"}"), "application/json").unwrap();
        assert_ne!(a.job_id(), b.job_id());
    }

    #[test]
    fn blank_content_type_falls_back_to_octet_stream() {
        let job = IngestJob::new(Bytes::from_static(b"abc"), "  ").unwrap();
        assert_eq!(job.content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn job_id_roundtrips_through_display() {
        let id = JobId::generate();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_job_id_is_rejected() {
        let err = "not-a-uuid".parse::<JobId>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidJobId(_)));
    }

    #[test]
    fn meta_describes_payload() {
        let job = IngestJob::new(Bytes::from_static(b"{\"a\": 1}"), "application/json")
            .unwrap()
            .with_filename(Some("a.json".into()))
            .with_source_id(Some("src_demo".into()));
        let meta = job.meta("store/raw/x.bin");

        assert_eq!(meta.job_id, job.job_id());
        assert_eq!(meta.size_bytes, 8);
        assert_eq!(meta.filename.as_deref(), Some("a.json"));
        assert_eq!(meta.source_id.as_deref(), Some("src_demo"));
        assert_eq!(meta.sha256.len(), 64);
        assert_eq!(meta.raw_path, "store/raw/x.bin");
    }

    #[test]
    fn empty_filename_is_dropped() {
        let job = IngestJob::new(Bytes::from_static(b"x"), "text/plain")
            .unwrap()
            .with_filename(Some(String::new()));
        assert!(job.filename().is_none());
    }

    #[test]
    fn source_id_rules() {
        assert!(validate_source_id("orders_2024-q1").is_ok());
        assert!(validate_source_id("").is_err());
        assert!(validate_source_id("../etc").is_err());
        assert!(validate_source_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn generated_source_id_is_valid() {
        let id = generate_source_id();
        assert!(id.starts_with("src_"));
        assert_eq!(id.len(), 12);
        validate_source_id(&id).unwrap();
    }
}
