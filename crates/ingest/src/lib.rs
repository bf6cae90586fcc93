//! Ingestion: accept a submission, assign a job id, persist the raw bytes.
//!
//! - [`IngestService`]: the single `ingest` operation plus stage dispatch
//! - [`Submission`]: payload and client-supplied metadata for one request
//! - [`stage`]: the ETL processing-stage capability (parser, schema
//!   inference, transformer), none of which is implemented yet

pub mod error;
pub mod service;
pub mod stage;
pub mod submission;

pub use error::IngestError;
pub use service::{IngestReceipt, IngestService};
pub use stage::{ProcessingStage, StageError, StageKind, StageOutput};
pub use submission::Submission;
