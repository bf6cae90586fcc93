//! ETL processing stages.
//!
//! Parsing, schema inference, and transformation are modeled as one
//! capability with a variant per stage. No variant has an implementation yet:
//! every stage answers [`StageError::NotImplemented`], and ingestion never
//! invokes a stage on its own.

mod parser;
mod schema_infer;
mod transformer;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use auraverse_core::{JobId, RawMeta};
use auraverse_storage::StorageError;

pub use parser::Parser;
pub use schema_infer::SchemaInference;
pub use transformer::Transformer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Parser,
    SchemaInference,
    Transformer,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [
        StageKind::Parser,
        StageKind::SchemaInference,
        StageKind::Transformer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Parser => "parser",
            StageKind::SchemaInference => "schema_inference",
            StageKind::Transformer => "transformer",
        }
    }

    /// Instantiate the stage for this kind.
    pub fn stage(&self) -> Box<dyn ProcessingStage> {
        match self {
            StageKind::Parser => Box::new(Parser),
            StageKind::SchemaInference => Box::new(SchemaInference),
            StageKind::Transformer => Box::new(Transformer),
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StageKind {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| StageError::UnknownStage(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage '{0}' is not implemented")]
    NotImplemented(StageKind),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StageError {
    /// Map to an HTTP status code for API responses.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotImplemented(_) => 501,
            Self::UnknownStage(_) | Self::JobNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}

/// Everything a stage may look at for one job.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub job_id: JobId,
    pub meta: RawMeta,
    pub payload: Bytes,
}

/// Result of running a stage against a job.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub stage: StageKind,
    pub job_id: JobId,
    pub document: serde_json::Value,
}

/// A processing step that can be run against a stored job.
#[async_trait]
pub trait ProcessingStage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn is_implemented(&self) -> bool {
        false
    }

    async fn process(&self, input: &StageInput) -> Result<StageOutput, StageError>;
}
