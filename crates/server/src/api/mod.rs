//! HTTP endpoint modules.
//!
//! Each sub-module owns one area of the API. The shared error body and the
//! helpers that build it live here.

pub mod doc;
mod errors;
mod health;
mod ingest;
mod jobs;
mod stages;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use auraverse_core::JobId;
use auraverse_ingest::{IngestError, StageError};

// ── Shared types ─────────────────────────────────────────────────

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Id of the matching `errors.log` entry, for server-side failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            error_id: None,
            hint: None,
        }),
    )
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn ingest_error(e: IngestError) -> ApiError {
    let status = status_from(e.status_code());
    match e.error_id() {
        Some(id) => (
            status,
            Json(ErrorBody {
                error: e.to_string(),
                error_id: Some(id.to_string()),
                hint: Some("GET /last_error for the full entry".to_string()),
            }),
        ),
        None => api_error(status, e.to_string()),
    }
}

pub(crate) fn stage_error(e: StageError) -> ApiError {
    api_error(status_from(e.status_code()), e.to_string())
}

/// Parse a path segment as a job id, answering 400 when it is malformed.
pub(crate) fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse()
        .map_err(|e: auraverse_core::CoreError| api_error(StatusCode::BAD_REQUEST, e.to_string()))
}

// ── Re-exports ───────────────────────────────────────────────────

pub use errors::last_error;
pub use health::health;
pub use ingest::ingest;
pub use jobs::{get_job, get_raw, list_jobs};
pub use stages::{list_stages, run_stage};
