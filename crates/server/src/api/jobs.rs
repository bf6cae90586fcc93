//! Read-only views of the raw store.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;

use auraverse_core::{JobId, RawMeta, DEFAULT_CONTENT_TYPE};
use auraverse_storage::StorageError;

use crate::state::AppState;

use super::{api_error, parse_job_id, ApiError};

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    /// Maximum number of jobs to return (default 50).
    pub limit: Option<usize>,
}

fn lookup_error(job_id: &JobId, e: StorageError) -> ApiError {
    if e.is_not_found() {
        api_error(StatusCode::NOT_FOUND, format!("job not found: {job_id}"))
    } else {
        warn!("Failed to read job {}: {}", job_id, e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

/// List stored jobs, newest first
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Jobs",
    params(ListParams),
    responses(
        (status = 200, description = "Metadata of stored jobs", body = Vec<Object>),
        (status = 500, description = "Store could not be listed", body = super::ErrorBody)
    )
)]
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RawMeta>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    state
        .ingest
        .store()
        .list(limit)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Metadata of one job
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = String, Path, description = "Job id returned by /ingest")
    ),
    responses(
        (status = 200, description = "Metadata sidecar", body = Object),
        (status = 400, description = "Malformed job id", body = super::ErrorBody),
        (status = 404, description = "Job not found", body = super::ErrorBody)
    )
)]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<RawMeta>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    state
        .ingest
        .store()
        .read_meta(&job_id)
        .await
        .map(Json)
        .map_err(|e| lookup_error(&job_id, e))
}

/// Stored payload bytes
///
/// Returned byte-for-byte with the content type recorded at ingestion.
#[utoipa::path(
    get,
    path = "/raw/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = String, Path, description = "Job id returned by /ingest")
    ),
    responses(
        (status = 200, description = "Raw payload", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Malformed job id", body = super::ErrorBody),
        (status = 404, description = "Job not found", body = super::ErrorBody)
    )
)]
pub async fn get_raw(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let store = state.ingest.store();

    let meta = store
        .read_meta(&job_id)
        .await
        .map_err(|e| lookup_error(&job_id, e))?;
    let payload: Bytes = store
        .read(&job_id)
        .await
        .map_err(|e| lookup_error(&job_id, e))?;

    let content_type = HeaderValue::from_str(&meta.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Ok(([(header::CONTENT_TYPE, content_type)], payload))
}
