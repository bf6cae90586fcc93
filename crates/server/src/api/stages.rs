use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use auraverse_ingest::{StageKind, StageOutput};

use crate::state::AppState;

use super::{parse_job_id, stage_error, ApiError};

#[derive(Serialize, ToSchema)]
pub struct StageInfo {
    pub name: &'static str,
    pub implemented: bool,
}

/// Available processing stages
#[utoipa::path(
    get,
    path = "/stages",
    tag = "Stages",
    responses(
        (status = 200, description = "Stage names and whether they are implemented", body = Vec<StageInfo>)
    )
)]
pub async fn list_stages() -> Json<Vec<StageInfo>> {
    Json(
        StageKind::ALL
            .iter()
            .map(|kind| StageInfo {
                name: kind.name(),
                implemented: kind.stage().is_implemented(),
            })
            .collect(),
    )
}

/// Run a processing stage against a stored job
///
/// No stage has an implementation yet, so an existing job always gets 501.
#[utoipa::path(
    post,
    path = "/jobs/{job_id}/stages/{stage}",
    tag = "Stages",
    params(
        ("job_id" = String, Path, description = "Job id returned by /ingest"),
        ("stage" = String, Path, description = "parser, schema_inference or transformer")
    ),
    responses(
        (status = 200, description = "Stage output", body = Object),
        (status = 400, description = "Malformed job id", body = super::ErrorBody),
        (status = 404, description = "Unknown job or stage", body = super::ErrorBody),
        (status = 501, description = "Stage not implemented", body = super::ErrorBody)
    )
)]
pub async fn run_stage(
    State(state): State<Arc<AppState>>,
    Path((job_id, stage)): Path<(String, String)>,
) -> Result<Json<StageOutput>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let kind: StageKind = stage.parse().map_err(stage_error)?;
    state
        .ingest
        .run_stage(&job_id, kind)
        .await
        .map(Json)
        .map_err(stage_error)
}
