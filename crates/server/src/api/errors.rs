use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::state::AppState;

use super::{api_error, ApiError};

/// Most recent error-log entry
#[utoipa::path(
    get,
    path = "/last_error",
    tag = "Errors",
    responses(
        (status = 200, description = "Last JSON entry of errors.log", body = Object),
        (status = 404, description = "No errors recorded", body = super::ErrorBody),
        (status = 500, description = "Log could not be read", body = super::ErrorBody)
    )
)]
pub async fn last_error(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.ingest.errors().last().await {
        Ok(Some(entry)) => Ok(Json(entry)),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "no errors recorded")),
        Err(e) => {
            warn!("Failed to read error log: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
