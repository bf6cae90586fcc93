//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use auraverse_core::config::ServerConfig;

use crate::state::AppState;
use crate::{api, ui};

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN '{}', allowing any origin", origin);
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes());

    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(api::health))
        .route("/ingest", post(api::ingest).layer(body_limit.clone()))
        // Alias used by the terminal client
        .route("/upload", post(api::ingest).layer(body_limit))
        .route("/jobs", get(api::list_jobs))
        .route("/jobs/{job_id}", get(api::get_job))
        .route("/jobs/{job_id}/stages/{stage}", post(api::run_stage))
        .route("/raw/{job_id}", get(api::get_raw))
        .route("/last_error", get(api::last_error))
        .route("/stages", get(api::list_stages))
        .layer(cors_layer(&config.cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

#[cfg(test)]
mod tests;
