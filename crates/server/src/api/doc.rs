//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "auraverse ingestion API",
        version = "0.1.0",
        description = "Accepts documents, assigns job ids, and keeps the raw bytes in a write-once store.",
    ),
    tags(
        (name = "Health", description = "Server liveness"),
        (name = "Ingest", description = "Document submission"),
        (name = "Jobs", description = "Stored job metadata and raw payloads"),
        (name = "Errors", description = "Server-side failure log"),
        (name = "Stages", description = "ETL processing stages (not implemented yet)"),
    ),
    paths(
        crate::api::health::health,
        crate::api::ingest::ingest,
        crate::api::jobs::list_jobs,
        crate::api::jobs::get_job,
        crate::api::jobs::get_raw,
        crate::api::errors::last_error,
        crate::api::stages::list_stages,
        crate::api::stages::run_stage,
    ),
    components(schemas(
        crate::api::ErrorBody,
        crate::api::health::HealthResponse,
        crate::api::ingest::IngestResponse,
        crate::api::stages::StageInfo,
    ))
)]
pub struct ApiDoc;
