//! `POST /ingest` and its `/upload` alias.
//!
//! Accepts two body shapes:
//! - multipart/form-data with a `file` field or a `json` text field, plus an
//!   optional `source_id` field. Pasted text that does not parse as JSON is
//!   recorded as `text/plain`
//! - any other body, stored as-is under the request's Content-Type
//!
//! The source id may also come from the `X-Source-Id` header; a form field
//! takes precedence.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use auraverse_ingest::{IngestReceipt, Submission};

use crate::state::AppState;

use super::{api_error, ingest_error, ApiError};

pub const SOURCE_ID_HEADER: &str = "x-source-id";

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub job_id: String,
    #[schema(value_type = String, format = DateTime)]
    pub received_at: DateTime<Utc>,
    /// Absolute path of the stored payload on the server.
    pub raw_path: String,
    pub size_bytes: u64,
    pub source_id: Option<String>,
}

impl From<IngestReceipt> for IngestResponse {
    fn from(r: IngestReceipt) -> Self {
        Self {
            job_id: r.job_id.to_string(),
            received_at: r.received_at,
            raw_path: r.raw_path,
            size_bytes: r.size_bytes,
            source_id: r.source_id,
        }
    }
}

struct FilePart {
    bytes: Bytes,
    filename: Option<String>,
    content_type: Option<String>,
}

/// Ingest one document
///
/// Stores the payload unmodified under a fresh job id. Nothing is parsed or
/// validated beyond rejecting an empty body.
#[utoipa::path(
    post,
    path = "/ingest",
    tag = "Ingest",
    params(
        ("X-Source-Id" = Option<String>, Header, description = "Source identifier ([A-Za-z0-9_-], max 64)")
    ),
    request_body(content_type = "multipart/form-data", description = "`file` or `json` field, optional `source_id`; any other content type is stored as-is"),
    responses(
        (status = 201, description = "Payload stored", body = IngestResponse),
        (status = 400, description = "Empty or malformed submission", body = super::ErrorBody),
        (status = 413, description = "Body exceeds MAX_UPLOAD_MB"),
        (status = 500, description = "Storage write failed", body = super::ErrorBody)
    )
)]
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let submission = submission_from_request(request).await.inspect_err(|(status, body)| {
        warn!("Rejected submission ({}): {}", status, body.error);
    })?;

    match state.ingest.ingest(submission).await {
        Ok(receipt) => Ok((StatusCode::CREATED, Json(receipt.into()))),
        Err(e) => {
            if e.status_code() < 500 {
                warn!("Rejected submission: {}", e);
            }
            Err(ingest_error(e))
        }
    }
}

async fn submission_from_request(request: Request) -> Result<Submission, ApiError> {
    let headers = request.headers();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let header_source_id = match headers.get(SOURCE_ID_HEADER) {
        Some(v) => Some(
            v.to_str()
                .map_err(|_| {
                    api_error(StatusCode::BAD_REQUEST, "X-Source-Id header is not valid UTF-8")
                })?
                .to_string(),
        ),
        None => None,
    };

    let is_multipart = content_type.as_deref().is_some_and(is_multipart_form);

    let submission = if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| api_error(e.status(), e.body_text()))?;
        from_multipart(multipart).await?
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|e| api_error(e.status(), e.body_text()))?;
        Submission::new(body, content_type.as_deref())
    };

    if submission.source_id.is_some() {
        Ok(submission)
    } else {
        Ok(submission.source_id(header_source_id))
    }
}

/// Media types are case-insensitive, so `Multipart/Form-Data` counts too.
fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("multipart/form-data"))
}

/// Content type recorded for the pasted-text field: the part's own type when
/// the client sent one, otherwise JSON only if the text parses as JSON.
fn text_content_type(part: &FilePart) -> &str {
    match part.content_type.as_deref() {
        Some(ct) if !ct.trim().is_empty() => ct,
        _ if serde_json::from_slice::<serde::de::IgnoredAny>(&part.bytes).is_ok() => {
            "application/json"
        }
        _ => "text/plain",
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    api_error(e.status(), e.body_text())
}

/// Pick the payload out of a form. A non-empty `file` wins over `json`;
/// unknown fields are ignored.
async fn from_multipart(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut file: Option<FilePart> = None;
    let mut text: Option<FilePart> = None;
    let mut source_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "json" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                let part = FilePart {
                    bytes,
                    filename,
                    content_type,
                };
                if name == "file" {
                    file = Some(part);
                } else {
                    text = Some(part);
                }
            }
            "source_id" => source_id = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let submission = match (file, text) {
        (Some(f), Some(t)) if f.bytes.is_empty() => {
            Submission::new(t.bytes.clone(), Some(text_content_type(&t)))
        }
        (Some(f), _) => Submission::new(f.bytes, f.content_type.as_deref()).filename(f.filename),
        (None, Some(t)) => Submission::new(t.bytes.clone(), Some(text_content_type(&t))),
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "multipart body needs a 'file' or 'json' field",
            ))
        }
    };
    Ok(submission.source_id(source_id))
}
