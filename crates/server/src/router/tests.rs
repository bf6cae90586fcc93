use std::path::Path;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::*;

const BOUNDARY: &str = "auraverse-test-boundary";

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: "*".to_string(),
        max_upload_mb: 1,
    }
}

fn app(root: &Path) -> Router {
    let state = AppState::open(root).unwrap();
    build_router(Arc::new(state), &test_config())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// (name, filename, content type, value) per part.
fn post_multipart(uri: &str, parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n")
                    .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn raw_entries(root: &Path) -> usize {
    std::fs::read_dir(root.join("raw")).unwrap().count()
}

async fn ingest_ok(app: &Router, body: &str) -> Value {
    let (status, body) = send(app, post_json("/ingest", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", String::from_utf8_lossy(&body));
    json(&body)
}

// ── Health & UI ──────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());
}

#[tokio::test]
async fn health_ignores_missing_store() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("store");
    let app = app(&root);
    std::fs::remove_dir_all(&root).unwrap();

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn root_serves_upload_form() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("<form"));
    assert!(html.contains("/ingest"));
}

// ── Ingest ───────────────────────────────────────────────────────

#[tokio::test]
async fn json_body_roundtrips_through_raw() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let receipt = ingest_ok(&app, "{\"a\": 1}").await;
    let job_id = receipt["job_id"].as_str().unwrap();
    assert!(!job_id.is_empty());
    assert_eq!(receipt["size_bytes"], 8);
    assert!(receipt["raw_path"].as_str().unwrap().ends_with(".bin"));

    let resp = app.clone().oneshot(get(&format!("/raw/{job_id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let raw = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&raw[..], b"{\"a\": 1}");

    let (status, meta) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let meta = json(&meta);
    assert_eq!(meta["job_id"], job_id);
    assert!(meta["source_id"].as_str().unwrap().starts_with("src_"));
}

#[tokio::test]
async fn empty_body_is_rejected_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, post_json("/ingest", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());
    assert_eq!(raw_entries(tmp.path()), 0);
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_jobs() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (a, b) = tokio::join!(
        ingest_ok(&app, "{\"x\": \"y\"}"),
        ingest_ok(&app, "{\"x\": \"y\"}"),
    );
    let (a, b) = (a["job_id"].as_str().unwrap(), b["job_id"].as_str().unwrap());
    assert_ne!(a, b);

    for id in [a, b] {
        let (status, raw) = send(&app, get(&format!("/raw/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&raw[..], b"{\"x\": \"y\"}");
    }
}

#[tokio::test]
async fn multipart_file_field_keeps_filename_and_type() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let csv: &[u8] = b"id,total\n1,9.50\n";
    let req = post_multipart(
        "/upload",
        &[
            ("file", Some("orders.csv"), Some("text/csv"), csv),
            ("source_id", None, None, &b"orders"[..]),
            ("version", None, None, &b"2"[..]),
        ],
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt = json(&body);
    assert_eq!(receipt["source_id"], "orders");

    let job_id = receipt["job_id"].as_str().unwrap();
    let (_, meta) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    let meta = json(&meta);
    assert_eq!(meta["filename"], "orders.csv");
    assert_eq!(meta["content_type"], "text/csv");

    let (_, raw) = send(&app, get(&format!("/raw/{job_id}"))).await;
    assert_eq!(&raw[..], csv);
}

#[tokio::test]
async fn multipart_json_field_is_stored_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = post_multipart("/ingest", &[("json", None, None, &b"{\"name\": \"Alice\"}"[..])]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let job_id = json(&body)["job_id"].as_str().unwrap().to_string();
    let (_, meta) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    assert_eq!(json(&meta)["content_type"], "application/json");
}

#[tokio::test]
async fn empty_file_falls_back_to_json_field() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = post_multipart(
        "/upload",
        &[
            ("file", Some(""), Some("application/octet-stream"), &b""[..]),
            ("json", None, None, &b"[1, 2]"[..]),
        ],
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let job_id = json(&body)["job_id"].as_str().unwrap().to_string();
    let (_, raw) = send(&app, get(&format!("/raw/{job_id}"))).await;
    assert_eq!(&raw[..], &b"[1, 2]"[..]);
}

#[tokio::test]
async fn mixed_case_multipart_is_parsed_as_a_form() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let mut req = post_multipart("/ingest", &[("json", None, None, &b"{\"a\": 1}"[..])]);
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        format!("Multipart/Form-Data; boundary={BOUNDARY}").parse().unwrap(),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let job_id = json(&body)["job_id"].as_str().unwrap().to_string();
    let (_, raw) = send(&app, get(&format!("/raw/{job_id}"))).await;
    assert_eq!(&raw[..], b"{\"a\": 1}");
}

#[tokio::test]
async fn pasted_plain_text_is_not_recorded_as_json() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = post_multipart("/upload", &[("json", None, None, &b"name: Alice"[..])]);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let job_id = json(&body)["job_id"].as_str().unwrap().to_string();
    let resp = app.clone().oneshot(get(&format!("/raw/{job_id}"))).await.unwrap();
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
}

#[tokio::test]
async fn pasted_text_keeps_its_part_content_type() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = post_multipart(
        "/upload",
        &[("json", None, Some("application/xml"), &b"<a>1</a>"[..])],
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let job_id = json(&body)["job_id"].as_str().unwrap().to_string();
    let (_, meta) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    assert_eq!(json(&meta)["content_type"], "application/xml");
}

#[tokio::test]
async fn multipart_without_payload_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = post_multipart("/upload", &[("source_id", None, None, &b"orders"[..])]);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(raw_entries(tmp.path()), 0);
}

#[tokio::test]
async fn source_id_header_is_recorded() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header(header::CONTENT_TYPE, "text/plain")
        .header("X-Source-Id", "crm")
        .body(Body::from("name: Alice"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json(&body)["source_id"], "crm");
}

#[tokio::test]
async fn unsafe_source_id_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("X-Source-Id", "../etc")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(raw_entries(tmp.path()), 0);
}

#[tokio::test]
async fn non_utf8_source_id_header_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("X-Source-Id", HeaderValue::from_bytes(b"caf\xe9").unwrap())
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(raw_entries(tmp.path()), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let big = vec![b'a'; 2 * 1024 * 1024];
    let req = Request::builder()
        .method("POST")
        .uri("/ingest")
        .body(Body::from(big))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(raw_entries(tmp.path()), 0);
}

// ── Jobs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_job_id_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    for uri in ["/jobs/not-a-uuid", "/raw/not-a-uuid"] {
        let (status, _) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());
    let id = auraverse_core::JobId::generate();

    for uri in [format!("/jobs/{id}"), format!("/raw/{id}")] {
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn list_jobs_respects_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    for i in 0..3 {
        ingest_ok(&app, &format!("{{\"n\": {i}}}")).await;
    }

    let (status, body) = send(&app, get("/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 3);

    let (_, body) = send(&app, get("/jobs?limit=2")).await;
    assert_eq!(json(&body).as_array().unwrap().len(), 2);
}

// ── Stages ───────────────────────────────────────────────────────

#[tokio::test]
async fn stages_are_listed_as_unimplemented() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, body) = send(&app, get("/stages")).await;
    assert_eq!(status, StatusCode::OK);
    let stages = json(&body);
    let names: Vec<&str> = stages
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["parser", "schema_inference", "transformer"]);
    assert!(stages.as_array().unwrap().iter().all(|s| s["implemented"] == false));
}

#[tokio::test]
async fn running_a_stage_is_not_implemented() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());
    let receipt = ingest_ok(&app, "{\"a\": 1}").await;
    let job_id = receipt["job_id"].as_str().unwrap();

    for stage in ["parser", "schema_inference", "transformer"] {
        let req = Request::builder()
            .method("POST")
            .uri(format!("/jobs/{job_id}/stages/{stage}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{stage}");
    }

    let unknown_stage = Request::builder()
        .method("POST")
        .uri(format!("/jobs/{job_id}/stages/loader"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, unknown_stage).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unknown_job = Request::builder()
        .method("POST")
        .uri(format!("/jobs/{}/stages/parser", auraverse_core::JobId::generate()))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, unknown_job).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Errors ───────────────────────────────────────────────────────

#[tokio::test]
async fn storage_failure_is_reported_and_logged() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app(tmp.path());

    let (status, _) = send(&app, get("/last_error")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(tmp.path().join("raw")).unwrap();
    std::fs::write(tmp.path().join("raw"), b"blocked").unwrap();

    let (status, body) = send(&app, post_json("/ingest", "{\"a\": 1}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    let error_id = body["error_id"].as_str().unwrap().to_string();
    assert!(error_id.starts_with("err_"));
    assert!(body["hint"].as_str().unwrap().contains("/last_error"));

    let (status, last) = send(&app, get("/last_error")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&last)["id"], error_id.as_str());
}
