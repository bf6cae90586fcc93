//! HTTP client for the ingestion server's upload endpoint.
//!
//! An [`UploadClient`] is either `Idle` or `Submitted`. A submission moves it
//! to `Submitted` until the response (or error) arrives; a second submission
//! in the meantime is refused rather than queued.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Submitted,
}

/// What the user asked to send.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    File { name: String, bytes: Vec<u8> },
}

impl Payload {
    /// Read a file from disk into a payload.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::File { name, bytes })
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::File { bytes, .. } => bytes.is_empty(),
        }
    }
}

/// Server answer, with the body kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted {
        status: u16,
        job_id: Option<String>,
        body: String,
    },
    Rejected {
        status: u16,
        body: String,
    },
}

/// Resets the client to `Idle` however the submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct UploadClient {
    base_url: String,
    http: reqwest::Client,
    submitted: AtomicBool,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self {
            base_url,
            http,
            submitted: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ClientState {
        if self.submitted.load(Ordering::SeqCst) {
            ClientState::Submitted
        } else {
            ClientState::Idle
        }
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        if self
            .submitted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            bail!("a submission is already in flight");
        }
        Ok(InFlight(&self.submitted))
    }

    /// Send one payload to `POST /upload`.
    ///
    /// Any HTTP answer is an `Ok` outcome; only transport failures are errors.
    pub async fn submit(&self, payload: Payload, source_id: Option<&str>) -> Result<Outcome> {
        if payload.is_empty() {
            bail!("nothing to submit: provide --json text or a non-empty --file");
        }
        let _in_flight = self.begin()?;

        let mut form = match payload {
            Payload::Text(text) => Form::new().text("json", text),
            Payload::File { name, bytes } => {
                let part = Part::bytes(bytes)
                    .mime_str(content_type_for(&name))?
                    .file_name(name);
                Form::new().part("file", part)
            }
        };
        if let Some(id) = source_id {
            form = form.text("source_id", id.to_string());
        }

        let url = format!("{}/upload", self.base_url);
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read server response")?;

        if status.is_success() {
            let job_id = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["job_id"].as_str().map(str::to_string));
            Ok(Outcome::Accepted {
                status: status.as_u16(),
                job_id,
                body,
            })
        } else {
            Ok(Outcome::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Call `GET /health` and return the body.
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .context("server not reachable")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("server returned {}: {}", status, body);
        }

        resp.text().await.context("failed to read health response")
    }
}

/// Content type sent for a file, by extension.
fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") | Some("log") => "text/plain",
        Some("xml") => "application/xml",
        Some("html") | Some("htm") => "text/html",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
