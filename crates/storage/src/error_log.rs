//! Append-only JSON-lines log of server-side failures.
//!
//! Each failed request gets an `err_xxxxxxxx` id that is returned to the
//! client, so an operator can find the full entry later via `last()` or by
//! reading `errors.log` directly.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::error;
use uuid::Uuid;

use crate::error::StorageError;

const ERROR_LOG_FILE: &str = "errors.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub id: String,
    pub time: DateTime<Utc>,
    pub context: serde_json::Value,
    pub error: String,
}

pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(ERROR_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry and return its id.
    ///
    /// Never fails: if the log itself cannot be written the entry goes to
    /// the tracing output instead.
    pub async fn record(
        &self,
        context: serde_json::Value,
        err: &(dyn Display + Sync),
    ) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        let entry = ErrorEntry {
            id: format!("err_{}", &hex[..8]),
            time: Utc::now(),
            context,
            error: err.to_string(),
        };

        if let Err(e) = self.append(&entry).await {
            error!(
                "Failed to write error log {}: {} (entry: {:?})",
                self.path.display(),
                e,
                entry
            );
        }
        entry.id
    }

    async fn append(&self, entry: &ErrorEntry) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    /// Last JSON entry in the log. Non-JSON lines are skipped.
    ///
    /// Returns `Ok(None)` when the log does not exist or holds no JSON lines.
    pub async fn last(&self) -> Result<Option<serde_json::Value>, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(text
            .lines()
            .rev()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .find_map(|line| serde_json::from_str::<serde_json::Value>(line).ok()))
    }
}
