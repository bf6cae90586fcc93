use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub client: ClientConfig,
    pub mongo: MongoConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AURAVERSE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("AURAVERSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            client: ClientConfig::from_env_profiled(p),
            mongo: MongoConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  server:   {}:{} (cors={}, max_upload={}MB)",
            self.server.host,
            self.server.port,
            self.server.cors_origin,
            self.server.max_upload_mb
        );
        tracing::info!("  storage:  store_dir={}", self.storage.store_dir.display());
        tracing::info!(
            "  mongo:    {} (unused by ingestion)",
            if self.mongo.is_configured() { "configured" } else { "not configured" }
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Request body limit for `/ingest` and `/upload`, in megabytes.
    pub max_upload_mb: u32,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
            max_upload_mb: profiled_env_u32(p, "MAX_UPLOAD_MB", 100),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the raw store and the error log.
    pub store_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            store_dir: PathBuf::from(profiled_env_or(p, "STORE_DIR", "store")),
        }
    }
}

// ── Upload client ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the upload client submits to.
    pub api_url: String,
}

impl ClientConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_url: profiled_env_or(p, "API_URL", "http://localhost:8000"),
        }
    }
}

// ── MongoDB (optional, not used by ingestion) ─────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: Option<String>,
    pub database: String,
}

impl MongoConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            uri: profiled_env_opt(p, "MONGO_URI"),
            database: profiled_env_or(p, "MONGO_DB", "etl_auraverse"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.uri.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiled_key_takes_precedence() {
        env::set_var("AVTESTA_STORE_DIR", "/tmp/avtesta-store");
        env::set_var("AVTESTA_MAX_UPLOAD_MB", "7");

        let cfg = Config::for_profile("avtesta");
        assert_eq!(cfg.profile, "AVTESTA");
        assert_eq!(cfg.profile_label(), "AVTESTA");
        assert_eq!(cfg.storage.store_dir, PathBuf::from("/tmp/avtesta-store"));
        assert_eq!(cfg.server.max_upload_mb, 7);
        assert_eq!(cfg.server.max_upload_bytes(), 7 * 1024 * 1024);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        env::set_var("AVTESTB_PORT", "not-a-port");
        let cfg = Config::for_profile("avtestb");
        assert_eq!(cfg.server.port, profiled_env_u16("", "PORT", 8000));
    }

    #[test]
    fn default_profile_label() {
        let cfg = Config::for_profile("");
        assert_eq!(cfg.profile_label(), "default");
    }
}
