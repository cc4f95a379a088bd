use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Per-upload ceiling: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Uploads tracked at once (one chat session and one artifact record each).
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Application configuration loaded from environment variables.
///
/// The Gemini API key is optional here: a missing key is reported per request
/// (HTTP 500) rather than refusing to start, so the page and health check stay up.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Parent of the `uploads/` and `downloads/` directories.
    /// `LATEXGPT_FILES_ROOT` (e.g. `public/files`) or `{tmp}/latexgpt`.
    pub files_root: PathBuf,
    pub template_path: PathBuf,
    pub max_upload_bytes: usize,
    /// Oldest sessions and records are dropped past this many uploads.
    pub max_sessions: usize,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            files_root: optional_env("LATEXGPT_FILES_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(default_files_root),
            template_path: optional_env("LATEXGPT_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates/jakes_template.tex")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_sessions: parse_env("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn default_files_root() -> PathBuf {
    std::env::temp_dir().join("latexgpt")
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
