use anyhow::{Context, Result};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Nothing is required: without `GEMINI_API_KEY` every analysis must carry a
/// user-entered key instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host-managed secret. Takes precedence over any user-entered key.
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub primary_model: String,
    pub fallback_model: String,
    /// Unset means the HTTP client default (no local timeout).
    pub gemini_timeout_secs: Option<u64>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            primary_model: optional_env("PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            fallback_model: optional_env("FALLBACK_MODEL")
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string()),
            gemini_timeout_secs: optional_env("GEMINI_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_UPLOAD_BYTES must be a byte count")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Backend candidates in the order they should be tried.
    pub fn model_candidates(&self) -> Vec<String> {
        let mut models = vec![self.primary_model.clone()];
        if self.fallback_model != self.primary_model {
            models.push(self.fallback_model.clone());
        }
        models
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: None,
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            gemini_timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads an environment variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
