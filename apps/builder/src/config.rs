use anyhow::{Context, Result};
use tracing::debug;

/// Default backend origin for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Quiet period before the preview frame is refreshed.
pub const DEFAULT_PREVIEW_DEBOUNCE_MS: u64 = 1000;

/// Quiet period before an autosave fires.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 3000;

/// Ambient configuration for the sync engine.
///
/// The CV id and anti-forgery token are injected into the environment by
/// whatever hosts the editor, the same way the server injects them into the
/// rendered page. Without both the editor runs read-only with no controller,
/// so [`BuilderConfig::from_env`] reports their absence as `None` rather than
/// an error.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub base_url: String,
    pub cv_id: String,
    pub csrf_token: String,
    pub preview_debounce_ms: u64,
    pub autosave_debounce_ms: u64,
}

impl BuilderConfig {
    pub fn new(base_url: &str, cv_id: &str, csrf_token: &str) -> Self {
        BuilderConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            cv_id: cv_id.to_string(),
            csrf_token: csrf_token.to_string(),
            preview_debounce_ms: DEFAULT_PREVIEW_DEBOUNCE_MS,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
        }
    }

    /// Resolves configuration from the environment.
    ///
    /// `CV_ID` and `CSRF_TOKEN` gate initialization: if either is missing or
    /// empty, `Ok(None)` is returned and no controller should be created.
    /// Malformed optional values (non-numeric debounce overrides) are errors.
    pub fn from_env() -> Result<Option<Self>> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cv_id = match non_empty_env("CV_ID") {
            Some(v) => v,
            None => {
                debug!("CV_ID not set; sync engine disabled");
                return Ok(None);
            }
        };
        let csrf_token = match non_empty_env("CSRF_TOKEN") {
            Some(v) => v,
            None => {
                debug!("CSRF_TOKEN not set; sync engine disabled");
                return Ok(None);
            }
        };

        Ok(Some(BuilderConfig {
            base_url: std::env::var("CV_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            cv_id,
            csrf_token,
            preview_debounce_ms: millis_env("PREVIEW_DEBOUNCE_MS", DEFAULT_PREVIEW_DEBOUNCE_MS)?,
            autosave_debounce_ms: millis_env("AUTOSAVE_DEBOUNCE_MS", DEFAULT_AUTOSAVE_DEBOUNCE_MS)?,
        }))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn millis_env(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .with_context(|| format!("'{key}' must be a duration in milliseconds")),
        Err(_) => Ok(default),
    }
}
