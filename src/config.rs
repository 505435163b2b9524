use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables prefixed with this (e.g. `MANGASHELF__TIMING__SETTLE_DELAY_MS`)
/// override file values.
pub const ENV_PREFIX: &str = "MANGASHELF";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub extraction: ExtractionConfig,
    pub backend: BackendConfig,
}

/// Empirical delays tuned against client-rendered manga sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after a navigation before auto-extraction runs.
    pub settle_delay_ms: u64,
    /// Wait for the asynchronous reply after a manual extraction.
    pub manual_wait_ms: u64,
    /// Quiet period required before a progress write is committed.
    pub progress_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Register the debug adapter ahead of every site adapter.
    pub debug_adapter: bool,
    /// Host object exposing `postMessage` inside the page.
    pub bridge_object: String,
    pub description_limit: usize,
    pub max_genres: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Config {
    /// Loads defaults, then the TOML file at `path` if it exists, then environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn manual_wait(&self) -> Duration {
        Duration::from_millis(self.manual_wait_ms)
    }

    pub fn progress_debounce(&self) -> Duration {
        Duration::from_millis(self.progress_debounce_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 3500,
            manual_wait_ms: 1000,
            progress_debounce_ms: 2000,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            debug_adapter: false,
            bridge_object: "window.ReactNativeWebView".to_string(),
            description_limit: 500,
            max_genres: 5,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            timeout_secs: 30,
            user_agent: Some("MangaShelf/0.1".to_string()),
        }
    }
}
