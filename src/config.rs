use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the screening API, e.g. "https://api.opensanctions.org".
    pub base_url: String,
    /// Name of the environment variable holding the API key. The variable
    /// being unset is allowed and yields unauthenticated requests.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Minimum spacing between consecutive requests, in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `limit` query parameter for the adjacency endpoint.
    #[serde(default = "default_adjacent_limit")]
    pub adjacent_limit: u32,
    /// Search scope segment: `GET /search/{scope}`.
    #[serde(default = "default_scope")]
    pub scope: String,
}

/// Note rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    /// Output directory for rendered notes.
    #[serde(default = "default_notes_folder")]
    pub folder: PathBuf,
    /// Render counterpart names as [[wikilinks]] instead of plain text.
    #[serde(default = "default_wikilinks")]
    pub wikilinks: bool,
    /// Per-schema property names to include in the note body. Schemas absent
    /// from the map render a default field set.
    #[serde(default)]
    pub fields: HashMap<String, Vec<String>>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        NotesConfig {
            folder: default_notes_folder(),
            wikilinks: default_wikilinks(),
            fields: HashMap::new(),
        }
    }
}

fn default_api_key_env() -> String {
    "WATCHLINK_API_KEY".to_string()
}

fn default_rate_limit_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_adjacent_limit() -> u32 {
    50
}

fn default_scope() -> String {
    "default".to_string()
}

fn default_notes_folder() -> PathBuf {
    PathBuf::from("notes")
}

fn default_wikilinks() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in WATCHLINK_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("WATCHLINK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("api.base_url is not a valid URL: {}", self.api.base_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("api.base_url must be an absolute http(s) URL: {}", self.api.base_url);
        }

        if self.api.rate_limit_ms == 0 {
            anyhow::bail!("api.rate_limit_ms must be greater than 0");
        }

        if self.api.adjacent_limit == 0 {
            anyhow::bail!("api.adjacent_limit must be greater than 0");
        }

        Ok(())
    }

    /// API key read from the configured environment variable, if set.
    /// Read at call time so a key exported mid-session takes effect on the
    /// next request.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env).ok().filter(|k| !k.is_empty())
    }

    /// Notes output directory
    pub fn notes_folder(&self) -> &Path {
        &self.notes.folder
    }
}
