//! Configuration management for Kimi Possible.
//!
//! Configuration is read once at startup from environment variables:
//! - `OPENROUTER_API_KEY` - Model provider key. Without it the chat route answers 500.
//! - `EXA_API_KEY` - Optional. Enables `exa_search`.
//! - `X_API_KEY` - Optional. Enables `live_search`.
//! - `YOUTUBE_API_KEY` - Optional. Enables `youtube_search`.
//! - `SECRETS_PATH` - Optional. JSON runtime bindings consulted before the environment.
//!   Defaults to `.kimi-possible/secrets.json` in the working directory.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `OPENROUTER_BASE_URL`, `EXA_BASE_URL`, `XAI_BASE_URL`, `YOUTUBE_BASE_URL` -
//!   Optional endpoint overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::tools::ToolKind;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_XAI_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const DEFAULT_SECRETS_PATH: &str = ".kimi-possible/secrets.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Credential bag for the model provider and the three search providers.
///
/// An empty string is never stored: absent and blank are the same thing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openrouter_api_key: Option<String>,
    pub exa_api_key: Option<String>,
    pub x_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl Credentials {
    /// Resolve every credential from runtime bindings, falling back to the
    /// process environment.
    pub fn resolve(bindings: &HashMap<String, String>) -> Self {
        Self::resolve_with(bindings, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit fallback lookup.
    pub fn resolve_with<F>(bindings: &HashMap<String, String>, fallback: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            non_empty(bindings.get(name).cloned()).or_else(|| non_empty(fallback(name)))
        };

        Self {
            openrouter_api_key: lookup("OPENROUTER_API_KEY"),
            exa_api_key: lookup(ToolKind::ExaSearch.credential_name()),
            x_api_key: lookup(ToolKind::LiveSearch.credential_name()),
            youtube_api_key: lookup(ToolKind::YoutubeSearch.credential_name()),
        }
    }

    /// The credential a search tool needs, if configured.
    pub fn for_tool(&self, kind: ToolKind) -> Option<&str> {
        match kind {
            ToolKind::ExaSearch => self.exa_api_key.as_deref(),
            ToolKind::LiveSearch => self.x_api_key.as_deref(),
            ToolKind::YoutubeSearch => self.youtube_api_key.as_deref(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Base URLs of the upstream services.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub openrouter: String,
    pub exa: String,
    pub xai: String,
    pub youtube: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openrouter: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            exa: DEFAULT_EXA_BASE_URL.to_string(),
            xai: DEFAULT_XAI_BASE_URL.to_string(),
            youtube: DEFAULT_YOUTUBE_BASE_URL.to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Provider credentials
    pub credentials: Credentials,

    /// Upstream base URLs
    pub endpoints: Endpoints,
}

impl Config {
    /// Load configuration from environment variables and runtime bindings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` or an endpoint override
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let secrets_path = std::env::var("SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH));
        let bindings = load_bindings(&secrets_path);
        let credentials = Credentials::resolve(&bindings);

        let endpoints = Endpoints {
            openrouter: endpoint_from_env("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL)?,
            exa: endpoint_from_env("EXA_BASE_URL", DEFAULT_EXA_BASE_URL)?,
            xai: endpoint_from_env("XAI_BASE_URL", DEFAULT_XAI_BASE_URL)?,
            youtube: endpoint_from_env("YOUTUBE_BASE_URL", DEFAULT_YOUTUBE_BASE_URL)?,
        };

        Ok(Self {
            host,
            port,
            credentials,
            endpoints,
        })
    }

    /// Create a config with custom credentials (useful for testing).
    pub fn new(credentials: Credentials) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            credentials,
            endpoints: Endpoints::default(),
        }
    }
}

fn endpoint_from_env(var: &str, default: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => parse_endpoint(var, &value),
        _ => Ok(default.to_string()),
    }
}

fn parse_endpoint(var: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), format!("{}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Read runtime bindings (`NAME -> value`) from a JSON file.
///
/// A missing file yields no bindings; a broken one is logged and ignored.
pub fn load_bindings(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        tracing::info!(
            "No runtime bindings at {}, using environment only",
            path.display()
        );
        return HashMap::new();
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| {
            serde_json::from_str::<HashMap<String, String>>(&contents).map_err(|e| e.to_string())
        });

    match parsed {
        Ok(bindings) => {
            tracing::info!(
                "Loaded {} runtime bindings from {}",
                bindings.len(),
                path.display()
            );
            bindings
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load runtime bindings from {}: {}, using environment only",
                path.display(),
                e
            );
            HashMap::new()
        }
    }
}
