//! Configuration management for cfl.
//!
//! Parses `cfl.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. When no file is
//! found, the Confluence connection is resolved from the environment.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.email`
//! - `confluence.api_token`
//!
//! Fields left out of the file fall back to the same templates used without a
//! file: `${CONFLUENCE_URL:-https://example.atlassian.net}`, `${EMAIL:-}` and
//! `${API_TOKEN:-}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cfl.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_BASE_URL: &str = "${CONFLUENCE_URL:-https://example.atlassian.net}";
const DEFAULT_EMAIL: &str = "${EMAIL:-}";
const DEFAULT_API_TOKEN: &str = "${API_TOKEN:-}";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: ConfluenceConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence site base URL (without the `/wiki` suffix).
    pub base_url: String,
    /// Account email used for basic authentication.
    pub email: String,
    /// API token used for basic authentication.
    pub api_token: String,
    /// Global HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            email: DEFAULT_EMAIL.to_owned(),
            api_token: DEFAULT_API_TOKEN.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Whether basic-auth credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.api_token.is_empty()
    }

    fn expand_env_vars<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.base_url = expand::expand_with(&self.base_url, "confluence.base_url", lookup)?;
        self.email = expand::expand_with(&self.email, "confluence.email", lookup)?;
        self.api_token = expand::expand_with(&self.api_token, "confluence.api_token", lookup)?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`API_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `cfl.toml` in the current directory and parents, and falls back to
    /// environment variables when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// a referenced environment variable is unset, or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, &lookup)
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, &lookup)
        } else {
            Self::from_env()
        }
    }

    /// Build configuration from environment variables only.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the resolved values are invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(&|name: &str| std::env::var(name).ok())
    }

    fn from_env_with<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.resolve(lookup)?;
        Ok(config)
    }

    /// Parse configuration from TOML text, expanding variables with `lookup`.
    fn parse_with<F>(content: &str, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content)?;
        config.resolve(lookup)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    fn load_from_file<F>(path: &Path, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse_with(&content, lookup)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn resolve<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.confluence.expand_env_vars(lookup)?;
        let trimmed = self.confluence.base_url.trim_end_matches('/').len();
        self.confluence.base_url.truncate(trimmed);
        self.confluence.validate()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }
}
