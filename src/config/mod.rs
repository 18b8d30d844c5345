//! Configuration management.
//!
//! Configuration is read from a TOML file and can be overridden with
//! environment variables prefixed `CITATION_COUNT_`, using `__` between
//! section and key.
//!
//! # Configuration File Format
//!
//! ```toml
//! [extension]
//! id = "@future-scholars/paperlib-citation-count-extension"
//! locale = "en-US"
//! ui_slot = "paperDetailsPanelSlot1"
//! widget_id = "paperlib-citation-count"
//!
//! [endpoint]
//! profile = "semantic_scholar"
//! base_url = "https://api.semanticscholar.org/graph/v1"
//! api_key = "your-api-key"
//!
//! [network]
//! timeout_secs = 5
//! max_attempts = 1
//! retry_delay_ms = 500
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ```bash
//! export CITATION_COUNT_ENDPOINT__PROFILE=semantic_scholar
//! export CITATION_COUNT_NETWORK__TIMEOUT_SECS=10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extension::Locale;
use crate::lookup::{EndpointProfile, ProfileKind};
use crate::utils::RetryConfig;

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "citation-count.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host integration settings
    #[serde(default)]
    pub extension: ExtensionConfig,

    /// Remote service settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// HTTP settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Host integration: registration id, label locale and UI slot keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default = "default_extension_id")]
    pub id: String,

    #[serde(default)]
    pub locale: Locale,

    #[serde(default = "default_ui_slot")]
    pub ui_slot: String,

    #[serde(default = "default_widget_id")]
    pub widget_id: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            id: default_extension_id(),
            locale: Locale::default(),
            ui_slot: default_ui_slot(),
            widget_id: default_widget_id(),
        }
    }
}

fn default_extension_id() -> String {
    "@future-scholars/paperlib-citation-count-extension".to_string()
}

fn default_ui_slot() -> String {
    "paperDetailsPanelSlot1".to_string()
}

fn default_widget_id() -> String {
    "paperlib-citation-count".to_string()
}

/// Which service to query and how to reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub profile: ProfileKind,

    /// Overrides the profile's built-in base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Semantic Scholar API key, sent as `x-api-key`. Never written out.
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            profile: ProfileKind::default(),
            base_url: None,
            api_key: default_api_key(),
        }
    }
}

fn default_api_key() -> Option<String> {
    std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok()
}

impl EndpointConfig {
    /// Endpoint profile with the base URL override applied
    pub fn endpoint_profile(&self) -> EndpointProfile {
        let profile = EndpointProfile::for_kind(self.profile);
        match &self.base_url {
            Some(base_url) => profile.with_base_url(base_url.as_str()),
            None => profile,
        }
    }

    /// API key to send to the configured service, if it takes one
    pub fn request_api_key(&self) -> Option<String> {
        match self.profile {
            ProfileKind::SemanticScholar => self.api_key.clone(),
            ProfileKind::Paperlib => None,
        }
    }
}

/// HTTP timeout and retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per lookup (1 or 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl NetworkConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy for the fetch
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .max_attempts(self.max_attempts)
            .delay(Duration::from_millis(self.retry_delay_ms))
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.endpoint.base_url {
            let parsed =
                url::Url::parse(base_url).map_err(|e| ConfigError::Invalid(format!("base_url: {}", e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "base_url: unsupported scheme {}",
                    parsed.scheme()
                )));
            }
        }

        if !(1..=2).contains(&self.network.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "max_attempts must be 1 or 2, got {}",
                self.network.max_attempts
            )));
        }

        if self.network.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }

        Ok(())
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    build_config(Some(path))
}

fn build_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("CITATION_COUNT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("citation-count").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Configuration without a file: defaults plus environment overrides
pub fn get_config() -> Result<Config, ConfigError> {
    build_config(None)
}
