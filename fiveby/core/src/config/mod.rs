//! Client Configuration
//!
//! Loads client settings from `~/.config/five-by/client.toml`, the
//! environment and command-line overrides.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments, via [`ConfigOverrides`]
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Environment Variables
//!
//! | Variable | Setting |
//! |---|---|
//! | `FIVEBY_API_BASE_URL` (or `VITE_API_BASE_URL`) | `api.base_url` |
//! | `FIVEBY_REQUEST_TIMEOUT_MS` | `api.request_timeout_ms` |
//! | `FIVEBY_POLL_INTERVAL_MS` | `polling.interval_ms` |
//! | `FIVEBY_POLLING` | `polling.enabled` |
//! | `FIVEBY_SPEECH_LANG` | `speech.language` |
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://five-by.example.com"
//! request_timeout_ms = 10000
//!
//! [polling]
//! interval_ms = 5000
//! enabled = true
//!
//! [speech]
//! language = "en-GB"
//! synthesis_start_timeout_ms = 1500
//! interim_results = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default snapshot poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default time allowed for an utterance to start
pub const DEFAULT_SYNTHESIS_START_TIMEOUT_MS: u64 = 1500;

/// Default recognition language
pub const DEFAULT_SPEECH_LANGUAGE: &str = "en-US";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Command-line argument
    Cli,
    /// Environment variable
    Env,
    /// TOML configuration file
    File,
    /// Built-in default
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Backend base URL
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

/// `[polling]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingToml {
    /// Refresh interval in milliseconds
    pub interval_ms: Option<u64>,

    /// Whether background refresh runs at all
    pub enabled: Option<bool>,
}

/// `[speech]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechToml {
    /// BCP 47 recognition language
    pub language: Option<String>,

    /// Time allowed for an utterance to start, in milliseconds
    pub synthesis_start_timeout_ms: Option<u64>,

    /// Whether interim transcripts are reported
    pub interim_results: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// API section
    pub api: ApiToml,

    /// Polling section
    pub polling: PollingToml,

    /// Speech section
    pub speech: SpeechToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Backend connection settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash
    pub base_url: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl ApiConfig {
    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Background refresh settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollingConfig {
    /// Refresh interval in milliseconds
    pub interval_ms: u64,

    /// Whether background refresh runs
    pub enabled: bool,
}

impl PollingConfig {
    /// Refresh interval
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            enabled: true,
        }
    }
}

/// Speech adapter settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechConfig {
    /// Recognition language
    pub language: String,

    /// Time allowed for an utterance to start, in milliseconds
    pub synthesis_start_timeout_ms: u64,

    /// Whether interim transcripts are reported
    pub interim_results: bool,
}

impl SpeechConfig {
    /// Time allowed for an utterance to start
    #[must_use]
    pub fn synthesis_start_timeout(&self) -> Duration {
        Duration::from_millis(self.synthesis_start_timeout_ms)
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_SPEECH_LANGUAGE.to_string(),
            synthesis_start_timeout_ms: DEFAULT_SYNTHESIS_START_TIMEOUT_MS,
            interim_results: true,
        }
    }
}

/// Resolved client configuration
///
/// Use [`load_config`] to resolve with proper priority handling.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend connection
    pub api: ApiConfig,

    /// Background refresh
    pub polling: PollingConfig,

    /// Speech adapters
    pub speech: SpeechConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Where the base URL came from
    pub base_url_source: ConfigSource,

    /// Highest-priority source that contributed a value
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            speech: SpeechConfig::default(),
            config_file_path: None,
            base_url_source: ConfigSource::Default,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Normalize and check the resolved values
    ///
    /// Strips trailing slashes from the base URL.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.api.base_url.trim().trim_end_matches('/').to_string();
        let lower = trimmed.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must use http or https, got {:?}",
                self.api.base_url
            )));
        }
        self.api.base_url = trimmed;

        if self.api.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "polling.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.speech.language.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "speech.language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/five-by/client.toml` or
/// `~/.config/five-by/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("five-by").join("client.toml"))
}

/// Load configuration from the default path, the environment and defaults
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if a
/// resolved value is invalid. A missing config file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    if config.base_url_source == ConfigSource::Default {
        tracing::warn!(
            base_url = DEFAULT_BASE_URL,
            "No API base URL configured; falling back to the local default"
        );
    }

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    let mut touched = false;

    if let Some(ref base_url) = toml.api.base_url {
        config.api.base_url = base_url.clone();
        config.base_url_source = ConfigSource::File;
        touched = true;
    }
    if let Some(timeout) = toml.api.request_timeout_ms {
        config.api.request_timeout_ms = timeout;
        touched = true;
    }

    if let Some(interval) = toml.polling.interval_ms {
        config.polling.interval_ms = interval;
        touched = true;
    }
    if let Some(enabled) = toml.polling.enabled {
        config.polling.enabled = enabled;
        touched = true;
    }

    if let Some(ref language) = toml.speech.language {
        config.speech.language = language.clone();
        touched = true;
    }
    if let Some(timeout) = toml.speech.synthesis_start_timeout_ms {
        config.speech.synthesis_start_timeout_ms = timeout;
        touched = true;
    }
    if let Some(interim) = toml.speech.interim_results {
        config.speech.interim_results = interim;
        touched = true;
    }

    if touched {
        config.source = ConfigSource::File;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ClientConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = env("FIVEBY_API_BASE_URL")
        .or_else(|| env("VITE_API_BASE_URL"))
        .filter(|url| !url.trim().is_empty());
    if let Some(url) = base_url {
        config.api.base_url = url;
        config.base_url_source = ConfigSource::Env;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("FIVEBY_REQUEST_TIMEOUT_MS") {
        if let Ok(ms) = timeout.trim().parse::<u64>() {
            config.api.request_timeout_ms = ms;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(interval) = env("FIVEBY_POLL_INTERVAL_MS") {
        if let Ok(ms) = interval.trim().parse::<u64>() {
            config.polling.interval_ms = ms;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(enabled) = env("FIVEBY_POLLING") {
        config.polling.enabled = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(language) = env("FIVEBY_SPEECH_LANG") {
        if !language.trim().is_empty() {
            config.speech.language = language;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Request timeout override (milliseconds)
    pub request_timeout_ms: Option<u64>,

    /// Poll interval override (milliseconds)
    pub poll_interval_ms: Option<u64>,

    /// Polling enabled override
    pub polling_enabled: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = Some(ms);
        self
    }

    /// Set poll interval override
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    /// Set polling enabled override
    #[must_use]
    pub fn with_polling_enabled(mut self, enabled: bool) -> Self {
        self.polling_enabled = Some(enabled);
        self
    }

    /// Apply overrides and re-validate
    pub fn apply(&self, config: &mut ClientConfig) -> Result<(), ConfigError> {
        if self.base_url.is_some()
            || self.request_timeout_ms.is_some()
            || self.poll_interval_ms.is_some()
            || self.polling_enabled.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.api.base_url = url.clone();
            config.base_url_source = ConfigSource::Cli;
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.api.request_timeout_ms = timeout;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.polling.interval_ms = interval;
        }
        if let Some(enabled) = self.polling_enabled {
            config.polling.enabled = enabled;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = load_config_with_env(None, no_env).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.polling.interval_ms, 5000);
        assert!(config.polling.enabled);
        assert_eq!(config.speech.language, "en-US");
        assert_eq!(config.speech.synthesis_start_timeout_ms, 1500);
        assert!(config.speech.interim_results);
        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.base_url_source, ConfigSource::Default);
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("five-by"));
            assert!(p.to_string_lossy().ends_with("client.toml"));
        }
    }

    // =========================================================================
    // TOML
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[api]
base_url = "https://play.example.com/"
request_timeout_ms = 8000

[polling]
interval_ms = 2500
enabled = false

[speech]
language = "en-GB"
synthesis_start_timeout_ms = 900
interim_results = false
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.api.base_url, "https://play.example.com");
        assert_eq!(config.api.request_timeout_ms, 8000);
        assert_eq!(config.polling.interval(), Duration::from_millis(2500));
        assert!(!config.polling.enabled);
        assert_eq!(config.speech.language, "en-GB");
        assert_eq!(config.speech.synthesis_start_timeout_ms, 900);
        assert!(!config.speech.interim_results);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.base_url_source, ConfigSource::File);
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_toml("[polling]\ninterval_ms = 1000\n");

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.base_url_source, ConfigSource::Default);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = write_toml("[api\nbase_url = 3");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/client.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert!(config.config_file_path.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Environment
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[api]\nbase_url = \"http://file.example\"\n");
        let env = env_from(&[
            ("FIVEBY_API_BASE_URL", "http://env.example/"),
            ("FIVEBY_POLL_INTERVAL_MS", "750"),
            ("FIVEBY_POLLING", "false"),
        ]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), env).unwrap();

        assert_eq!(config.api.base_url, "http://env.example");
        assert_eq!(config.polling.interval_ms, 750);
        assert!(!config.polling.enabled);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_vite_base_url_fallback() {
        let env = env_from(&[("VITE_API_BASE_URL", "http://vite.example")]);
        let config = load_config_with_env(None, env).unwrap();
        assert_eq!(config.api.base_url, "http://vite.example");
        assert_eq!(config.base_url_source, ConfigSource::Env);
    }

    #[test]
    fn test_unparseable_env_number_is_ignored() {
        let env = env_from(&[("FIVEBY_REQUEST_TIMEOUT_MS", "soon")]);
        let config = load_config_with_env(None, env).unwrap();
        assert_eq!(config.api.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    // =========================================================================
    // Validation and overrides
    // =========================================================================

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let env = env_from(&[("FIVEBY_API_BASE_URL", "ws://example.com")]);
        let result = load_config_with_env(None, env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let env = env_from(&[("FIVEBY_POLL_INTERVAL_MS", "0")]);
        assert!(load_config_with_env(None, env).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = load_config_with_env(None, no_env).unwrap();
        ConfigOverrides::new()
            .with_base_url("https://cli.example//".to_string())
            .with_poll_interval_ms(1200)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.api.base_url, "https://cli.example");
        assert_eq!(config.polling.interval_ms, 1200);
        assert_eq!(config.source(), ConfigSource::Cli);
        assert_eq!(config.base_url_source, ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = ClientConfig::new();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }
}
