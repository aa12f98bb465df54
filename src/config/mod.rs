//! Configuration management for sumoql
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::resolve_endpoint;
use crate::error::{ConfigError, Result};

/// Name used for the active profile when neither the CLI nor the file picks one
pub const DEFAULT_PROFILE: &str = "default";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Completion state configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Search job configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Deployment region (us1, us2, eu, au, de, jp, ca, in, fed, kr, ch)
    #[serde(default = "default_region")]
    pub region: String,

    /// Explicit API base URL, overrides `region`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access ID used as the Basic auth user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_id: Option<String>,

    /// Access key used as the Basic auth password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Profile used when `--profile` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Named connection profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,

    /// Values taken from `SUMOQL_*` variables, applied over every profile
    #[serde(skip)]
    pub env: ProfileConfig,
}

/// Per-profile connection overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

/// Connection settings after profile selection and merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    /// Name of the selected profile
    pub profile: String,

    /// API base URL, always ending with `/`
    pub endpoint: String,

    pub access_id: String,

    pub access_key: String,

    pub timeout: Duration,
}

/// Completion state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// File holding persisted completion state for all profiles
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Prefix of the per-profile persistence keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Search job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Delay between job status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up waiting for a job after this many seconds
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Maximum number of rows fetched from a finished job
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Time zone used when rendering timestamps
    #[serde(default)]
    pub time_zone: TimeZoneSetting,
}

/// Time zone used for timestamps in reports
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    #[default]
    Local,
    Utc,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_region() -> String {
    "us1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sumoql")
        .join("completion-state.json")
}

fn default_key_prefix() -> String {
    "sumoql.completion".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_wait_secs() -> u64 {
    120
}

fn default_search_limit() -> u32 {
    100
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
            access_id: None,
            access_key: None,
            timeout: default_timeout(),
            default_profile: None,
            profiles: BTreeMap::new(),
            env: ProfileConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
            limit: default_search_limit(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
            time_zone: TimeZoneSetting::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// Falls back to [`Config::default_config_path`] when `path` is `None`.
    /// A missing file is not an error and yields the default configuration.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SUMOQL_*` environment variables on top of this configuration
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// Recognized keys: `SUMOQL_ACCESS_ID`, `SUMOQL_ACCESS_KEY`,
    /// `SUMOQL_REGION`, `SUMOQL_ENDPOINT`. They replace the top-level file
    /// values and are also kept aside so they win over profile sections.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let env = ProfileConfig {
            region: non_empty("SUMOQL_REGION"),
            endpoint: non_empty("SUMOQL_ENDPOINT"),
            access_id: non_empty("SUMOQL_ACCESS_ID"),
            access_key: non_empty("SUMOQL_ACCESS_KEY"),
        };

        let connection = &mut self.connection;
        if let Some(id) = &env.access_id {
            connection.access_id = Some(id.clone());
        }
        if let Some(key) = &env.access_key {
            connection.access_key = Some(key.clone());
        }
        if let Some(region) = &env.region {
            connection.region = region.clone();
        }
        if let Some(endpoint) = &env.endpoint {
            connection.endpoint = Some(endpoint.clone());
        }
        connection.env = env;
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sumoql")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.timeout == 0 {
            return Err(invalid("connection.timeout", "0"));
        }

        match &self.connection.endpoint {
            Some(endpoint) => {
                resolve_endpoint(endpoint)?;
            }
            None => {
                resolve_endpoint(&self.connection.region)?;
            }
        }

        for (name, profile) in &self.connection.profiles {
            if let Some(target) = profile.endpoint.as_ref().or(profile.region.as_ref()) {
                resolve_endpoint(target).map_err(|_| {
                    invalid(&format!("connection.profiles.{name}"), target.as_str())
                })?;
            }
        }

        if self.completion.key_prefix.trim().is_empty() {
            return Err(invalid("completion.key_prefix", ""));
        }

        if self.search.poll_interval_ms == 0 {
            return Err(invalid("search.poll_interval_ms", "0"));
        }

        Ok(())
    }

    /// Render the configuration as TOML with access keys masked
    pub fn to_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        if masked.connection.access_key.is_some() {
            masked.connection.access_key = Some("********".to_string());
        }
        for profile in masked.connection.profiles.values_mut() {
            if profile.access_key.is_some() {
                profile.access_key = Some("********".to_string());
            }
        }

        toml::to_string_pretty(&masked)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout)
    }

    /// Get search poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.search.poll_interval_ms)
    }
}

impl ConnectionConfig {
    /// Name of the profile to use, given an optional explicit choice
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }

    /// List configured profile names
    pub fn list_profiles(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Merge environment values, the selected profile and the top-level
    /// settings, in that order
    ///
    /// A profile that is not declared in the file simply uses the top-level
    /// values, so ad-hoc profile names still work for completion state.
    pub fn resolve(&self, explicit_profile: Option<&str>) -> Result<ResolvedConnection> {
        let profile = self.profile_name(explicit_profile);
        let overrides = self.profiles.get(&profile).cloned().unwrap_or_default();
        let env = self.env.clone();

        let target = env
            .endpoint
            .or(env.region)
            .or(overrides.endpoint)
            .or(overrides.region)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| self.region.clone());
        let endpoint = resolve_endpoint(&target)?;

        let access_id = env
            .access_id
            .or(overrides.access_id)
            .or_else(|| self.access_id.clone())
            .ok_or_else(|| ConfigError::MissingField("connection.access_id".to_string()))?;
        let access_key = env
            .access_key
            .or(overrides.access_key)
            .or_else(|| self.access_key.clone())
            .ok_or_else(|| ConfigError::MissingField("connection.access_key".to_string()))?;

        Ok(ResolvedConnection {
            profile,
            endpoint,
            access_id,
            access_key,
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn invalid(field: &str, value: &str) -> crate::error::SumoqlError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.region, "us1");
        assert_eq!(config.completion.key_prefix, "sumoql.completion");
        assert!(config.display.color_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [connection]
            region = "eu"
            access_id = "suABC"

            [search]
            limit = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.region, "eu");
        assert_eq!(config.connection.access_id.as_deref(), Some("suABC"));
        assert_eq!(config.connection.timeout, 30);
        assert_eq!(config.search.limit, 25);
        assert_eq!(config.search.poll_interval_ms, 1000);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(Config::from_toml_str("[connection\nregion=").is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_region() {
        let mut config = Config::default();
        config.connection.region = "mars".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.connection.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_profile_region() {
        let mut config = Config::default();
        config.connection.profiles.insert(
            "prod".to_string(),
            ProfileConfig {
                region: Some("nowhere".to_string()),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SUMOQL_ACCESS_ID", "envid"),
            ("SUMOQL_REGION", "au"),
            ("SUMOQL_ACCESS_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.connection.access_key = Some("filekey".to_string());
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.connection.access_id.as_deref(), Some("envid"));
        assert_eq!(config.connection.region, "au");
        // Blank values do not override
        assert_eq!(config.connection.access_key.as_deref(), Some("filekey"));
    }

    #[test]
    fn test_resolve_profile_overrides() {
        let config = Config::from_toml_str(
            r#"
            [connection]
            region = "us2"
            access_id = "top-id"
            access_key = "top-key"
            default_profile = "prod"

            [connection.profiles.prod]
            region = "de"
            access_key = "prod-key"
            "#,
        )
        .unwrap();

        let resolved = config.connection.resolve(None).unwrap();
        assert_eq!(resolved.profile, "prod");
        assert_eq!(resolved.endpoint, "https://api.de.sumologic.com/api/");
        assert_eq!(resolved.access_id, "top-id");
        assert_eq!(resolved.access_key, "prod-key");

        let adhoc = config.connection.resolve(Some("staging")).unwrap();
        assert_eq!(adhoc.profile, "staging");
        assert_eq!(adhoc.endpoint, "https://api.us2.sumologic.com/api/");
        assert_eq!(adhoc.access_key, "top-key");
    }

    #[test]
    fn test_env_beats_profile_section() {
        let mut config = Config::from_toml_str(
            r#"
            [connection]
            access_key = "top-key"

            [connection.profiles.prod]
            region = "de"
            access_id = "file-id"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [("SUMOQL_ACCESS_ID", "env-id"), ("SUMOQL_REGION", "jp")]
            .into_iter()
            .collect();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));

        let resolved = config.connection.resolve(Some("prod")).unwrap();
        assert_eq!(resolved.access_id, "env-id");
        assert_eq!(resolved.endpoint, "https://api.jp.sumologic.com/api/");
        assert_eq!(resolved.access_key, "top-key");

        // Without env values the profile section still wins over the top level
        config.connection.env = ProfileConfig::default();
        let resolved = config.connection.resolve(Some("prod")).unwrap();
        assert_eq!(resolved.access_id, "file-id");
        assert_eq!(resolved.endpoint, "https://api.de.sumologic.com/api/");
    }

    #[test]
    fn test_resolve_requires_credentials() {
        let config = Config::default();
        assert!(config.connection.resolve(None).is_err());
    }

    #[test]
    fn test_to_toml_masks_access_key() {
        let mut config = Config::default();
        config.connection.access_id = Some("visible-id".to_string());
        config.connection.access_key = Some("secret".to_string());

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("visible-id"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("********"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from_file(Some(path.as_path())).unwrap();
        assert_eq!(config.connection.region, "us1");
    }
}
