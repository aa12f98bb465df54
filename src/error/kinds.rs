use std::{fmt, io};

/// Crate-wide `Result` type using [`SumoqlError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, SumoqlError>;

/// Top-level error type for sumoql operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum SumoqlError {
    /// Configuration errors.
    Config(ConfigError),

    /// Remote API request errors.
    Request(RequestError),

    /// Persistence backend errors.
    Store(StoreError),

    /// I/O errors.
    Io(io::Error),

    /// JSON (de)serialization errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be parsed.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Unknown deployment region.
    UnknownRegion(String),

    /// Unsupported shell for completion generation.
    UnsupportedShell(String),
}

/// A failed call against the remote API.
///
/// `status_code` is absent when no HTTP response was received at all
/// (connection refused, timeout, TLS failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub message: String,
    pub status_code: Option<u16>,
}

/// Persistence backend errors.
#[derive(Debug)]
pub enum StoreError {
    /// The backing file holds something other than a JSON object.
    Corrupted(String),

    /// Reading or writing the backing file failed.
    Io { path: String, source: io::Error },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for SumoqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumoqlError::Config(e) => write!(f, "Configuration error: {e}"),
            SumoqlError::Request(e) => write!(f, "Request error: {e}"),
            SumoqlError::Store(e) => write!(f, "Store error: {e}"),
            SumoqlError::Io(e) => write!(f, "I/O error: {e}"),
            SumoqlError::Json(e) => write!(f, "JSON error: {e}"),
            SumoqlError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::UnknownRegion(region) => write!(f, "Unknown region: {region}"),
            ConfigError::UnsupportedShell(shell) => {
                write!(f, "Unsupported shell: {shell}. Supported shells: bash, zsh, fish")
            }
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Corrupted(path) => write!(f, "State file is not a JSON object: {path}"),
            StoreError::Io { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl std::error::Error for SumoqlError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for RequestError {}
impl std::error::Error for StoreError {}

/* ========================= Conversions to SumoqlError ========================= */

impl From<io::Error> for SumoqlError {
    fn from(err: io::Error) -> Self {
        SumoqlError::Io(err)
    }
}

impl From<serde_json::Error> for SumoqlError {
    fn from(err: serde_json::Error) -> Self {
        SumoqlError::Json(err)
    }
}

impl From<ConfigError> for SumoqlError {
    fn from(err: ConfigError) -> Self {
        SumoqlError::Config(err)
    }
}

impl From<RequestError> for SumoqlError {
    fn from(err: RequestError) -> Self {
        SumoqlError::Request(err)
    }
}

impl From<StoreError> for SumoqlError {
    fn from(err: StoreError) -> Self {
        SumoqlError::Store(err)
    }
}

impl From<toml::de::Error> for SumoqlError {
    fn from(err: toml::de::Error) -> Self {
        SumoqlError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<String> for SumoqlError {
    fn from(msg: String) -> Self {
        SumoqlError::Generic(msg)
    }
}
