// crates/dnr-replay-config/src/config.rs
// ============================================================================
// Module: DNR Replay Configuration
// Description: Configuration loading and validation for DNR replay.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: dnr-replay-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits
//! and validated before use. Bucket credentials are never stored in the file;
//! it names the environment variables that hold them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use dnr_replay_core::SearchScope;
use dnr_replay_core::SentinelMode;
use dnr_replay_core::runtime::DEFAULT_MAX_OBJECT_BYTES;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "dnr-replay.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DNR_REPLAY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default solver request timeout in milliseconds.
pub const DEFAULT_SOLVER_TIMEOUT_MS: u64 = 120_000;
/// Minimum solver request timeout in milliseconds.
pub(crate) const MIN_SOLVER_TIMEOUT_MS: u64 = 1_000;
/// Maximum solver request timeout in milliseconds.
pub(crate) const MAX_SOLVER_TIMEOUT_MS: u64 = 600_000;
/// Default maximum solver response size in bytes.
pub const DEFAULT_SOLVER_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// DNR replay configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayConfig {
    /// Solver endpoint configuration.
    pub solver: SolverConfig,
    /// Bucket the run's artifacts are fetched from (usually production).
    pub source: BucketConfig,
    /// Bucket the raw screen usage is republished to (usually staging).
    pub destination: BucketConfig,
    /// Local run-directory configuration.
    #[serde(default)]
    pub local: LocalConfig,
    /// File locator configuration.
    #[serde(default)]
    pub locator: LocatorConfig,
    /// Event sink configuration.
    #[serde(default)]
    pub events: EventsConfig,
}

impl ReplayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()?;
        self.source.validate("source")?;
        self.destination.validate("destination")?;
        self.local.validate()?;
        self.events.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Solver
// ============================================================================

/// Solver endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Solver submission URL.
    pub url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_solver_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_solver_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl SolverConfig {
    /// Validates solver configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when solver settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.url.trim())
            .map_err(|err| ConfigError::Invalid(format!("solver.url is invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("solver.url must use http or https".to_string()));
        }
        if !(MIN_SOLVER_TIMEOUT_MS ..= MAX_SOLVER_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "solver.timeout_ms must be between {MIN_SOLVER_TIMEOUT_MS} and \
                 {MAX_SOLVER_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid(
                "solver.max_response_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default solver timeout.
const fn default_solver_timeout_ms() -> u64 {
    DEFAULT_SOLVER_TIMEOUT_MS
}

/// Default solver response cap.
const fn default_solver_max_response_bytes() -> usize {
    DEFAULT_SOLVER_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Buckets
// ============================================================================

/// Object-store bucket configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
    /// Bucket name.
    pub bucket: String,
    /// Optional region (defaults to environment).
    #[serde(default)]
    pub region: Option<String>,
    /// Optional endpoint (S3-compatible stores).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Force path-style addressing (S3-compatible stores).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Static credentials sourced from environment variables.
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    /// Maximum object size in bytes.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: usize,
}

impl BucketConfig {
    /// Validates bucket configuration; `section` names the table in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when bucket settings are invalid.
    pub fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section}.bucket must be set")));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "{section}.endpoint must include http:// or https://"
                )));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(format!(
                    "{section}.endpoint uses http:// without allow_http"
                )));
            }
        }
        if self.max_object_bytes == 0 {
            return Err(ConfigError::Invalid(format!(
                "{section}.max_object_bytes must be greater than zero"
            )));
        }
        if let Some(credentials) = &self.credentials {
            credentials.validate(section)?;
        }
        Ok(())
    }
}

/// Default object size cap.
const fn default_max_object_bytes() -> usize {
    DEFAULT_MAX_OBJECT_BYTES
}

/// Names of the environment variables holding static bucket credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Variable holding the access key id.
    pub access_key_id_env: String,
    /// Variable holding the secret access key.
    pub secret_access_key_env: String,
}

impl CredentialsConfig {
    /// Validates credential variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable name is empty.
    pub fn validate(&self, section: &str) -> Result<(), ConfigError> {
        for (field, value) in [
            ("access_key_id_env", &self.access_key_id_env),
            ("secret_access_key_env", &self.secret_access_key_env),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{section}.credentials.{field} must be set"
                )));
            }
        }
        Ok(())
    }

    /// Reads the access key id and secret from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is unset or empty.
    pub fn resolve(&self) -> Result<(String, String), ConfigError> {
        Ok((read_env(&self.access_key_id_env)?, read_env(&self.secret_access_key_env)?))
    }
}

/// Reads a non-empty environment variable.
fn read_env(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Invalid(format!("environment variable {name} is not set"))),
    }
}

// ============================================================================
// SECTION: Local Storage
// ============================================================================

/// Local run-directory configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    /// Root directory holding one directory per correlation id.
    #[serde(default = "default_local_root")]
    pub root: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: default_local_root(),
        }
    }
}

impl LocalConfig {
    /// Validates local storage configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the root path is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("local.root must be non-empty".to_string()));
        }
        validate_path(&self.root)
    }
}

/// Default local root (the invoking process's working directory).
fn default_local_root() -> PathBuf {
    PathBuf::from(".")
}

// ============================================================================
// SECTION: Locator
// ============================================================================

/// File locator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorConfig {
    /// Missing-sentinel handling.
    #[serde(default)]
    pub sentinel_mode: SentinelMode,
    /// Scope hint used when the caller supplies none.
    #[serde(default)]
    pub default_scope: Option<SearchScope>,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Event sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Event sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: EventSinkKind,
    /// Log file path (required for the file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl EventsConfig {
    /// Validates event sink configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink has no path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (EventSinkKind::File, None) => {
                Err(ConfigError::Invalid("events.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path(path),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}
