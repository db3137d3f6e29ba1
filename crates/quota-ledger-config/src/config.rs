// crates/quota-ledger-config/src/config.rs
// ============================================================================
// Module: Quota Ledger Configuration
// Description: Configuration loading and validation for the ledger tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: quota-ledger-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Timing knobs are millisecond-denominated integers bounded to
//! ranges that keep the poll loops sane; anything out of range fails closed
//! before a worker can spin against the ledger with degenerate intervals.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use quota_ledger_core::ReservationConfig;
use quota_ledger_core::ResourceSet;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "quota-ledger.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "QUOTA_LEDGER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default ledger file path.
pub const DEFAULT_LEDGER_PATH: &str = "/tmp/quota-ledger.yaml";
/// Default request log file path.
pub const DEFAULT_REQUEST_LOG_PATH: &str = "/tmp/quota-ledger-requests.yaml";
/// Default poll interval in milliseconds.
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
/// Default lock retry interval in milliseconds.
pub(crate) const DEFAULT_LOCK_RETRY_INTERVAL_MS: u64 = 1_000;
/// Default acquire timeout in milliseconds (six hours).
pub(crate) const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 6 * 60 * 60 * 1_000;
/// Default bound on release lock attempts.
pub(crate) const DEFAULT_RELEASE_LOCK_ATTEMPTS: u32 = 20;
/// Minimum allowed poll or lock retry interval in milliseconds.
pub(crate) const MIN_INTERVAL_MS: u64 = 10;
/// Maximum allowed poll or lock retry interval in milliseconds.
pub(crate) const MAX_INTERVAL_MS: u64 = 60_000;
/// Minimum allowed acquire timeout in milliseconds.
pub(crate) const MIN_ACQUIRE_TIMEOUT_MS: u64 = 1_000;
/// Maximum allowed acquire timeout in milliseconds (24 hours).
pub(crate) const MAX_ACQUIRE_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1_000;
/// Minimum allowed release lock attempts.
pub(crate) const MIN_RELEASE_LOCK_ATTEMPTS: u32 = 1;
/// Maximum allowed release lock attempts.
pub(crate) const MAX_RELEASE_LOCK_ATTEMPTS: u32 = 1_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Quota ledger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaLedgerConfig {
    /// Ledger and request-log file locations.
    #[serde(default)]
    pub ledger: LedgerPathsConfig,
    /// Reservation loop timing.
    #[serde(default)]
    pub reservation: ReservationTimingConfig,
    /// Offline seeding values.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl QuotaLedgerConfig {
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
        self.ledger.validate()?;
        self.reservation.validate()?;
        Ok(())
    }

    /// Converts the timing section into a runtime configuration.
    #[must_use]
    pub const fn reservation_config(&self) -> ReservationConfig {
        ReservationConfig {
            poll_interval: Duration::from_millis(self.reservation.poll_interval_ms),
            acquire_timeout: Duration::from_millis(self.reservation.acquire_timeout_ms),
            lock_retry_interval: Duration::from_millis(self.reservation.lock_retry_interval_ms),
            release_lock_attempts: self.reservation.release_lock_attempts,
        }
    }

    /// Returns the ledger file path.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        PathBuf::from(&self.ledger.path)
    }

    /// Returns the request log file path.
    #[must_use]
    pub fn request_log_path(&self) -> PathBuf {
        PathBuf::from(&self.ledger.request_log_path)
    }

    /// Returns the artifact directory, when configured.
    #[must_use]
    pub fn artifact_dir(&self) -> Option<PathBuf> {
        self.ledger.artifact_dir.as_ref().map(PathBuf::from)
    }

    /// Returns the offline seeding pool.
    #[must_use]
    pub const fn seed_values(&self) -> &ResourceSet {
        &self.seed.values
    }
}

/// Ledger and request-log file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerPathsConfig {
    /// Ledger file path, also the advisory-lock key.
    #[serde(default = "default_ledger_path")]
    pub path: String,
    /// Request log file path.
    #[serde(default = "default_request_log_path")]
    pub request_log_path: String,
    /// Optional directory receiving the seed-time artifact copy.
    #[serde(default)]
    pub artifact_dir: Option<String>,
}

impl Default for LedgerPathsConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            request_log_path: default_request_log_path(),
            artifact_dir: None,
        }
    }
}

impl LedgerPathsConfig {
    /// Validates the path section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("ledger.path", &self.path)?;
        validate_path_string("ledger.request_log_path", &self.request_log_path)?;
        if self.path == self.request_log_path {
            return Err(ConfigError::Invalid(
                "ledger.path and ledger.request_log_path must differ".to_string(),
            ));
        }
        if let Some(dir) = &self.artifact_dir {
            validate_path_string("ledger.artifact_dir", dir)?;
        }
        Ok(())
    }
}

/// Reservation loop timing, millisecond-denominated.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservationTimingConfig {
    /// Wait between capacity checks while the pool is insufficient.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Hard ceiling on one acquisition wait.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// Wait between attempts to take a contended lock.
    #[serde(default = "default_lock_retry_interval_ms")]
    pub lock_retry_interval_ms: u64,
    /// Bound on lock attempts during release.
    #[serde(default = "default_release_lock_attempts")]
    pub release_lock_attempts: u32,
}

impl Default for ReservationTimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            lock_retry_interval_ms: DEFAULT_LOCK_RETRY_INTERVAL_MS,
            release_lock_attempts: DEFAULT_RELEASE_LOCK_ATTEMPTS,
        }
    }
}

impl ReservationTimingConfig {
    /// Validates timing against hard ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range_u64(
            "reservation.poll_interval_ms",
            self.poll_interval_ms,
            MIN_INTERVAL_MS,
            MAX_INTERVAL_MS,
        )?;
        validate_range_u64(
            "reservation.lock_retry_interval_ms",
            self.lock_retry_interval_ms,
            MIN_INTERVAL_MS,
            MAX_INTERVAL_MS,
        )?;
        validate_range_u64(
            "reservation.acquire_timeout_ms",
            self.acquire_timeout_ms,
            MIN_ACQUIRE_TIMEOUT_MS,
            MAX_ACQUIRE_TIMEOUT_MS,
        )?;
        if self.release_lock_attempts < MIN_RELEASE_LOCK_ATTEMPTS
            || self.release_lock_attempts > MAX_RELEASE_LOCK_ATTEMPTS
        {
            return Err(ConfigError::Invalid(format!(
                "reservation.release_lock_attempts must be between \
                 {MIN_RELEASE_LOCK_ATTEMPTS} and {MAX_RELEASE_LOCK_ATTEMPTS}"
            )));
        }
        Ok(())
    }
}

/// Offline seeding values.
///
/// Used when seeding without a live quota source; values land in the ledger
/// verbatim.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Initial counter values, one key per tracked resource.
    #[serde(default)]
    pub values: ResourceSet,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default ledger file path.
fn default_ledger_path() -> String {
    DEFAULT_LEDGER_PATH.to_string()
}

/// Default request log file path.
fn default_request_log_path() -> String {
    DEFAULT_REQUEST_LOG_PATH.to_string()
}

/// Default poll interval in milliseconds.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Default acquire timeout in milliseconds.
const fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MS
}

/// Default lock retry interval in milliseconds.
const fn default_lock_retry_interval_ms() -> u64 {
    DEFAULT_LOCK_RETRY_INTERVAL_MS
}

/// Default release lock attempts.
const fn default_release_lock_attempts() -> u32 {
    DEFAULT_RELEASE_LOCK_ATTEMPTS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
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

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a millisecond value against an inclusive range.
fn validate_range_u64(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Example
// ============================================================================

/// Returns a deterministic example configuration in TOML form.
#[must_use]
pub fn config_toml_example() -> String {
    let mut example = String::new();
    example.push_str("[ledger]\n");
    example.push_str("path = \"/tmp/quota-ledger.yaml\"\n");
    example.push_str("request_log_path = \"/tmp/quota-ledger-requests.yaml\"\n");
    example.push_str("artifact_dir = \"/tmp/quota-ledger-artifacts\"\n\n");
    example.push_str("[reservation]\n");
    example.push_str("poll_interval_ms = 1000\n");
    example.push_str("acquire_timeout_ms = 21600000\n");
    example.push_str("lock_retry_interval_ms = 1000\n");
    example.push_str("release_lock_attempts = 20\n\n");
    example.push_str("[seed.values]\n");
    example.push_str("\"ec2-normal\" = 128\n");
    example.push_str("vpc = 25\n");
    example.push_str("eip = 10\n");
    example.push_str("igw = 25\n");
    example.push_str("ngw = 10\n");
    example.push_str("classiclb = 20\n");
    example.push_str("\"ec2-GPU\" = 8\n");
    example.push_str("\"volume-GP2\" = 50\n");
    example.push_str("\"eventBridge-rules\" = 100\n");
    example
}
