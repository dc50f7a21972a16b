// crates/transfer-intake-config/src/config.rs
// ============================================================================
// Module: Transfer Intake Configuration
// Description: Configuration loading and validation for Transfer Intake.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: transfer-intake-core, transfer-intake-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. The hashing secret may be
//! supplied through the environment instead of the file; it is required
//! either way and never printed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use transfer_intake_core::HashSecret;
use transfer_intake_core::PatchPolicy;
use transfer_intake_core::RateLimitSettings;
use transfer_intake_store_sqlite::SqliteStoreMode;
use transfer_intake_store_sqlite::SqliteSyncMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "transfer-intake.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TRANSFER_INTAKE_CONFIG";
/// Environment variable supplying the hashing secret.
pub const HASH_SECRET_ENV_VAR: &str = "TRANSFER_INTAKE_HASH_SECRET";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum allowed rate limit window in milliseconds.
pub(crate) const MIN_RATE_LIMIT_WINDOW_MS: u64 = 100;
/// Maximum allowed rate limit window in milliseconds (one day).
pub(crate) const MAX_RATE_LIMIT_WINDOW_MS: u64 = 86_400_000;
/// Maximum allowed requests per rate limit window.
pub(crate) const MAX_RATE_LIMIT_REQUESTS: u32 = 100_000;
/// Maximum number of tracked counter cache entries.
pub(crate) const MAX_CACHE_ENTRIES: usize = 65_536;
/// Minimum allowed counter cache TTL in milliseconds.
pub(crate) const MIN_CACHE_TTL_MS: u64 = 100;
/// Default rate limit window in milliseconds (ten minutes).
pub(crate) const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 600_000;
/// Default max requests per window.
pub(crate) const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 20;
/// Default counter cache TTL in milliseconds.
pub(crate) const DEFAULT_CACHE_TTL_MS: u64 = 30_000;
/// Default max tracked counter cache entries.
pub(crate) const DEFAULT_MAX_CACHE_ENTRIES: usize = 4_096;
/// Minimum length of the hashing secret.
pub(crate) const MIN_HASH_SECRET_LENGTH: usize = 16;
/// Default server bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Default sqlite busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Minimum notifier request timeout in milliseconds.
pub(crate) const MIN_NOTIFIER_TIMEOUT_MS: u64 = 100;
/// Maximum notifier request timeout in milliseconds.
pub(crate) const MAX_NOTIFIER_TIMEOUT_MS: u64 = 30_000;
/// Default notifier request timeout in milliseconds.
const DEFAULT_NOTIFIER_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Transfer Intake service configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IntakeConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Rate limiter configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Identifier hashing configuration.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Submission and counter store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Notification dispatcher configuration.
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Validation policy configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl IntakeConfig {
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
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if config.hashing.secret.is_none()
            && let Ok(secret) = env::var(HASH_SECRET_ENV_VAR)
        {
            config.hashing.secret = Some(secret);
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.rate_limit.validate()?;
        self.hashing.validate()?;
        self.store.validate()?;
        self.notifier.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (`host:port`).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum allowed request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid("server.bind must be a socket address".to_string()));
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_MAX_BODY_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Rate limit configuration for intake requests.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Window duration in milliseconds.
    #[serde(default = "default_rate_limit_window_ms")]
    pub window_ms: u64,
    /// Maximum requests per time window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: u32,
    /// Counter cache entry TTL in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// Maximum number of distinct counter cache entries.
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_rate_limit_window_ms(),
            max_requests: default_rate_limit_max_requests(),
            cache_ttl_ms: default_cache_ttl_ms(),
            max_cache_entries: default_max_cache_entries(),
        }
    }
}

impl RateLimitConfig {
    /// Validates rate limit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be greater than zero".to_string(),
            ));
        }
        if self.max_requests > MAX_RATE_LIMIT_REQUESTS {
            return Err(ConfigError::Invalid("rate_limit.max_requests too large".to_string()));
        }
        if self.window_ms < MIN_RATE_LIMIT_WINDOW_MS || self.window_ms > MAX_RATE_LIMIT_WINDOW_MS {
            return Err(ConfigError::Invalid(format!(
                "rate_limit.window_ms must be between {MIN_RATE_LIMIT_WINDOW_MS} and \
                 {MAX_RATE_LIMIT_WINDOW_MS}",
            )));
        }
        if self.cache_ttl_ms < MIN_CACHE_TTL_MS || self.cache_ttl_ms >= self.window_ms {
            return Err(ConfigError::Invalid(format!(
                "rate_limit.cache_ttl_ms must be between {MIN_CACHE_TTL_MS} and the window length",
            )));
        }
        if self.max_cache_entries == 0 || self.max_cache_entries > MAX_CACHE_ENTRIES {
            return Err(ConfigError::Invalid("rate_limit.max_cache_entries out of range".to_string()));
        }
        Ok(())
    }

    /// Returns the limiter settings for the runtime.
    #[must_use]
    pub fn settings(&self) -> RateLimitSettings {
        RateLimitSettings {
            window_ms: i64::try_from(self.window_ms).unwrap_or(i64::MAX),
            max_requests: self.max_requests,
        }
    }

    /// Returns the counter cache TTL in milliseconds.
    #[must_use]
    pub fn cache_ttl(&self) -> i64 {
        i64::try_from(self.cache_ttl_ms).unwrap_or(i64::MAX)
    }
}

/// Identifier hashing configuration.
#[derive(Clone, Deserialize, Default)]
pub struct HashingConfig {
    /// Hashing secret; may instead come from the environment.
    #[serde(default)]
    pub secret: Option<String>,
}

impl std::fmt::Debug for HashingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingConfig")
            .field("secret", &self.secret.as_ref().map(|_| "redacted"))
            .finish()
    }
}

impl HashingConfig {
    /// Validates hashing settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let Some(secret) = &self.secret else {
            return Err(ConfigError::Invalid(format!(
                "hashing.secret is required (set it in the config file or via {HASH_SECRET_ENV_VAR})",
            )));
        };
        if secret.len() < MIN_HASH_SECRET_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "hashing.secret must be at least {MIN_HASH_SECRET_LENGTH} characters",
            )));
        }
        Ok(())
    }

    /// Returns the hashing secret for the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no secret is configured.
    pub fn secret(&self) -> Result<HashSecret, ConfigError> {
        self.validate()?;
        self.secret
            .as_ref()
            .map(HashSecret::new)
            .ok_or_else(|| ConfigError::Invalid("hashing.secret is required".to_string()))
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory stores (tests and demos only).
    #[default]
    Memory,
    /// SQLite-backed durable stores.
    Sqlite,
}

/// Submission and counter store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// Database path (required for sqlite).
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_type == StoreType::Sqlite && self.path.is_none() {
            return Err(ConfigError::Invalid("store.type=sqlite requires store.path".to_string()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Notification dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Whether notifications are dispatched at all.
    #[serde(default)]
    pub enabled: bool,
    /// Webhook endpoint receiving submission summaries.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_notifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_ms: default_notifier_timeout_ms(),
        }
    }
}

impl NotifierConfig {
    /// Validates notifier settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled {
            let Some(endpoint) = &self.endpoint else {
                return Err(ConfigError::Invalid(
                    "notifier.enabled requires notifier.endpoint".to_string(),
                ));
            };
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "notifier.endpoint must include http:// or https://".to_string(),
                ));
            }
        }
        if self.timeout_ms < MIN_NOTIFIER_TIMEOUT_MS || self.timeout_ms > MAX_NOTIFIER_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "notifier.timeout_ms must be between {MIN_NOTIFIER_TIMEOUT_MS} and \
                 {MAX_NOTIFIER_TIMEOUT_MS}",
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines to stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard all events.
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path (required for the file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File && self.path.is_none() {
            return Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()));
        }
        Ok(())
    }
}

/// Validation policy configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValidationConfig {
    /// Patch validation policy.
    #[serde(default)]
    pub patch_policy: PatchPolicy,
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
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default rate limit window.
const fn default_rate_limit_window_ms() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_MS
}

/// Returns the default requests-per-window ceiling.
const fn default_rate_limit_max_requests() -> u32 {
    DEFAULT_RATE_LIMIT_MAX_REQUESTS
}

/// Returns the default counter cache TTL.
const fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

/// Returns the default counter cache capacity.
const fn default_max_cache_entries() -> usize {
    DEFAULT_MAX_CACHE_ENTRIES
}

/// Returns the default sqlite busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default notifier timeout.
const fn default_notifier_timeout_ms() -> u64 {
    DEFAULT_NOTIFIER_TIMEOUT_MS
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
