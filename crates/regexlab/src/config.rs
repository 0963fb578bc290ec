//! Configuration types for regexlab.
//!
//! [`LabConfig`] gathers everything a client session needs: where the regex
//! service lives, which origin share links point at, where saved entries are
//! stored, and how logs are emitted. It can be built in code, read from a
//! TOML file, and overridden from `REGEXLAB_*` environment variables.
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:8080/api"
//! timeout_ms = 10000
//!
//! [share]
//! origin = "https://regexlab.dev"
//!
//! [storage]
//! dir = "/home/me/.local/share/regexlab"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

pub mod env;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use env::EnvConfig;

use crate::error::{LabError, Result};

/// Default base URL of the regex service API.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default origin that share links are composed against.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Default name of the saved-entry slot.
pub const DEFAULT_SLOT: &str = "savedRegexes";

/// Default request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Remote service settings.
    pub service: ServiceConfig,
    /// Share link settings.
    pub share: ShareConfig,
    /// Saved-entry storage settings.
    pub storage: StorageConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl LabConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LabError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| LabError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env(&EnvConfig::default())
    }

    /// Apply environment overrides on top of this configuration.
    pub fn with_env(mut self, env: &EnvConfig) -> Result<Self> {
        if let Some(url) = env.get(env::vars::API_URL) {
            self.service.base_url = url;
        }
        if let Some(timeout) = env.duration_millis(env::vars::TIMEOUT_MS) {
            self.service.timeout_ms = timeout.as_millis() as u64;
        }
        if let Some(origin) = env.get(env::vars::ORIGIN) {
            self.share.origin = origin;
        }
        if let Some(copy) = env.bool(env::vars::CLIPBOARD) {
            self.share.copy_to_clipboard = copy;
        }
        if let Some(dir) = env.get(env::vars::STORAGE_DIR) {
            self.storage.dir = Some(PathBuf::from(dir));
        }
        if let Some(slot) = env.get(env::vars::SLOT) {
            self.storage.slot = slot;
        }
        if let Some(level) = env.get(env::vars::LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = env.get(env::vars::LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(LabError::config("service.base_url must not be empty"));
        }
        if self.service.timeout_ms == 0 {
            return Err(LabError::config("service.timeout_ms must be positive"));
        }
        if self.storage.slot.trim().is_empty() {
            return Err(LabError::config("storage.slot must not be empty"));
        }
        if self.storage.slot.contains(['/', '\\']) {
            return Err(LabError::config(
                "storage.slot must not contain path separators",
            ));
        }
        Ok(())
    }
}

/// Configuration for the remote regex service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API base URL; operations are addressed relative to it.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ServiceConfig {
    /// Create a service configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Get the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Configuration for share links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Origin of the client that opens share links.
    pub origin: String,
    /// Whether created links are copied to the clipboard.
    pub copy_to_clipboard: bool,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            copy_to_clipboard: true,
        }
    }
}

impl ShareConfig {
    /// Create a share configuration for the given origin.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }

    /// Set whether links are copied to the clipboard.
    #[must_use]
    pub const fn copy_to_clipboard(mut self, enabled: bool) -> Self {
        self.copy_to_clipboard = enabled;
        self
    }
}

/// Configuration for saved-entry storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the slot file; `None` keeps entries in memory.
    pub dir: Option<PathBuf>,
    /// Name of the slot holding the saved list.
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl StorageConfig {
    /// Store entries under the given directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Set the slot name.
    #[must_use]
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }
}

/// Configuration for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `regexlab=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directive.
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the log format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,

    /// Single-line human-readable output.
    Compact,

    /// Newline-delimited JSON.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" | "ndjson" => Ok(Self::Json),
            other => Err(LabError::config(format!("unknown log format '{other}'"))),
        }
    }
}
