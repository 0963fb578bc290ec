//! Environment-based configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "REGEXLAB";

/// Environment variable reader.
///
/// Reads `<PREFIX>_<NAME>` from the process environment, or from an explicit
/// variable map when one is supplied.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Explicit variables used instead of the process environment.
    source: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: None,
        }
    }

    /// Create a reader over an explicit set of variables.
    #[must_use]
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            source: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.source {
            Some(vars) => vars.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a parsed value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Get a duration in milliseconds.
    #[must_use]
    pub fn duration_millis(&self, name: &str) -> Option<Duration> {
        self.parse::<u64>(name).map(Duration::from_millis)
    }
}

/// Recognized variable names (without prefix).
pub mod vars {
    /// Base URL of the service API.
    pub const API_URL: &str = "API_URL";
    /// Request timeout in milliseconds.
    pub const TIMEOUT_MS: &str = "TIMEOUT_MS";
    /// Origin for share links.
    pub const ORIGIN: &str = "ORIGIN";
    /// Whether share links are copied to the clipboard.
    pub const CLIPBOARD: &str = "CLIPBOARD";
    /// Saved-entry directory.
    pub const STORAGE_DIR: &str = "STORAGE_DIR";
    /// Saved-entry slot name.
    pub const SLOT: &str = "SLOT";
    /// Log filter.
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Log format.
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_config_prefix() {
        let config = EnvConfig::new("TEST");
        assert_eq!(config.var_name("foo"), "TEST_FOO");
        assert_eq!(config.var_name("bar_baz"), "TEST_BAR_BAZ");
    }

    #[test]
    fn explicit_source() {
        let config = EnvConfig::from_vars(
            "LAB",
            [("LAB_ENABLED", "yes"), ("LAB_TIMEOUT_MS", "250"), ("OTHER", "x")],
        );

        assert_eq!(config.bool("enabled"), Some(true));
        assert_eq!(
            config.duration_millis("timeout_ms"),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.get("other"), None);
    }

    #[test]
    fn unparseable_values_are_ignored() {
        let config = EnvConfig::from_vars("LAB", [("LAB_TIMEOUT_MS", "soon")]);
        assert_eq!(config.duration_millis("timeout_ms"), None);
    }
}
