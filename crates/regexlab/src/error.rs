//! Error types for regexlab.
//!
//! Every failure a remote call can produce is classified into one of three
//! [`FailureKind`]s. Callers are expected to handle all of them locally by
//! degrading to a quiet state (cleared results, disabled actions); none of
//! them is fatal to a session. Local errors (storage, configuration) sit
//! outside that taxonomy.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Maximum length of a pattern echoed back in an error message.
const MAX_PATTERN_DISPLAY: usize = 80;

/// Shorten a pattern for display, appending an ellipsis when truncated.
fn format_pattern_snippet(pattern: &str) -> String {
    if pattern.is_empty() {
        return "(empty pattern)".to_string();
    }
    if pattern.chars().count() <= MAX_PATTERN_DISPLAY {
        return format!("'{pattern}'");
    }
    let head: String = pattern.chars().take(MAX_PATTERN_DISPLAY).collect();
    format!("'{head}...'")
}

/// A remote service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Pattern validation.
    Validate,
    /// Pattern evaluation against a sample.
    Evaluate,
    /// Share record creation.
    Share,
    /// Share record lookup.
    Resolve,
}

impl Operation {
    /// Get the operation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Evaluate => "evaluate",
            Self::Share => "share",
            Self::Resolve => "resolve",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of service-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The validator rejected the pattern, or could not be asked.
    InvalidPattern,
    /// The service was unreachable or answered with something unusable.
    Transport,
    /// A share identifier is unknown to the service.
    NotFound,
}

/// The main error type for regexlab operations.
#[derive(Debug, Error)]
pub enum LabError {
    /// The pattern is not valid in the service's dialect.
    #[error("invalid pattern: {}", format_pattern_snippet(pattern))]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// The service could not be reached.
    #[error("{operation} request failed: {message}")]
    Transport {
        /// The operation that was attempted.
        operation: Operation,
        /// Description of the transport failure.
        message: String,
    },

    /// The service answered with an unexpected status or body.
    #[error("malformed {operation} response: {message}")]
    MalformedResponse {
        /// The operation that was attempted.
        operation: Operation,
        /// What was wrong with the response.
        message: String,
    },

    /// Share identifier is unknown or expired.
    #[error("shared regex '{share_id}' not found or expired")]
    NotFound {
        /// The identifier that was looked up.
        share_id: String,
    },

    /// Saved entry index out of range.
    #[error("no saved entry at index {index} (have {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of saved entries.
        len: usize,
    },

    /// Reading or writing the saved-entry slot failed.
    #[error("storage error for slot '{slot}': {message}")]
    Storage {
        /// The storage slot name.
        slot: String,
        /// Description of the storage error.
        message: String,
    },

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Configuration file could not be loaded.
    #[error("failed to load config from {}: {message}", path.display())]
    ConfigFile {
        /// The configuration file path.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },
}

/// Result type alias for regexlab operations.
pub type Result<T> = std::result::Result<T, LabError>;

impl LabError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(operation: Operation, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(operation: Operation, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(share_id: impl Into<String>) -> Self {
        Self::NotFound {
            share_id: share_id.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(slot: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            slot: slot.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O result with context.
    pub fn with_io_context<T>(result: std::io::Result<T>, context: impl Into<String>) -> Result<T> {
        result.map_err(|e| Self::io_context(context, e))
    }

    /// Classify this error, if it came from a service interaction.
    #[must_use]
    pub const fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::InvalidPattern { .. } => Some(FailureKind::InvalidPattern),
            Self::Transport { .. } | Self::MalformedResponse { .. } => {
                Some(FailureKind::Transport)
            }
            Self::NotFound { .. } => Some(FailureKind::NotFound),
            _ => None,
        }
    }

    /// Check if this is an invalid pattern error.
    #[must_use]
    pub const fn is_invalid_pattern(&self) -> bool {
        matches!(self.kind(), Some(FailureKind::InvalidPattern))
    }

    /// Check if this is a transport error (including malformed responses).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind(), Some(FailureKind::Transport))
    }

    /// Check if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), Some(FailureKind::NotFound))
    }

    /// Returns a short message suitable for a status line.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "The pattern is not a valid regular expression.",
            Self::Transport { .. } | Self::MalformedResponse { .. } => {
                "Could not reach the regex service. Please try again."
            }
            Self::NotFound { .. } => "This shared regex does not exist or has expired.",
            Self::IndexOutOfRange { .. } => "That saved regex no longer exists.",
            Self::Storage { .. } | Self::IoWithContext { .. } | Self::Io(_) | Self::Json(_) => {
                "Could not access saved regexes."
            }
            Self::Config { .. } | Self::ConfigFile { .. } => "The configuration is invalid.",
        }
    }
}

impl From<toml::de::Error> for LabError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_display() {
        let err = LabError::invalid_pattern("(unclosed");
        let msg = err.to_string();
        assert!(msg.contains("invalid pattern"));
        assert!(msg.contains("(unclosed"));
    }

    #[test]
    fn empty_pattern_display() {
        let err = LabError::invalid_pattern("");
        assert!(err.to_string().contains("empty pattern"));
    }

    #[test]
    fn long_pattern_is_truncated() {
        let long = "a".repeat(200);
        let msg = LabError::invalid_pattern(long).to_string();
        assert!(msg.contains("..."));
        assert!(msg.len() < 150);
    }

    #[test]
    fn classification() {
        assert_eq!(
            LabError::invalid_pattern("x").kind(),
            Some(FailureKind::InvalidPattern)
        );
        assert_eq!(
            LabError::transport(Operation::Evaluate, "refused").kind(),
            Some(FailureKind::Transport)
        );
        assert_eq!(
            LabError::malformed(Operation::Evaluate, "bad json").kind(),
            Some(FailureKind::Transport)
        );
        assert_eq!(
            LabError::not_found("abc").kind(),
            Some(FailureKind::NotFound)
        );
        assert_eq!(LabError::config("bad").kind(), None);
    }

    #[test]
    fn predicates() {
        assert!(LabError::not_found("abc").is_not_found());
        assert!(!LabError::not_found("abc").is_transport());
        assert!(LabError::malformed(Operation::Share, "x").is_transport());
        assert!(LabError::invalid_pattern("[").is_invalid_pattern());
    }

    #[test]
    fn transport_display_names_operation() {
        let err = LabError::transport(Operation::Resolve, "connection refused");
        let msg = err.to_string();
        assert!(msg.starts_with("resolve request failed"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn user_messages() {
        assert!(LabError::not_found("x").user_message().contains("expired"));
        assert!(
            LabError::transport(Operation::Validate, "x")
                .user_message()
                .contains("regex service")
        );
    }

    #[test]
    fn with_io_context_helper() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let err = LabError::with_io_context(result, "writing saved regexes").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("writing saved regexes"));
        assert!(msg.contains("access denied"));
    }
}
