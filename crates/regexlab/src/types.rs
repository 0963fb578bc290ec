//! Common types for regexlab.
//!
//! This module defines the data exchanged with the regex service and the
//! client-side state derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pattern together with the sample text it is tested against.
///
/// This is the shape of both a saved entry and a share record, and it
/// serializes with the service's field names (`pattern`, `testString`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexPair {
    /// The pattern, byte-for-byte as entered.
    pub pattern: String,
    /// The sample text.
    pub test_string: String,
}

impl RegexPair {
    /// Create a new pair.
    #[must_use]
    pub fn new(pattern: impl Into<String>, test_string: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            test_string: test_string.into(),
        }
    }
}

/// An entry in the locally saved list.
pub type SavedEntry = RegexPair;

/// A pattern+sample pair held by the service under a share identifier.
pub type ShareRecord = RegexPair;

/// Validity of the current pattern as last reported by the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidationState {
    /// No answer yet, or a validation call is in flight.
    #[default]
    Unknown,
    /// The validator accepted the pattern.
    Valid,
    /// The validator rejected the pattern, or could not be reached.
    Invalid,
}

impl ValidationState {
    /// Map a validator answer to a state.
    #[must_use]
    pub const fn from_valid(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }

    /// Check if the pattern is confirmed valid.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if the pattern is known to be invalid.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

/// Ordered matched substrings, in order of occurrence in the sample.
pub type MatchSet = Vec<String>;

/// An opaque, URL-fragment-safe share identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that every character can appear in a URL fragment unescaped.
    #[must_use]
    pub fn is_fragment_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShareId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A shareable link of the form `<origin>/#<shareId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// The identifier embedded in the link.
    pub id: ShareId,
    /// The full link text.
    pub url: String,
}

impl ShareLink {
    /// Compose a link from an origin and identifier.
    #[must_use]
    pub fn compose(origin: &str, id: ShareId) -> Self {
        let url = format!("{}/#{}", origin.trim_end_matches('/'), id);
        Self { id, url }
    }

    /// Get the link text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Extract the fragment (text after the first `#`) from a location string.
///
/// Returns an empty string when the location has no fragment.
#[must_use]
pub fn fragment_of(location: &str) -> &str {
    location.split_once('#').map_or("", |(_, fragment)| fragment)
}
