//! Backends implementing the regex service contract.
//!
//! The service exposes four operations: validate a pattern, evaluate a
//! pattern against a sample, store a pattern+sample pair under a share
//! identifier, and resolve such an identifier. Everything above this module
//! talks to the service only through [`RegexService`].
//!
//! - [`HttpService`]: the remote JSON API (feature: `http`)
//! - [`LocalService`]: an in-process implementation for offline use
//! - `MockService`: a scriptable service for tests (feature: `mock`)

#[cfg(feature = "http")]
mod http;
mod local;
pub mod wire;

use std::future::Future;
use std::sync::Arc;

#[cfg(feature = "http")]
pub use http::HttpService;
pub use local::{DEFAULT_SHARE_TTL, LocalService};

use crate::error::Result;
use crate::types::{MatchSet, RegexPair, ShareId, ShareRecord};

/// The contract of the regex service.
///
/// Implementations must not fail on a malformed pattern during
/// [`validate`](Self::validate); they answer `false` instead.
pub trait RegexService: Send + Sync {
    /// Check whether `pattern` is valid in the service's dialect.
    fn validate(&self, pattern: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Find all matches of `pattern` in `test_string`, in order of occurrence.
    fn evaluate(
        &self,
        pattern: &str,
        test_string: &str,
    ) -> impl Future<Output = Result<MatchSet>> + Send;

    /// Store a pair and return its share identifier.
    fn share(&self, pair: &RegexPair) -> impl Future<Output = Result<ShareId>> + Send;

    /// Look up a previously shared pair.
    fn resolve(&self, id: &ShareId) -> impl Future<Output = Result<ShareRecord>> + Send;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;
}

impl<S: RegexService> RegexService for Arc<S> {
    fn validate(&self, pattern: &str) -> impl Future<Output = Result<bool>> + Send {
        (**self).validate(pattern)
    }

    fn evaluate(
        &self,
        pattern: &str,
        test_string: &str,
    ) -> impl Future<Output = Result<MatchSet>> + Send {
        (**self).evaluate(pattern, test_string)
    }

    fn share(&self, pair: &RegexPair) -> impl Future<Output = Result<ShareId>> + Send {
        (**self).share(pair)
    }

    fn resolve(&self, id: &ShareId) -> impl Future<Output = Result<ShareRecord>> + Send {
        (**self).resolve(id)
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

/// Available backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Remote JSON API over HTTP.
    Http,
    /// In-process service.
    Local,
    /// Scripted service for testing.
    Mock,
}

impl BackendType {
    /// Check if this backend is available.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Http => cfg!(feature = "http"),
            Self::Local => true,
            Self::Mock => cfg!(feature = "mock"),
        }
    }

    /// Get the backend name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Local => "local",
            Self::Mock => "mock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_availability() {
        assert!(BackendType::Local.is_available());
        assert_eq!(BackendType::Http.is_available(), cfg!(feature = "http"));
        assert_eq!(BackendType::Mock.name(), "mock");
    }

    #[tokio::test]
    async fn arc_forwards_to_inner() {
        let service = Arc::new(LocalService::new());
        assert!(service.validate("a+").await.unwrap());
        assert_eq!(service.backend_type(), BackendType::Local);
    }
}
