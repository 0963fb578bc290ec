//! Mock regex service for testing.
//!
//! [`MockService`] answers from a script instead of compiling anything:
//! patterns are valid unless marked otherwise, evaluations return scripted
//! match lists, and any operation can be made to fail. Per-pattern delays
//! make it possible to control the order in which concurrent calls finish.
//!
//! # Example
//!
//! ```rust
//! use regexlab::mock::MockBuilder;
//! use regexlab::error::Operation;
//!
//! let service = MockBuilder::new()
//!     .invalid("(")
//!     .matches(r"\d+", ["12", "345"])
//!     .delay_ms("slow", 50)
//!     .fail(Operation::Share)
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::backend::{BackendType, RegexService};
use crate::error::{LabError, Operation, Result};
use crate::types::{MatchSet, RegexPair, ShareId, ShareRecord};

/// How an injected failure presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The service cannot be reached.
    Transport,
    /// The service answers with an unusable body.
    Malformed,
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// The operation invoked.
    pub operation: Operation,
    /// The pattern (or share identifier, for resolve) it was invoked with.
    pub argument: String,
}

#[derive(Debug)]
struct MockState {
    validity: HashMap<String, bool>,
    default_valid: bool,
    matches: HashMap<String, MatchSet>,
    delays: HashMap<String, Duration>,
    failures: HashMap<Operation, MockFailure>,
    shares: HashMap<String, ShareRecord>,
    next_share: u32,
    calls: Vec<MockCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            validity: HashMap::new(),
            default_valid: true,
            matches: HashMap::new(),
            delays: HashMap::new(),
            failures: HashMap::new(),
            shares: HashMap::new(),
            next_share: 0,
            calls: Vec::new(),
        }
    }
}

impl MockState {
    fn is_valid(&self, pattern: &str) -> bool {
        self.validity
            .get(pattern)
            .copied()
            .unwrap_or(self.default_valid)
    }

    /// Record a call and look up what it should experience.
    fn begin(&mut self, operation: Operation, argument: &str) -> (Duration, Option<MockFailure>) {
        self.calls.push(MockCall {
            operation,
            argument: argument.to_string(),
        });
        let delay = self.delays.get(argument).copied().unwrap_or(Duration::ZERO);
        (delay, self.failures.get(&operation).copied())
    }
}

/// A scriptable regex service.
#[derive(Debug, Clone, Default)]
pub struct MockService {
    state: Arc<Mutex<MockState>>,
}

impl MockService {
    /// Create a mock where every pattern is valid and matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set the validator's answer for a pattern.
    pub fn set_valid(&self, pattern: impl Into<String>, valid: bool) {
        self.lock().validity.insert(pattern.into(), valid);
    }

    /// Set the answer for patterns without an explicit entry.
    pub fn set_default_valid(&self, valid: bool) {
        self.lock().default_valid = valid;
    }

    /// Script the matches returned for a pattern.
    pub fn set_matches<I, M>(&self, pattern: impl Into<String>, matches: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let matches = matches.into_iter().map(Into::into).collect();
        self.lock().matches.insert(pattern.into(), matches);
    }

    /// Delay every call made with the given pattern or identifier.
    pub fn set_delay(&self, argument: impl Into<String>, delay: Duration) {
        self.lock().delays.insert(argument.into(), delay);
    }

    /// Make an operation fail.
    pub fn set_failure(&self, operation: Operation, failure: MockFailure) {
        self.lock().failures.insert(operation, failure);
    }

    /// Let an operation succeed again.
    pub fn clear_failure(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    /// Pre-seed a share record under a fixed identifier.
    pub fn insert_share(&self, id: impl Into<String>, record: ShareRecord) {
        self.lock().shares.insert(id.into(), record);
    }

    /// Get every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Count calls of one operation.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    /// Number of stored share records.
    #[must_use]
    pub fn share_count(&self) -> usize {
        self.lock().shares.len()
    }

    async fn settle(operation: Operation, delay: Duration, failure: Option<MockFailure>) -> Result<()> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match failure {
            None => Ok(()),
            Some(MockFailure::Transport) => {
                Err(LabError::transport(operation, "connection refused"))
            }
            Some(MockFailure::Malformed) => {
                Err(LabError::malformed(operation, "expected value at line 1 column 1"))
            }
        }
    }
}

impl RegexService for MockService {
    async fn validate(&self, pattern: &str) -> Result<bool> {
        let (delay, failure, valid) = {
            let mut state = self.lock();
            let (delay, failure) = state.begin(Operation::Validate, pattern);
            (delay, failure, state.is_valid(pattern))
        };
        Self::settle(Operation::Validate, delay, failure).await?;
        Ok(valid)
    }

    async fn evaluate(&self, pattern: &str, _test_string: &str) -> Result<MatchSet> {
        let (delay, failure, valid, matches) = {
            let mut state = self.lock();
            let (delay, failure) = state.begin(Operation::Evaluate, pattern);
            let matches = state.matches.get(pattern).cloned().unwrap_or_default();
            (delay, failure, state.is_valid(pattern), matches)
        };
        Self::settle(Operation::Evaluate, delay, failure).await?;
        if !valid {
            return Err(LabError::transport(
                Operation::Evaluate,
                "service returned 400 Bad Request: invalid regex pattern",
            ));
        }
        Ok(matches)
    }

    async fn share(&self, pair: &RegexPair) -> Result<ShareId> {
        let (delay, failure) = self.lock().begin(Operation::Share, &pair.pattern);
        Self::settle(Operation::Share, delay, failure).await?;

        let mut state = self.lock();
        if !state.is_valid(&pair.pattern) {
            return Err(LabError::transport(
                Operation::Share,
                "service returned 400 Bad Request: invalid regex pattern",
            ));
        }
        state.next_share += 1;
        let id = format!("mock{:04}", state.next_share);
        state.shares.insert(id.clone(), pair.clone());
        Ok(ShareId::new(id))
    }

    async fn resolve(&self, id: &ShareId) -> Result<ShareRecord> {
        let (delay, failure) = self.lock().begin(Operation::Resolve, id.as_str());
        Self::settle(Operation::Resolve, delay, failure).await?;

        self.lock()
            .shares
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| LabError::not_found(id.as_str()))
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mock
    }
}

/// Builder for creating mock services fluently.
#[derive(Debug, Default)]
pub struct MockBuilder {
    service: MockService,
}

impl MockBuilder {
    /// Create a new mock builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a pattern as valid.
    #[must_use]
    pub fn valid(self, pattern: &str) -> Self {
        self.service.set_valid(pattern, true);
        self
    }

    /// Mark a pattern as invalid.
    #[must_use]
    pub fn invalid(self, pattern: &str) -> Self {
        self.service.set_valid(pattern, false);
        self
    }

    /// Treat unlisted patterns as invalid.
    #[must_use]
    pub fn invalid_by_default(self) -> Self {
        self.service.set_default_valid(false);
        self
    }

    /// Script the matches for a pattern.
    #[must_use]
    pub fn matches<I, M>(self, pattern: &str, matches: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.service.set_matches(pattern, matches);
        self
    }

    /// Delay calls made with a pattern or identifier.
    #[must_use]
    pub fn delay_ms(self, argument: &str, ms: u64) -> Self {
        self.service.set_delay(argument, Duration::from_millis(ms));
        self
    }

    /// Make an operation fail with a transport error.
    #[must_use]
    pub fn fail(self, operation: Operation) -> Self {
        self.service.set_failure(operation, MockFailure::Transport);
        self
    }

    /// Make an operation answer with a malformed body.
    #[must_use]
    pub fn malformed(self, operation: Operation) -> Self {
        self.service.set_failure(operation, MockFailure::Malformed);
        self
    }

    /// Pre-seed a share record.
    #[must_use]
    pub fn share(self, id: &str, pattern: &str, test_string: &str) -> Self {
        self.service
            .insert_share(id, RegexPair::new(pattern, test_string));
        self
    }

    /// Build the mock service.
    #[must_use]
    pub fn build(self) -> MockService {
        self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_are_valid_and_empty() {
        let service = MockService::new();
        assert!(service.validate("anything").await.unwrap());
        assert!(service.evaluate("anything", "text").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scripted_answers() {
        let service = MockBuilder::new()
            .invalid("(")
            .matches("a", ["a", "a"])
            .build();

        assert!(!service.validate("(").await.unwrap());
        assert_eq!(service.evaluate("a", "aa").await.unwrap(), vec!["a", "a"]);
        assert_eq!(service.call_count(Operation::Validate), 1);
        assert_eq!(service.call_count(Operation::Evaluate), 1);
    }

    #[tokio::test]
    async fn injected_failures() {
        let service = MockBuilder::new()
            .fail(Operation::Validate)
            .malformed(Operation::Evaluate)
            .build();

        assert!(service.validate("a").await.unwrap_err().is_transport());
        let err = service.evaluate("a", "").await.unwrap_err();
        assert!(matches!(err, LabError::MalformedResponse { .. }));

        service.clear_failure(Operation::Validate);
        assert!(service.validate("a").await.unwrap());
    }

    #[tokio::test]
    async fn share_round_trip() {
        let service = MockService::new();
        let pair = RegexPair::new("x+", "xxx");
        let id = service.share(&pair).await.unwrap();
        assert_eq!(id.as_str(), "mock0001");
        assert_eq!(service.resolve(&id).await.unwrap(), pair);
        assert!(
            service
                .resolve(&ShareId::new("nope"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let service = MockService::new();
        let clone = service.clone();
        clone.set_valid("p", false);
        assert!(!service.validate("p").await.unwrap());
    }
}
