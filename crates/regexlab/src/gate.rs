//! Pattern validation with last-issued-wins ordering.
//!
//! The gate may be asked to validate on every keystroke, so several calls
//! can be in flight at once and complete in any order. Each call takes a
//! ticket from a monotonically increasing sequence; when it completes, its
//! answer only becomes the displayed [`ValidationState`] if no later ticket
//! has been issued in the meantime. The caller always receives its own
//! answer regardless.
//!
//! A call that cannot reach the validator answers `false`: no action may
//! proceed on a pattern the service has not confirmed.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::backend::RegexService;
use crate::metrics::SessionMetrics;
use crate::types::ValidationState;

/// The outcome of one validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    /// Sequence number of the call.
    pub ticket: u64,
    /// Whether the pattern is confirmed valid.
    pub valid: bool,
    /// Whether this answer became the displayed state.
    pub applied: bool,
}

#[derive(Debug, Default)]
struct GateState {
    latest: u64,
    validity: ValidationState,
}

/// Tracks whether the current pattern is valid.
#[derive(Debug)]
pub struct ValidationGate<S> {
    service: Arc<S>,
    state: Mutex<GateState>,
    metrics: Arc<SessionMetrics>,
}

impl<S: RegexService> ValidationGate<S> {
    /// Create a gate in front of a service.
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self::with_metrics(service, Arc::new(SessionMetrics::new()))
    }

    /// Create a gate that reports into shared metrics.
    #[must_use]
    pub fn with_metrics(service: Arc<S>, metrics: Arc<SessionMetrics>) -> Self {
        Self {
            service,
            state: Mutex::new(GateState::default()),
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The displayed validity.
    #[must_use]
    pub fn state(&self) -> ValidationState {
        self.lock().validity
    }

    /// Validate a pattern, answering `false` if the validator is unreachable.
    pub async fn validate(&self, pattern: &str) -> bool {
        self.validate_tracked(pattern).await.valid
    }

    /// Validate a pattern and report whether the answer was applied.
    pub async fn validate_tracked(&self, pattern: &str) -> Validation {
        let ticket = self.issue();

        let valid = match self.service.validate(pattern).await {
            Ok(valid) => valid,
            Err(err) => {
                warn!(ticket, error = %err, "validation failed, treating pattern as invalid");
                self.metrics.validation_failures.inc();
                false
            }
        };

        let applied = self.complete(ticket, valid);
        Validation {
            ticket,
            valid,
            applied,
        }
    }

    /// Take the next ticket and mark validity as pending.
    fn issue(&self) -> u64 {
        let mut state = self.lock();
        state.latest += 1;
        state.validity = ValidationState::Unknown;
        self.metrics.validations.inc();
        state.latest
    }

    /// Apply an answer if its ticket is still the latest one.
    fn complete(&self, ticket: u64, valid: bool) -> bool {
        let mut state = self.lock();
        if ticket != state.latest {
            debug!(ticket, latest = state.latest, "discarding superseded validation");
            self.metrics.superseded_validations.inc();
            return false;
        }
        state.validity = ValidationState::from_valid(valid);
        true
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::MockBuilder;

    #[tokio::test]
    async fn starts_unknown() {
        let gate = ValidationGate::new(Arc::new(MockBuilder::new().build()));
        assert_eq!(gate.state(), ValidationState::Unknown);
    }

    #[tokio::test]
    async fn applies_answer() {
        let gate = ValidationGate::new(Arc::new(MockBuilder::new().invalid("(").build()));

        assert!(gate.validate("a").await);
        assert_eq!(gate.state(), ValidationState::Valid);

        assert!(!gate.validate("(").await);
        assert_eq!(gate.state(), ValidationState::Invalid);
    }

    #[tokio::test]
    async fn transport_failure_fails_closed() {
        let gate = ValidationGate::new(Arc::new(
            MockBuilder::new().fail(Operation::Validate).build(),
        ));

        assert!(!gate.validate("a").await);
        assert_eq!(gate.state(), ValidationState::Invalid);
    }

    #[tokio::test]
    async fn later_issue_wins_over_later_completion() {
        let service = MockBuilder::new()
            .valid("x")
            .invalid("y")
            .delay_ms("x", 60)
            .build();
        let gate = ValidationGate::new(Arc::new(service));

        let (x, y) = tokio::join!(gate.validate_tracked("x"), gate.validate_tracked("y"));

        assert!(x.valid);
        assert!(!x.applied);
        assert!(!y.valid);
        assert!(y.applied);
        assert!(x.ticket < y.ticket);
        assert_eq!(gate.state(), ValidationState::Invalid);
    }

    #[tokio::test]
    async fn pending_state_is_unknown() {
        let service = MockBuilder::new().delay_ms("slow", 40).build();
        let gate = ValidationGate::new(Arc::new(service));
        assert!(gate.validate("fast").await);

        let observe = async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            gate.state()
        };
        let (valid, during) = tokio::join!(gate.validate("slow"), observe);

        assert!(valid);
        assert_eq!(during, ValidationState::Unknown);
        assert_eq!(gate.state(), ValidationState::Valid);
    }
}
