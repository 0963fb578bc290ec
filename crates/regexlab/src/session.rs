//! The evaluation session.
//!
//! An [`EvaluationSession`] holds the fields a user edits (pattern and
//! sample), the outcome of the last evaluation, the saved-entry list and
//! the most recent share link. Every action goes through the
//! [`ValidationGate`] first; nothing is sent to the matcher, saved or
//! shared for a pattern the service has not confirmed.
//!
//! # Stale outcomes
//!
//! Each edit and each evaluation advances the session epoch. An evaluation
//! remembers the epoch it was issued in and applies its outcome only if
//! the epoch has not moved since. A slow evaluation that finishes after a
//! newer one, or after the pattern changed, is returned to its caller but
//! leaves the displayed state alone.
//!
//! # Example
//!
//! ```rust
//! use regexlab::LocalService;
//! use regexlab::session::EvaluationSession;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> regexlab::Result<()> {
//! let session = EvaluationSession::new(LocalService::new());
//! session.set_pattern(r"\d+").await;
//! session.set_sample("a12b345");
//!
//! let evaluation = session.run().await?;
//! assert_eq!(evaluation.matches, vec!["12", "345"]);
//! # Ok(())
//! # }
//! ```

mod builder;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub use builder::SessionBuilder;
use tracing::{debug, info, warn};

use crate::backend::{BackendType, RegexService};
use crate::convert::{ConversionTable, convert};
use crate::error::{LabError, Result};
use crate::gate::ValidationGate;
use crate::metrics::{MetricsSnapshot, SessionMetrics};
use crate::share::ShareLinkResolver;
use crate::store::SavedStore;
use crate::types::{MatchSet, RegexPair, SavedEntry, ShareLink, ValidationState};

/// The outcome of one successful evaluation.
///
/// Matches and conversions always come from the same call, so they are
/// shown and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Matched substrings in order of occurrence.
    pub matches: MatchSet,
    /// Client-observed matcher round-trip time.
    pub elapsed: Duration,
    /// Construction snippets for the evaluated pattern.
    pub conversions: ConversionTable,
}

impl Evaluation {
    /// Number of matches.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Elapsed time in milliseconds, rounded to two decimals.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        round_millis(self.elapsed)
    }
}

fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100_000.0).round() / 100.0
}

/// Everything the session displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The pattern being edited.
    pub pattern: String,
    /// The sample text being edited.
    pub sample: String,
    /// The last applied evaluation, if any.
    pub evaluation: Option<Evaluation>,
    /// The last created share link, if any.
    pub share_link: Option<ShareLink>,
    epoch: u64,
}

impl SessionState {
    /// Drop derived results and move to a new epoch.
    fn advance(&mut self) -> u64 {
        self.epoch += 1;
        self.evaluation = None;
        self.epoch
    }

    fn current_pair(&self) -> RegexPair {
        RegexPair::new(self.pattern.clone(), self.sample.clone())
    }
}

/// A pattern evaluation session against a regex service.
pub struct EvaluationSession<S> {
    service: Arc<S>,
    gate: Arc<ValidationGate<S>>,
    resolver: ShareLinkResolver<S>,
    store: Mutex<SavedStore>,
    state: Mutex<SessionState>,
    metrics: Arc<SessionMetrics>,
}

impl<S> std::fmt::Debug for EvaluationSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationSession")
            .field("resolver", &self.resolver)
            .field("store", &self.store)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: RegexService> EvaluationSession<S> {
    /// Create a session with default settings, in-memory storage and no
    /// clipboard.
    #[must_use]
    pub fn new(service: S) -> Self {
        let service = Arc::new(service);
        let metrics = Arc::new(SessionMetrics::new());
        let gate = Arc::new(ValidationGate::with_metrics(
            Arc::clone(&service),
            Arc::clone(&metrics),
        ));
        let resolver = ShareLinkResolver::new(
            Arc::clone(&gate),
            Arc::clone(&service),
            crate::config::DEFAULT_ORIGIN,
            Arc::clone(&metrics),
        );
        Self::from_parts(service, gate, resolver, SavedStore::in_memory(), metrics)
    }

    /// Start building a session.
    #[must_use]
    pub fn builder(service: S) -> SessionBuilder<S> {
        SessionBuilder::new(service)
    }

    fn from_parts(
        service: Arc<S>,
        gate: Arc<ValidationGate<S>>,
        resolver: ShareLinkResolver<S>,
        store: SavedStore,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            service,
            gate,
            resolver,
            store: Mutex::new(store),
            state: Mutex::new(SessionState::default()),
            metrics,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn store(&self) -> MutexGuard<'_, SavedStore> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replace the pattern and validate it.
    ///
    /// Clears the displayed evaluation. Returns the validator's answer for
    /// this pattern.
    pub async fn set_pattern(&self, pattern: impl Into<String>) -> bool {
        let pattern = pattern.into();
        {
            let mut state = self.state();
            state.pattern.clone_from(&pattern);
            state.advance();
        }
        self.gate.validate(&pattern).await
    }

    /// Replace the sample text. Clears the displayed evaluation.
    pub fn set_sample(&self, sample: impl Into<String>) {
        let mut state = self.state();
        state.sample = sample.into();
        state.advance();
    }

    /// Evaluate the current pattern against the current sample.
    pub async fn run(&self) -> Result<Evaluation> {
        let pair = self.state().current_pair();
        self.evaluate(&pair.pattern, &pair.test_string).await
    }

    /// Validate, then match `pattern` against `sample`.
    ///
    /// On success the evaluation becomes the displayed one; on failure the
    /// displayed evaluation is cleared. Either happens only if no edit or
    /// newer evaluation has occurred since this call was issued.
    pub async fn evaluate(&self, pattern: &str, sample: &str) -> Result<Evaluation> {
        let epoch = self.state().advance();
        self.metrics.evaluations.inc();

        let outcome = self.validate_and_match(pattern, sample).await;
        if let Err(err) = &outcome {
            self.metrics.failed_evaluations.inc();
            warn!(epoch, error = %err, "evaluation failed");
        }

        let mut state = self.state();
        if state.epoch == epoch {
            state.evaluation = outcome.as_ref().ok().cloned();
        } else {
            debug!(epoch, current = state.epoch, "discarding superseded evaluation");
            self.metrics.superseded_evaluations.inc();
        }
        outcome
    }

    async fn validate_and_match(&self, pattern: &str, sample: &str) -> Result<Evaluation> {
        if !self.gate.validate(pattern).await {
            return Err(LabError::invalid_pattern(pattern));
        }

        let start = Instant::now();
        let matches = self.service.evaluate(pattern, sample).await?;
        let elapsed = start.elapsed();
        self.metrics.evaluate_latency.observe(elapsed);

        debug!(matches = matches.len(), elapsed_ms = round_millis(elapsed), "evaluated pattern");
        Ok(Evaluation {
            matches,
            elapsed,
            conversions: convert(pattern),
        })
    }

    /// Save the current pattern and sample.
    ///
    /// The pattern is validated first; nothing is saved if it is rejected.
    pub async fn save_current(&self) -> Result<SavedEntry> {
        let entry = self.state().current_pair();
        if !self.gate.validate(&entry.pattern).await {
            return Err(LabError::invalid_pattern(entry.pattern));
        }
        self.store().save(entry.clone())?;
        Ok(entry)
    }

    /// Delete the saved entry at `index`.
    pub fn delete_saved(&self, index: usize) -> Result<SavedEntry> {
        self.store().delete(index)
    }

    /// The saved entries in insertion order.
    #[must_use]
    pub fn saved(&self) -> Vec<SavedEntry> {
        self.store().entries().to_vec()
    }

    /// Write the saved entries to the export file in `dir`.
    pub fn export_saved(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.store().export_to(dir)
    }

    /// The saved entries as a pretty-printed JSON array.
    pub fn export_saved_json(&self) -> Result<String> {
        self.store().export_json()
    }

    /// Share the current pattern and sample.
    pub async fn share(&self) -> Result<ShareLink> {
        let pair = self.state().current_pair();
        let link = self
            .resolver
            .create_share_link(&pair.pattern, &pair.test_string)
            .await?;
        self.state().share_link = Some(link.clone());
        Ok(link)
    }

    /// Seed the session from a share link fragment.
    ///
    /// Returns whether a shared pair was loaded. An unknown identifier or
    /// an unreachable service leaves the session as it was.
    pub async fn load_fragment(&self, fragment: &str) -> bool {
        match self.resolver.resolve_share_link(fragment).await {
            Ok(Some(pair)) => {
                info!(pattern = %pair.pattern, "loaded shared regex");
                self.set_sample(pair.test_string);
                self.set_pattern(pair.pattern).await;
                true
            }
            Ok(None) => false,
            Err(err) if err.is_not_found() => {
                warn!(error = %err, "shared regex not found, starting empty");
                false
            }
            Err(err) => {
                warn!(error = %err, "could not load shared regex, starting empty");
                false
            }
        }
    }

    /// A copy of the displayed state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    /// The current pattern.
    #[must_use]
    pub fn pattern(&self) -> String {
        self.state().pattern.clone()
    }

    /// The current sample.
    #[must_use]
    pub fn sample(&self) -> String {
        self.state().sample.clone()
    }

    /// The displayed validity of the current pattern.
    #[must_use]
    pub fn validity(&self) -> ValidationState {
        self.gate.state()
    }

    /// The displayed evaluation.
    #[must_use]
    pub fn evaluation(&self) -> Option<Evaluation> {
        self.state().evaluation.clone()
    }

    /// The displayed matches, empty when nothing is displayed.
    #[must_use]
    pub fn matches(&self) -> MatchSet {
        self.state()
            .evaluation
            .as_ref()
            .map(|e| e.matches.clone())
            .unwrap_or_default()
    }

    /// The displayed conversions.
    #[must_use]
    pub fn conversions(&self) -> Option<ConversionTable> {
        self.state()
            .evaluation
            .as_ref()
            .map(|e| e.conversions.clone())
    }

    /// The displayed elapsed time in milliseconds, zero when nothing is
    /// displayed.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.state()
            .evaluation
            .as_ref()
            .map_or(0.0, Evaluation::elapsed_ms)
    }

    /// The last created share link.
    #[must_use]
    pub fn share_link(&self) -> Option<ShareLink> {
        self.state().share_link.clone()
    }

    /// Session counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The backend this session talks to.
    #[must_use]
    pub fn backend_type(&self) -> BackendType {
        self.service.backend_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalService;

    #[test]
    fn rounds_to_two_decimals() {
        assert!((round_millis(Duration::from_micros(1_234)) - 1.23).abs() < f64::EPSILON);
        assert!((round_millis(Duration::from_micros(1_235_600)) - 1235.6).abs() < 1e-9);
        assert!(round_millis(Duration::ZERO).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn run_uses_current_fields() {
        let session = EvaluationSession::new(LocalService::new());
        assert!(session.set_pattern("b+").await);
        session.set_sample("abbcb");

        let evaluation = session.run().await.unwrap();
        assert_eq!(evaluation.matches, vec!["bb", "b"]);
        assert_eq!(evaluation.match_count(), 2);
        assert_eq!(session.matches(), evaluation.matches);
        assert!(session.conversions().is_some());
    }

    #[tokio::test]
    async fn edits_clear_results() {
        let session = EvaluationSession::new(LocalService::new());
        session.set_pattern("a").await;
        session.set_sample("a");
        session.run().await.unwrap();

        session.set_sample("aa");
        assert!(session.evaluation().is_none());
        assert!(session.elapsed_ms().abs() < f64::EPSILON);

        session.run().await.unwrap();
        session.set_pattern("b").await;
        assert!(session.matches().is_empty());
    }

    #[tokio::test]
    async fn invalid_pattern_is_not_saved() {
        let session = EvaluationSession::new(LocalService::new());
        session.set_pattern("(").await;
        assert_eq!(session.validity(), ValidationState::Invalid);

        assert!(session.save_current().await.unwrap_err().is_invalid_pattern());
        assert!(session.saved().is_empty());
    }

    #[tokio::test]
    async fn share_remembers_link() {
        let session = EvaluationSession::new(LocalService::new());
        session.set_pattern("x").await;
        let link = session.share().await.unwrap();
        assert_eq!(session.share_link(), Some(link));
        assert_eq!(session.metrics().shares, 1);
    }
}
