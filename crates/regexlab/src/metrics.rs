//! Metrics collection for sessions.
//!
//! Counters and a latency histogram updated by the validation gate, the
//! evaluation pipeline and the share resolver. All updates are lock-free.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A histogram of durations.
#[derive(Debug)]
pub struct Histogram {
    /// Bucket upper bounds in milliseconds.
    buckets: Vec<f64>,
    /// Counts per bucket, plus one overflow bucket.
    counts: Vec<AtomicU64>,
    /// Sum of all observations in microseconds.
    sum_micros: AtomicU64,
    /// Total count.
    count: AtomicU64,
}

impl Histogram {
    /// Create with default round-trip buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buckets(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0,
        ])
    }

    /// Create with custom bucket bounds in milliseconds.
    #[must_use]
    pub fn with_buckets(buckets: Vec<f64>) -> Self {
        let counts = (0..=buckets.len()).map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Observe a duration.
    pub fn observe(&self, duration: Duration) {
        let millis = duration.as_secs_f64() * 1000.0;
        let idx = self
            .buckets
            .iter()
            .position(|&b| millis <= b)
            .unwrap_or(self.buckets.len());
        self.counts[idx].fetch_add(1, Ordering::Relaxed);
        self.sum_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean of all observations, or zero if none.
    #[must_use]
    pub fn mean(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.sum_micros.load(Ordering::Relaxed) / count)
    }

    /// Get bucket counts.
    #[must_use]
    pub fn bucket_counts(&self) -> Vec<u64> {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Session metrics.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// Validation calls issued.
    pub validations: Counter,
    /// Validation calls that failed to reach the service.
    pub validation_failures: Counter,
    /// Validation results discarded because a newer call was issued.
    pub superseded_validations: Counter,
    /// Evaluations issued.
    pub evaluations: Counter,
    /// Evaluations that ended in a failure.
    pub failed_evaluations: Counter,
    /// Evaluation outcomes discarded because the session moved on.
    pub superseded_evaluations: Counter,
    /// Share links created.
    pub shares: Counter,
    /// Matcher round-trip latency.
    pub evaluate_latency: Histogram,
}

impl SessionMetrics {
    /// Create new session metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations: self.validations.get(),
            validation_failures: self.validation_failures.get(),
            superseded_validations: self.superseded_validations.get(),
            evaluations: self.evaluations.get(),
            failed_evaluations: self.failed_evaluations.get(),
            superseded_evaluations: self.superseded_evaluations.get(),
            shares: self.shares.get(),
            mean_evaluate_latency: self.evaluate_latency.mean(),
            evaluate_latency_buckets: self.evaluate_latency.bucket_counts(),
        }
    }
}

/// Snapshot of metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Validation calls issued.
    pub validations: u64,
    /// Validation calls that failed to reach the service.
    pub validation_failures: u64,
    /// Validation results discarded as superseded.
    pub superseded_validations: u64,
    /// Evaluations issued.
    pub evaluations: u64,
    /// Evaluations that ended in a failure.
    pub failed_evaluations: u64,
    /// Evaluation outcomes discarded as superseded.
    pub superseded_evaluations: u64,
    /// Share links created.
    pub shares: u64,
    /// Mean matcher round-trip latency.
    pub mean_evaluate_latency: Duration,
    /// Matcher round-trips per latency bucket, overflow last.
    pub evaluate_latency_buckets: Vec<u64>,
}
