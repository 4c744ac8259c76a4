//! Instrumentation for classification and retry activity
//!
//! Counters the host application can keep alongside the core without coupling
//! it to any metrics transport: classification frequency by category, and
//! per-execution retry totals collected through the observer seam.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClassificationResult, ErrorCategory};
use crate::retry::RetryObserver;

/// Frequency of classified error categories.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Count of classifications per category.
    pub frequency: HashMap<ErrorCategory, u32>,
}

impl ClassificationStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one classified result.
    pub fn record(&mut self, result: &ClassificationResult) {
        *self.frequency.entry(result.category).or_insert(0) += 1;
    }

    /// Total number of recorded classifications.
    pub fn total(&self) -> u32 {
        self.frequency.values().sum()
    }

    /// The category seen most often, if anything was recorded.
    pub fn most_common(&self) -> Option<ErrorCategory> {
        self.frequency
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(category, _)| *category)
    }

    /// Count for one category.
    pub fn count(&self, category: ErrorCategory) -> u32 {
        self.frequency.get(&category).copied().unwrap_or(0)
    }
}

/// Retry totals for a single execution, collected via [`RetryObserver`].
///
/// The executor itself stays uninstrumented; pass a `RetryMetrics` to
/// [`crate::retry::RetryPolicy::run_observed`] to count what happened.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetryMetrics {
    /// Number of retries that were scheduled (not counting the initial
    /// attempt).
    pub retries: u32,
    /// Sum of the backoff delays that were slept.
    pub total_backoff: Duration,
}

impl RetryMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total attempts implied by the recorded retries, assuming the
    /// execution ran to completion.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Adds a slept backoff delay. The executor does not report delays via
    /// [`RetryObserver`]; callers using the feedback sink can forward them
    /// here.
    pub fn add_backoff(&mut self, delay: Duration) {
        self.total_backoff += delay;
    }
}

impl<E> RetryObserver<E> for RetryMetrics {
    fn on_retry(&mut self, _attempt: u32, _max_attempts: u32, _error: &E) {
        self.retries += 1;
    }
}
