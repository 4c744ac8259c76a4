//! Operation deadline wrapper
//!
//! Long-running pipeline stages (document processing, presentation
//! generation) run under hard deadlines. This module wraps a future with a
//! per-operation-kind time budget and surfaces expiry as an error whose
//! message the classifier resolves to a processing timeout.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

/// The pipeline stage a deadline applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Parsing and indexing an uploaded document.
    DocumentProcessing,
    /// Transferring file bytes to storage.
    Upload,
    /// Generating presentation output from processed documents.
    PresentationGeneration,
}

impl OperationKind {
    /// Default time budget for this stage.
    pub const fn default_budget(&self) -> Duration {
        match self {
            Self::DocumentProcessing => Duration::from_secs(840),
            Self::Upload => Duration::from_secs(120),
            Self::PresentationGeneration => Duration::from_secs(540),
        }
    }

    /// Short label used in timeout messages.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DocumentProcessing => "document processing",
            Self::Upload => "upload",
            Self::PresentationGeneration => "presentation generation",
        }
    }
}

/// Deadline configuration for one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadlineConfig {
    /// The stage being guarded.
    pub kind: OperationKind,
    /// Maximum time allowed for the operation.
    pub budget: Duration,
}

impl DeadlineConfig {
    /// Creates a config with the stage's default budget.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            budget: kind.default_budget(),
        }
    }

    /// Overrides the time budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

/// Failure of a deadline-guarded operation: either the deadline elapsed or
/// the operation itself failed.
#[derive(Debug, Error)]
pub enum DeadlineError<E> {
    /// The time budget was exceeded before the operation finished.
    #[error("{} timeout: operation exceeded {}s", .kind.label(), .budget.as_secs())]
    Elapsed {
        /// The guarded stage.
        kind: OperationKind,
        /// The budget that was exceeded.
        budget: Duration,
    },
    /// The operation failed on its own before the deadline.
    #[error("{0}")]
    Inner(E),
}

impl<E> DeadlineError<E> {
    /// Returns true if this failure was the deadline elapsing.
    pub fn is_elapsed(&self) -> bool {
        matches!(self, Self::Elapsed { .. })
    }
}

/// Runs a future under the configured deadline.
///
/// On expiry the inner future is dropped and a [`DeadlineError::Elapsed`] is
/// returned; its message classifies as a processing timeout. Errors from the
/// operation itself pass through as [`DeadlineError::Inner`] unmodified.
pub async fn run_with_deadline<T, E, Fut>(
    future: Fut,
    config: &DeadlineConfig,
) -> Result<T, DeadlineError<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    match timeout(config.budget, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(DeadlineError::Inner(error)),
        Err(_) => {
            warn!(
                kind = config.kind.label(),
                budget_secs = config.budget.as_secs(),
                "operation exceeded its deadline"
            );
            Err(DeadlineError::Elapsed {
                kind: config.kind,
                budget: config.budget,
            })
        }
    }
}
