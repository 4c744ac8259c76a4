//! Batch result aggregation for multi-file uploads
//!
//! The upload loop processes files independently and hands the per-item
//! outcomes to [`summarize`], which folds them into a single summary with a
//! correctly pluralized message and actionable guidance. The summary status
//! is a pure function of the two counts.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A file that was processed successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemSuccess {
    /// Original filename as provided by the user.
    pub filename: String,
    /// Identifier assigned by the pipeline, when available.
    pub document_id: Option<String>,
}

impl BatchItemSuccess {
    /// Creates a success item for a filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            document_id: None,
        }
    }

    /// Attaches the pipeline-assigned document id.
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

/// A file that failed to process, with the failure message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemFailure {
    /// Original filename as provided by the user.
    pub filename: String,
    /// The error message for this file.
    pub error: String,
}

impl BatchItemFailure {
    /// Creates a failure item.
    pub fn new(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            error: error.into(),
        }
    }
}

/// Overall batch outcome tier, derived purely from the success/failure counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every file succeeded (including the empty batch).
    Success,
    /// Some files succeeded, some failed.
    Warning,
    /// Every file failed.
    Error,
}

/// Aggregated summary of a batch upload, ready for the presentation layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Outcome tier.
    pub status: BatchStatus,
    /// Headline message with counts, pluralized from the counts themselves.
    pub message: String,
    /// Corrective guidance; empty when nothing failed.
    pub suggestions: Vec<String>,
    /// The successful items, in input order.
    pub successful: Vec<BatchItemSuccess>,
    /// The failed items, in input order.
    pub failed: Vec<BatchItemFailure>,
}

impl BatchSummary {
    /// Number of files that succeeded.
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    /// Number of files that failed.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Total number of files in the batch.
    pub fn total_files(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// Singular/plural form of "file", computed from the count at the point of
/// use.
fn file_noun(count: usize) -> &'static str {
    if count == 1 {
        "file"
    } else {
        "files"
    }
}

/// Folds per-item outcomes into a single [`BatchSummary`].
///
/// Never fails; empty input is a valid batch and maps to the success branch
/// with zero counts.
pub fn summarize(
    successes: Vec<BatchItemSuccess>,
    failures: Vec<BatchItemFailure>,
) -> BatchSummary {
    let success_count = successes.len();
    let failure_count = failures.len();
    let total = success_count + failure_count;

    let (status, message, suggestions) = if failure_count == 0 {
        (
            BatchStatus::Success,
            format!(
                "Successfully processed {} {}",
                success_count,
                file_noun(success_count)
            ),
            Vec::new(),
        )
    } else if success_count == 0 {
        (
            BatchStatus::Error,
            format!(
                "Failed to process {} {}",
                failure_count,
                file_noun(failure_count)
            ),
            vec![
                "Make sure every file is in a supported format (PDF or DOCX)".to_string(),
                "Check that each file is under the size limit and not corrupted".to_string(),
                "Try uploading the files again one at a time".to_string(),
            ],
        )
    } else {
        (
            BatchStatus::Warning,
            format!(
                "{} of {} {} processed successfully",
                success_count,
                total,
                file_noun(total)
            ),
            vec![
                "Review the failed files listed below".to_string(),
                "Fix any size or format issues, then retry just those files".to_string(),
            ],
        )
    };

    debug!(success_count, failure_count, status = ?status, "summarized batch");

    BatchSummary {
        status,
        message,
        suggestions,
        successful: successes,
        failed: failures,
    }
}
