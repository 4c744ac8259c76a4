//! Classification types for upload pipeline errors
//!
//! This module defines the closed error taxonomy and its fixed attribute
//! tables. Every category carries a severity tier, a retryability flag, and a
//! detail-visibility flag; these are data, never computed per call, so a
//! classified result can be trusted to match the taxonomy exactly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-form diagnostic context carried through classification unmodified.
pub type Context = HashMap<String, serde_json::Value>;

/// A raw failure signal as produced by the upload pipeline: a human-readable
/// message plus an optional machine code.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RawError {
    /// Human-readable error message (may be prose from any layer).
    pub message: String,
    /// Optional machine-readable code, e.g. `FILE_VALIDATION_FAILED`.
    pub code: Option<String>,
}

impl RawError {
    /// Creates a raw error from a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Creates a raw error with a machine code attached.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl From<&str> for RawError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// UI urgency tier for a classified error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; nothing went wrong in a way that needs attention.
    Info,
    /// The user can fix this themselves (bad file, missing selection).
    Warning,
    /// Something failed on the pipeline or service side.
    Error,
}

/// The closed classification taxonomy for upload pipeline failures.
///
/// Each category has fixed attributes (severity, retryability, detail
/// visibility) defined by the tables below. Adding a category means adding a
/// variant and one arm to each table; nothing is derived at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The file exceeds the maximum allowed size.
    FileTooLarge,
    /// The file format is not one the pipeline accepts.
    UnsupportedFormat,
    /// The file has no readable content or is corrupted.
    FileEmpty,
    /// No file was provided at all.
    NoFileProvided,
    /// Converting the file for processing failed.
    ConversionFailed,
    /// The upload itself failed (network, fetch, connection).
    UploadFailed,
    /// The backing service is unavailable (5xx-style failures).
    ServiceUnavailable,
    /// The caller is not authenticated or not authorized.
    AuthenticationError,
    /// Processing exceeded its time budget.
    ProcessingTimeout,
    /// Anything the rule table could not place.
    UnknownError,
}

impl ErrorCategory {
    /// Returns the fixed severity tier for this category.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::FileTooLarge
            | Self::UnsupportedFormat
            | Self::FileEmpty
            | Self::ProcessingTimeout => Severity::Warning,
            Self::NoFileProvided => Severity::Info,
            Self::ConversionFailed
            | Self::UploadFailed
            | Self::ServiceUnavailable
            | Self::AuthenticationError
            | Self::UnknownError => Severity::Error,
        }
    }

    /// Returns true if a retry affordance should be offered for this category.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConversionFailed
            | Self::UploadFailed
            | Self::ServiceUnavailable
            | Self::ProcessingTimeout
            | Self::UnknownError => true,
            Self::FileTooLarge
            | Self::UnsupportedFormat
            | Self::FileEmpty
            | Self::NoFileProvided
            | Self::AuthenticationError => false,
        }
    }

    /// Returns true if the technical details should be surfaced to the user.
    ///
    /// Only categories where the raw message genuinely helps diagnosis expose
    /// it; validation failures already say everything in the friendly message.
    pub const fn shows_technical_details(&self) -> bool {
        matches!(self, Self::ConversionFailed | Self::UnknownError)
    }

    /// Returns the user-facing message for this category.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::FileTooLarge => "This file exceeds the maximum allowed size.",
            Self::UnsupportedFormat => "This file format is not supported.",
            Self::FileEmpty => "This file is empty or could not be read.",
            Self::NoFileProvided => "No file was selected for upload.",
            Self::ConversionFailed => "The file could not be converted for processing.",
            Self::UploadFailed => "The upload could not be completed due to a connection problem.",
            Self::ServiceUnavailable => "The service is temporarily unavailable.",
            Self::AuthenticationError => "Your session has expired or you are not authorized.",
            Self::ProcessingTimeout => "Processing took longer than expected and was interrupted.",
            Self::UnknownError => "An unexpected error occurred.",
        }
    }

    /// Returns the recovery suggestions for this category.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        let suggestions: &[&str] = match self {
            Self::FileTooLarge => &[
                "Compress the file or split it into smaller documents",
                "Remove embedded images or media to reduce the size",
            ],
            Self::UnsupportedFormat => &[
                "Convert the document to PDF or DOCX and upload it again",
                "Check the file extension matches the actual content",
            ],
            Self::FileEmpty => &[
                "Open the file locally to confirm it has content",
                "Re-export or re-save the document and try again",
            ],
            Self::NoFileProvided => &["Choose a file before starting the upload"],
            Self::ConversionFailed => &[
                "Try uploading the file again",
                "Re-save the document in a supported format (PDF or DOCX)",
            ],
            Self::UploadFailed => &[
                "Check your internet connection",
                "Try the upload again in a moment",
            ],
            Self::ServiceUnavailable => &[
                "Wait a minute and try again",
                "If the problem persists, the service may be under maintenance",
            ],
            Self::AuthenticationError => &["Sign in again and retry the upload"],
            Self::ProcessingTimeout => &[
                "Try again; large documents can take several attempts",
                "Split very large documents into smaller ones",
            ],
            Self::UnknownError => &[
                "Try the operation again",
                "If it keeps failing, report the technical details below",
            ],
        };
        suggestions.iter().map(|s| (*s).to_string()).collect()
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// A fully classified error, ready for the presentation layer.
///
/// `severity`, `can_retry`, and `should_show_details` always equal the fixed
/// table values for `category`; construction goes through
/// [`ClassificationResult::from_category`] so they cannot drift per call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The assigned category.
    pub category: ErrorCategory,
    /// UI urgency tier (table value for `category`).
    pub severity: Severity,
    /// User-facing message, always non-empty.
    pub user_message: String,
    /// Actionable guidance for the user.
    pub recovery_suggestions: Vec<String>,
    /// Whether a retry affordance should be offered (table value).
    pub can_retry: bool,
    /// Whether `technical_details` should be displayed (table value).
    pub should_show_details: bool,
    /// The raw signal, preserved for diagnosis.
    pub technical_details: String,
    /// When the classification was made.
    pub timestamp: DateTime<Utc>,
    /// Free-form caller context, carried through unmodified.
    pub context: Context,
}

impl ClassificationResult {
    /// Builds a result for a category, filling every attribute from the
    /// category's fixed tables.
    pub fn from_category(category: ErrorCategory, error: &RawError, context: Context) -> Self {
        let technical_details = match &error.code {
            Some(code) => format!("{}: {}", code, error.message),
            None => error.message.clone(),
        };
        Self {
            category,
            severity: category.severity(),
            user_message: category.user_message().to_string(),
            recovery_suggestions: category.recovery_suggestions(),
            can_retry: category.is_retryable(),
            should_show_details: category.shows_technical_details(),
            technical_details,
            timestamp: Utc::now(),
            context,
        }
    }

    /// Structural equality ignoring the timestamp, for idempotence checks.
    pub fn same_classification(&self, other: &Self) -> bool {
        self.category == other.category
            && self.severity == other.severity
            && self.user_message == other.user_message
            && self.recovery_suggestions == other.recovery_suggestions
            && self.can_retry == other.can_retry
            && self.should_show_details == other.should_show_details
            && self.technical_details == other.technical_details
            && self.context == other.context
    }
}
