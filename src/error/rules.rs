//! Ordered rule table for classifying raw upload errors
//!
//! Rules are pure data: a compiled case-insensitive pattern bound to a
//! category. Evaluation is first-match-wins over an ordered list, so the
//! table can be unit-tested rule by rule and extended without touching the
//! control flow. Classification never fails; anything unmatched resolves to
//! [`ErrorCategory::UnknownError`].

use regex::Regex;
use tracing::debug;

use super::classification::{ClassificationResult, Context, ErrorCategory, RawError};

/// Machine codes recognized ahead of any message matching.
pub mod codes {
    /// Emitted by the client-side validation layer.
    pub const FILE_VALIDATION_FAILED: &str = "FILE_VALIDATION_FAILED";
    /// Emitted by the document conversion layer.
    pub const CONVERSION_FAILED: &str = "CONVERSION_FAILED";
}

/// A single classification rule: a pattern and the category it selects.
#[derive(Debug)]
pub struct ClassifierRule {
    regex: Regex,
    category: ErrorCategory,
    description: String,
}

impl ClassifierRule {
    /// Creates a new rule.
    ///
    /// # Panics
    /// Panics if the regex pattern is invalid. Rules are built from the
    /// static tables below, so this only fires on a programming error.
    pub fn new(pattern: &str, category: ErrorCategory, description: impl Into<String>) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid classifier rule pattern"),
            category,
            description: description.into(),
        }
    }

    /// Returns the category this rule selects.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Returns a human-readable description of what this rule detects.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks whether this rule matches the given message.
    pub fn matches(&self, message: &str) -> bool {
        self.regex.is_match(message)
    }
}

/// Deterministic classifier mapping raw errors onto the closed taxonomy.
///
/// The rule order is load-bearing: validation routing runs before the
/// network/service/auth/timeout rules so that a validation message which
/// coincidentally contains a token like "server" cannot be misclassified.
#[derive(Debug)]
pub struct Classifier {
    /// Matches messages that belong to the validation sub-table.
    validation_trigger: Regex,
    /// Sub-table consulted only for validation-flagged errors.
    validation_rules: Vec<ClassifierRule>,
    /// Main ordered table, consulted after validation routing.
    rules: Vec<ClassifierRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Creates a classifier with the standard rule tables.
    pub fn new() -> Self {
        Self {
            validation_trigger: Regex::new(r"(?i)validation")
                .expect("invalid validation trigger pattern"),
            validation_rules: Self::validation_rules(),
            rules: Self::main_rules(),
        }
    }

    fn validation_rules() -> Vec<ClassifierRule> {
        vec![
            ClassifierRule::new(
                r"(?i)size|exceeds",
                ErrorCategory::FileTooLarge,
                "file size over limit",
            ),
            ClassifierRule::new(
                r"(?i)format|supported",
                ErrorCategory::UnsupportedFormat,
                "unsupported file format",
            ),
            ClassifierRule::new(
                r"(?i)empty|corrupted",
                ErrorCategory::FileEmpty,
                "empty or corrupted file",
            ),
            ClassifierRule::new(
                r"(?i)no file|not provided",
                ErrorCategory::NoFileProvided,
                "no file selected",
            ),
        ]
    }

    fn main_rules() -> Vec<ClassifierRule> {
        vec![
            ClassifierRule::new(
                r"(?i)conversion|filereader",
                ErrorCategory::ConversionFailed,
                "document conversion failure",
            ),
            ClassifierRule::new(
                r"(?i)network|fetch|connection",
                ErrorCategory::UploadFailed,
                "network-level upload failure",
            ),
            ClassifierRule::new(
                r"(?i)service|server|503|502",
                ErrorCategory::ServiceUnavailable,
                "backend service unavailable",
            ),
            ClassifierRule::new(
                r"(?i)auth|unauthorized|401",
                ErrorCategory::AuthenticationError,
                "authentication or authorization failure",
            ),
            ClassifierRule::new(
                r"(?i)timeout|time out",
                ErrorCategory::ProcessingTimeout,
                "processing timeout",
            ),
        ]
    }

    /// Returns the main rule table, in evaluation order.
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// Classifies a raw error into a [`ClassificationResult`].
    ///
    /// Never fails: unmatched input degrades to `UnknownError`. Deterministic
    /// and side-effect free apart from a debug-level trace event.
    pub fn classify(&self, error: &RawError, context: Option<Context>) -> ClassificationResult {
        let category = self.categorize(error);
        debug!(
            category = ?category,
            code = error.code.as_deref().unwrap_or(""),
            "classified upload error"
        );
        ClassificationResult::from_category(category, error, context.unwrap_or_default())
    }

    /// Resolves the category for a raw error via the ordered tables.
    fn categorize(&self, error: &RawError) -> ErrorCategory {
        // Validation routing first: these messages may contain tokens that
        // would otherwise hit the network/service rules.
        if error.code.as_deref() == Some(codes::FILE_VALIDATION_FAILED)
            || self.validation_trigger.is_match(&error.message)
        {
            for rule in &self.validation_rules {
                if rule.matches(&error.message) {
                    return rule.category();
                }
            }
            // Validation-flagged but unrecognized: do not fall through to the
            // main table, where a stray token could reclassify it.
            return ErrorCategory::UnknownError;
        }

        if error.code.as_deref() == Some(codes::CONVERSION_FAILED) {
            return ErrorCategory::ConversionFailed;
        }

        for rule in &self.rules {
            if rule.matches(&error.message) {
                return rule.category();
            }
        }

        ErrorCategory::UnknownError
    }
}
