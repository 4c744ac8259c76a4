//! Error classification module for the upload pipeline
//!
//! This module maps heterogeneous, free-text failure signals from uploads and
//! document conversions onto a small closed taxonomy with stable severity and
//! retryability semantics. The taxonomy is the deliverable: the presentation
//! layer renders whatever this module decides.

pub mod classification;
pub mod rules;

// Re-export main types for convenient access
pub use classification::{
    ClassificationResult, Context, ErrorCategory, RawError, Severity,
};
pub use rules::{Classifier, ClassifierRule};
