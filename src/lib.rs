//! Uploadtriage - resilience core for document upload pipelines
//!
//! This library provides the three building blocks an upload front end needs
//! to turn raw failures into actionable outcomes: a deterministic error
//! classifier, a bounded retry executor with exponential backoff, and a
//! batch result aggregator. Rendering (toasts, panels, tooltips) lives in the
//! consuming application; this crate only produces the structured data those
//! surfaces display.

pub mod batch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod notification;
pub mod retry;
pub mod timeout;
