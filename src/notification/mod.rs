//! Progress notifications for the presentation layer
//!
//! The retry executor reports progress through sink traits; this module
//! provides a ready-made sink that turns those events into displayable
//! notifications, keeping the executor free of any UI knowledge. The
//! presentation layer renders [`Notification::text`] however it likes.

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::FeedbackSink;

/// A notification about retry progress or its terminal outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A failed attempt is being retried after a backoff delay.
    Retrying {
        /// The 1-based retry ordinal.
        attempt: u32,
        /// Total attempt budget.
        max_attempts: u32,
        /// Delay before the next attempt.
        delay: Duration,
        /// Why the retry is happening.
        reason: String,
    },
    /// The operation succeeded.
    Succeeded {
        /// Number of attempts that were made.
        attempts: u32,
    },
    /// The attempt budget was exhausted.
    Exhausted {
        /// Number of attempts that were made.
        attempts: u32,
        /// The final error message.
        reason: String,
    },
}

impl Notification {
    /// Creates a Retrying notification.
    pub fn retrying(
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        reason: impl Into<String>,
    ) -> Self {
        Self::Retrying {
            attempt,
            max_attempts,
            delay,
            reason: reason.into(),
        }
    }

    /// Creates a Succeeded notification.
    pub fn succeeded(attempts: u32) -> Self {
        Self::Succeeded { attempts }
    }

    /// Creates an Exhausted notification.
    pub fn exhausted(attempts: u32, reason: impl Into<String>) -> Self {
        Self::Exhausted {
            attempts,
            reason: reason.into(),
        }
    }

    /// Formats a delay as a compact countdown, e.g. "2s" or "1m 30s".
    fn countdown(delay: Duration) -> String {
        let secs = delay.as_secs();
        let mins = secs / 60;
        if mins > 0 {
            format!("{}m {}s", mins, secs % 60)
        } else if secs > 0 {
            format!("{}s", secs)
        } else {
            format!("{}ms", delay.as_millis())
        }
    }

    /// Returns the plain-text progress line for this notification.
    pub fn text(&self) -> String {
        match self {
            Self::Retrying {
                attempt,
                max_attempts,
                delay,
                reason,
            } => format!(
                "Retrying (attempt {} of {}) in {}: {}",
                attempt,
                max_attempts,
                Self::countdown(*delay),
                reason
            ),
            Self::Succeeded { attempts } => {
                if *attempts == 1 {
                    "Completed on the first attempt".to_string()
                } else {
                    format!("Completed after {} attempts", attempts)
                }
            }
            Self::Exhausted { attempts, reason } => {
                format!("Gave up after {} attempts: {}", attempts, reason)
            }
        }
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Feedback sink that records every progress event as a [`Notification`].
///
/// Hand a `NotificationLog` to [`crate::retry::RetryPolicy::run_with_feedback`]
/// and drain it afterwards (or between polls) to drive progress text.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded notifications, in order.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Returns the most recent notification, if any.
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    /// Removes and returns all recorded notifications.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }
}

impl<E: Display> FeedbackSink<E> for NotificationLog {
    fn on_retry(&mut self, attempt: u32, max_attempts: u32, delay: Duration, error: &E) {
        self.entries.push(Notification::retrying(
            attempt,
            max_attempts,
            delay,
            error.to_string(),
        ));
    }

    fn on_success(&mut self, attempts: u32) {
        self.entries.push(Notification::succeeded(attempts));
    }

    fn on_exhausted(&mut self, attempts: u32, error: &E) {
        self.entries
            .push(Notification::exhausted(attempts, error.to_string()));
    }
}
