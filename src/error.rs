//! Error types used by the bus and by subscriber executions.
//!
//! This module defines three enums:
//!
//! - [`BusError`]: registration/configuration errors, surfaced synchronously.
//! - [`ExecuteError`]: failures of a single subscriber execution.
//! - [`RuntimeError`]: errors raised by the dispatch loop itself.
//!
//! All of them provide `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` (human-readable details).

use std::time::Duration;
use thiserror::Error;

/// # Errors returned while wiring the bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A subscriber with this name is already registered (under any topic).
    #[error("subscriber already registered: {name}")]
    DuplicateSubscriber {
        /// The conflicting subscriber name.
        name: String,
    },

    /// A mode string did not match any known [`Mode`](crate::Mode).
    #[error("unknown subscriber mode: {mode:?}")]
    UnknownMode {
        /// The rejected input.
        mode: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use prioritybus::BusError;
    ///
    /// let err = BusError::DuplicateSubscriber { name: "mailer".into() };
    /// assert_eq!(err.as_label(), "bus_duplicate_subscriber");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::DuplicateSubscriber { .. } => "bus_duplicate_subscriber",
            BusError::UnknownMode { .. } => "bus_unknown_mode",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::DuplicateSubscriber { name } => format!("duplicate subscriber: {name}"),
            BusError::UnknownMode { mode } => format!("unknown mode: {mode}"),
        }
    }
}

/// # Errors produced by a subscriber execution.
///
/// Returned by [`Subscriber::execute`](crate::Subscriber::execute) or synthesized
/// by the runtime (timeouts, panics). They never propagate into the dispatch loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    /// The subscriber reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The execution exceeded its deadline and was cancelled.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The execution panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl ExecuteError {
    /// Convenience constructor for [`ExecuteError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ExecuteError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use prioritybus::ExecuteError;
    /// use std::time::Duration;
    ///
    /// let err = ExecuteError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "execute_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecuteError::Fail { .. } => "execute_failed",
            ExecuteError::Timeout { .. } => "execute_timeout",
            ExecuteError::Panicked { .. } => "execute_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ExecuteError::Fail { error } => format!("error: {error}"),
            ExecuteError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ExecuteError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by the dispatch loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; remaining background work was aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; aborting")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Subscribers (as `subscriber@event`) still running when grace expired.
        stuck: Vec<String>,
    },

    /// `run` was called while another dispatch loop is active on the same bus.
    #[error("dispatch loop already running")]
    AlreadyRunning,

    /// Installing the OS signal handlers failed.
    #[error("signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::AlreadyRunning => "runtime_already_running",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck={stuck:?}")
            }
            RuntimeError::AlreadyRunning => "dispatch loop already running".to_string(),
            RuntimeError::Signal(e) => format!("signal: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            BusError::UnknownMode { mode: "x".into() }.as_label(),
            "bus_unknown_mode"
        );
        assert_eq!(ExecuteError::fail("boom").as_label(), "execute_failed");
        assert_eq!(
            ExecuteError::Panicked { info: "p".into() }.as_label(),
            "execute_panicked"
        );
        assert_eq!(RuntimeError::AlreadyRunning.as_label(), "runtime_already_running");
    }

    #[test]
    fn test_display_includes_details() {
        let err = BusError::DuplicateSubscriber {
            name: "audit".into(),
        };
        assert_eq!(err.to_string(), "subscriber already registered: audit");
        assert_eq!(ExecuteError::fail("boom").to_string(), "execution failed: boom");

        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(1),
            stuck: vec!["slow@e1".into()],
        };
        assert!(err.as_message().contains("slow@e1"));
    }
}
