//! # Core subscriber trait
//!
//! `Subscriber` is the extension point for plugging work into the bus. A
//! subscriber is registered once under a topic and is executed for every event
//! dispatched on that topic.
//!
//! ## Contract
//! - [`Subscriber::name`] is a **globally unique** key; registering the same
//!   name twice (under any topic) fails with
//!   [`BusError::DuplicateSubscriber`](crate::BusError::DuplicateSubscriber).
//! - [`Subscriber::mode`] decides how [`Subscriber::execute`] is driven:
//!   - [`Mode::JustDoIt`]: awaited inline on the dispatch loop, never capped.
//!     A slow JustDoIt subscriber delays every later dispatch.
//!   - [`Mode::Background`]: spawned as its own task, counted against the
//!     background cap and tracked until the periodic sweep reaps it.
//! - [`Subscriber::result`] is read when a background execution is reaped and
//!   published with the outcome. Its meaning is up to the implementation; the
//!   default is an empty string.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use prioritybus::{Event, ExecuteError, Mode, Subscriber};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscriber for Audit {
//!     fn name(&self) -> &str { "audit" }
//!
//!     async fn execute(&self, event: &Event) -> Result<(), ExecuteError> {
//!         // write audit record for event.id ...
//!         let _ = event;
//!         Ok(())
//!     }
//!
//!     fn mode(&self) -> Mode { Mode::JustDoIt }
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{BusError, ExecuteError};
use crate::events::Event;

/// How a subscriber's execution is scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Run now, inline on the dispatch loop, regardless of load.
    JustDoIt,
    /// Run as a tracked background task, subject to the concurrency cap.
    Background,
}

impl Mode {
    /// Canonical spelling, accepted back by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::JustDoIt => "JustDoIt",
            Mode::Background => "Background",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JustDoIt" => Ok(Mode::JustDoIt),
            "Background" => Ok(Mode::Background),
            other => Err(BusError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Contract for event subscribers.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Globally unique name.
    fn name(&self) -> &str;

    /// Performs the subscriber's work for one event.
    ///
    /// Errors and panics are contained by the bus and reported through the
    /// notice feed; they never stop the dispatch loop.
    async fn execute(&self, event: &Event) -> Result<(), ExecuteError>;

    /// Result summary, queried when a background execution is reaped.
    fn result(&self) -> String {
        String::new()
    }

    /// Scheduling mode.
    fn mode(&self) -> Mode;
}

/// Shared handle to a subscriber.
pub type SubscriberRef = Arc<dyn Subscriber>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in [Mode::JustDoIt, Mode::Background] {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = "background".parse::<Mode>().unwrap_err();
        assert_eq!(
            err,
            BusError::UnknownMode {
                mode: "background".into()
            }
        );
        assert!("".parse::<Mode>().is_err());
    }
}
