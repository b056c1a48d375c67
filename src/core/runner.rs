//! # Run a single subscriber execution.
//!
//! Executes [`Subscriber::execute`] once for one event with an optional
//! deadline, converting panics into [`ExecuteError::Panicked`].
//!
//! ## Outcomes
//! ```text
//! execute() → Ok(())          → Ok(())
//! execute() → Err(e)          → Err(e)
//! deadline exceeded           → future dropped → Err(Timeout)
//! execute() panics            → caught          → Err(Panicked)
//! ```
//!
//! ## Rules
//! - Never panics and never propagates a subscriber panic to the caller.
//! - On timeout the execution future is dropped (cooperative cancellation at its next `.await`).
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding a lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::error::ExecuteError;
use crate::events::Event;
use crate::subscribers::Subscriber;

/// Executes `subscriber` for `event`, bounded by `deadline` if set.
pub async fn run_once<S: Subscriber + ?Sized>(
    subscriber: &S,
    event: &Event,
    deadline: Option<Duration>,
) -> Result<(), ExecuteError> {
    let fut = AssertUnwindSafe(subscriber.execute(event)).catch_unwind();

    let caught = match deadline.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, fut).await {
            Ok(r) => r,
            Err(_elapsed) => return Err(ExecuteError::Timeout { timeout: dur }),
        },
        None => fut.await,
    };

    match caught {
        Ok(res) => res,
        Err(panic_err) => Err(ExecuteError::Panicked {
            info: panic_message(&*panic_err),
        }),
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
