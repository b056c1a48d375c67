//! # Function-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps a closure `F: Fn(Event) -> Fut`, producing a fresh
//! future per execution. Each call owns its event clone, so no state is shared
//! between executions unless the closure captures an `Arc<...>` explicitly.
//!
//! [`Subscriber::result`] reports the last execution: `""` before any, `"ok"`
//! after a success, the error message after a failure, or `"interrupted"` when
//! the closure never returned (timed out, panicked or still running).
//!
//! ## Example
//! ```rust
//! use prioritybus::{Event, ExecuteError, Mode, Subscriber, SubscriberFn, SubscriberRef};
//!
//! let s: SubscriberRef = SubscriberFn::arc("printer", Mode::JustDoIt, |ev: Event| async move {
//!     println!("got {}", ev.id);
//!     Ok::<_, ExecuteError>(())
//! });
//!
//! assert_eq!(s.name(), "printer");
//! assert_eq!(s.mode(), Mode::JustDoIt);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ExecuteError;
use crate::events::Event;
use crate::subscribers::subscriber::{Mode, Subscriber};

/// `result()` of an execution whose closure has not returned.
const INTERRUPTED: &str = "interrupted";

/// Function-backed subscriber implementation.
pub struct SubscriberFn<F> {
    name: Cow<'static, str>,
    mode: Mode,
    f: F,
    last: Mutex<String>,
}

impl<F> SubscriberFn<F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately need a
    /// [`SubscriberRef`](crate::SubscriberRef).
    pub fn new(name: impl Into<Cow<'static, str>>, mode: Mode, f: F) -> Self {
        Self {
            name: name.into(),
            mode,
            f,
            last: Mutex::new(String::new()),
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, mode: Mode, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, mode, f))
    }
}

#[async_trait]
impl<F, Fut> Subscriber for SubscriberFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ExecuteError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, event: &Event) -> Result<(), ExecuteError> {
        *self.last.lock() = INTERRUPTED.to_string();
        let res = (self.f)(event.clone()).await;
        *self.last.lock() = match &res {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        res
    }

    fn result(&self) -> String {
        self.last.lock().clone()
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_result_tracks_last_execution() {
        let s = SubscriberFn::new("flaky", Mode::Background, |ev: Event| async move {
            if ev.priority < 0 {
                Err(ExecuteError::fail("negative"))
            } else {
                Ok(())
            }
        });
        assert_eq!(s.result(), "");

        s.execute(&Event::new("a", "t")).await.unwrap();
        assert_eq!(s.result(), "ok");

        let err = s
            .execute(&Event::new("b", "t").with_priority(-1))
            .await
            .unwrap_err();
        assert_eq!(err, ExecuteError::fail("negative"));
        assert_eq!(s.result(), "execution failed: negative");
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_marks_cancelled_execution() {
        let s = SubscriberFn::new("slow", Mode::Background, |ev: Event| async move {
            if ev.priority > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            }
            Ok::<_, ExecuteError>(())
        });
        s.execute(&Event::new("a", "t")).await.unwrap();
        assert_eq!(s.result(), "ok");

        let ev = Event::new("b", "t").with_priority(1);
        let res = tokio::time::timeout(std::time::Duration::from_millis(10), s.execute(&ev)).await;
        assert!(res.is_err());
        assert_eq!(s.result(), "interrupted");
    }
}
