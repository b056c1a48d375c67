//! # Lifecycle notices emitted by the bus.
//!
//! Posting is fire-and-forget, so the poster cannot learn from `post()` what
//! happened to its event. Every step of an event's life is instead published
//! as a [`Notice`] on the [`NoticeFeed`](crate::events::NoticeFeed).
//!
//! ## Lifecycle
//! ```text
//! Posted ─► Dispatched ─┬─► NoSubscribers
//!                       ├─► Executed | ExecuteFailed              (JustDoIt)
//!                       └─► Admitted ─► Reaped                    (Background)
//!                           CapacityExceeded                      (cap reached, Reject)
//!
//! Shutdown: ShutdownRequested ─► AllReaped | GraceExceeded
//! ```
//!
//! ## Ordering guarantees
//! Each notice carries a globally unique, monotonically increasing `seq`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use super::event::Event;

/// Global sequence counter for notice ordering.
static NOTICE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    // === Event flow ===
    /// Event entered (or was re-prioritized in) the pending queue.
    ///
    /// Sets: `event_id`, `topic`, `priority`
    Posted,

    /// Event was popped by a dispatch pass.
    ///
    /// Sets: `event_id`, `topic`, `priority`
    Dispatched,

    /// No subscriber is registered on the event's topic; the event was consumed.
    ///
    /// Sets: `event_id`, `topic`, `priority`
    NoSubscribers,

    // === JustDoIt ===
    /// Inline execution finished successfully.
    ///
    /// Sets: event fields, `subscriber`, `elapsed_ms`
    Executed,

    /// Inline execution failed or panicked.
    ///
    /// Sets: event fields, `subscriber`, `outcome`, `reason`, `elapsed_ms`
    ExecuteFailed,

    // === Background ===
    /// Background execution was admitted into the running set.
    ///
    /// Sets: event fields, `subscriber`
    Admitted,

    /// Background admission refused because the running set is full.
    ///
    /// Sets: event fields, `subscriber`, `reason`
    CapacityExceeded,

    /// Background execution finished and was removed from the running set.
    ///
    /// Sets: event fields, `subscriber`, `outcome`, `reason` (on failure),
    /// `result` (the subscriber's `result()`), `elapsed_ms`
    Reaped,

    // === Shutdown ===
    /// Dispatch loop was asked to stop.
    ShutdownRequested,

    /// All background work finished within the grace period.
    AllReaped,

    /// Grace period exceeded; remaining background work was aborted.
    ///
    /// Sets: `reason` (stuck entries)
    GraceExceeded,
}

/// Lifecycle notice with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`NoticeKind`]
#[derive(Clone, Debug)]
pub struct Notice {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notice classification.
    pub kind: NoticeKind,

    /// Id of the event concerned.
    pub event_id: Option<Arc<str>>,
    /// Topic of the event concerned.
    pub topic: Option<Arc<str>>,
    /// Priority of the event concerned.
    pub priority: Option<i64>,
    /// Subscriber concerned.
    pub subscriber: Option<Arc<str>>,
    /// Outcome label: `"completed"` or an [`ExecuteError`](crate::ExecuteError) label.
    pub outcome: Option<&'static str>,
    /// Human-readable reason (errors, capacity details, ...).
    pub reason: Option<Arc<str>>,
    /// Value of `Subscriber::result()` at reap time.
    pub result: Option<Arc<str>>,
    /// Execution time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Notice {
    /// Creates a notice of the given kind with current timestamp and next sequence number.
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            seq: NOTICE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            event_id: None,
            topic: None,
            priority: None,
            subscriber: None,
            outcome: None,
            reason: None,
            result: None,
            elapsed_ms: None,
        }
    }

    /// Creates a notice describing `event`.
    pub fn for_event(kind: NoticeKind, event: &Event) -> Self {
        let mut n = Self::new(kind);
        n.event_id = Some(Arc::clone(&event.id));
        n.topic = Some(Arc::clone(&event.topic));
        n.priority = Some(event.priority);
        n
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    #[inline]
    pub fn with_outcome(mut self, label: &'static str) -> Self {
        self.outcome = Some(label);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_result(mut self, result: impl Into<Arc<str>>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Attaches an execution time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// True for kinds that report a subscriber failure.
    #[inline]
    pub fn is_failure(&self) -> bool {
        match self.kind {
            NoticeKind::ExecuteFailed => true,
            NoticeKind::Reaped => self.outcome.is_some_and(|o| o != "completed"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Notice::new(NoticeKind::Posted);
        let b = Notice::new(NoticeKind::Posted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_for_event_copies_identity() {
        let ev = Event::new("e1", "orders").with_priority(3);
        let n = Notice::for_event(NoticeKind::Admitted, &ev)
            .with_subscriber("mailer")
            .with_elapsed(Duration::from_millis(1500));

        assert_eq!(n.event_id.as_deref(), Some("e1"));
        assert_eq!(n.topic.as_deref(), Some("orders"));
        assert_eq!(n.priority, Some(3));
        assert_eq!(n.subscriber.as_deref(), Some("mailer"));
        assert_eq!(n.elapsed_ms, Some(1500));
    }

    #[test]
    fn test_failure_classification() {
        let ok = Notice::new(NoticeKind::Reaped).with_outcome("completed");
        let bad = Notice::new(NoticeKind::Reaped).with_outcome("execute_timeout");
        assert!(!ok.is_failure());
        assert!(bad.is_failure());
        assert!(Notice::new(NoticeKind::ExecuteFailed).is_failure());
    }
}
