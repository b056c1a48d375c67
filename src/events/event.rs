//! # Posted events.
//!
//! An [`Event`] is the unit of work handed to [`EventBus::post`](crate::EventBus::post).
//! Its identity is `id`: posting another event with the same id is a priority
//! update of the pending one, not a duplicate.
//!
//! ## Example
//! ```rust
//! use prioritybus::Event;
//!
//! let ev = Event::new("order-42", "orders").with_priority(10);
//!
//! assert_eq!(&*ev.id, "order-42");
//! assert_eq!(&*ev.topic, "orders");
//! assert_eq!(ev.priority, 10);
//! ```

use std::sync::Arc;
use std::time::SystemTime;

/// A unit of work addressed to a topic.
///
/// Cheap to clone: `id` and `topic` are shared strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Caller-assigned unique identity.
    pub id: Arc<str>,
    /// Topic whose subscribers receive this event.
    pub topic: Arc<str>,
    /// Higher values are dispatched first.
    pub priority: i64,
    /// Wall-clock creation timestamp.
    pub posted_at: SystemTime,
}

impl Event {
    /// Creates an event with priority `0`.
    pub fn new(id: impl Into<Arc<str>>, topic: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            priority: 0,
            posted_at: SystemTime::now(),
        }
    }

    /// Sets the priority.
    #[inline]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}
