//! # Subscribers executed by the bus.
//!
//! This module provides the [`Subscriber`] trait, the scheduling [`Mode`] and a
//! closure-backed implementation, [`SubscriberFn`].
//!
//! ## Architecture
//! ```text
//! dispatch loop ── notify(event) ──► subscribers of event.topic (registration order)
//!                                        │
//!                                        ├──► Mode::JustDoIt   ─► execute() inline
//!                                        │
//!                                        └──► Mode::Background ─► cap check ─► tokio::spawn(execute())
//!                                                                     │             │
//!                                                                     ▼             ▼
//!                                                           CapacityExceeded   running set ─► reap ─► result()
//! ```

mod subscriber;
mod subscriber_fn;

pub use subscriber::{Mode, Subscriber, SubscriberRef};
pub use subscriber_fn::SubscriberFn;
