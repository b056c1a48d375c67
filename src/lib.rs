//! # prioritybus
//!
//! **prioritybus** is an in-process publish/subscribe scheduler for Rust.
//!
//! Events are posted with an id, a topic and an integer priority. A single
//! dispatch loop drains them in priority order and fans each one out to the
//! subscribers registered on its topic. Subscribers either run inline on the
//! loop ([`Mode::JustDoIt`]) or as capped, tracked background work
//! ([`Mode::Background`]) that is reaped by a periodic sweep.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   post(Event{id, topic, priority})
//!            │  upsert by id (re-post = priority update)
//!            ▼
//! ┌──────────────────────────────┐      wake (single stored permit)
//! │ PriorityStore<id, Event>     │─────────────────────────┐
//! │ (IndexedHeap, RwLock)        │                         │
//! └──────────────┬───────────────┘                         ▼
//!                │ take all pending (one lock)  ┌────────────────────┐
//!                └─────────────────────────────►│   dispatch loop    │◄── tick: sweep()
//!                                               │   EventBus::run    │◄── token: shutdown
//!                                               └─────────┬──────────┘
//!                                                         │ notify(event)
//!                               Registry: topic → [sub1, sub2, ...] (registration order)
//!                                   ┌─────────────────────┴─────────────────────┐
//!                                   ▼                                           ▼
//!                          Mode::JustDoIt                              Mode::Background
//!                          run inline, never capped                    RunningSet (cap, FIFO)
//!                                                                      tokio::spawn per entry
//!                                                                      ├─ full → OverflowPolicy
//!                                                                      └─ finished → reaped on sweep
//!
//! Every lifecycle step is published as a Notice on the NoticeFeed (broadcast).
//! ```
//!
//! ### Lifecycle
//! ```text
//! Background: Pending ──► Dispatched ──► Admitted ──► Running ──► Reaped
//!                                    └─► CapacityExceeded (Reject policy)
//! JustDoIt:   Pending ──► Dispatched ──► Executed | ExecuteFailed
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                         |
//! |-------------------|-----------------------------------------------------------------|--------------------------------------------|
//! | **Bus**           | Post, dispatch, cap background work, sweep, graceful shutdown.   | [`EventBus`], [`EventBusBuilder`], [`Delivery`] |
//! | **Subscribers**   | Inline or background handlers, function-backed adapter.         | [`Subscriber`], [`SubscriberFn`], [`Mode`] |
//! | **Queue**         | Indexed max-heap with upsert/delete by key.                     | [`IndexedHeap`], [`PriorityStore`]         |
//! | **Notices**       | Lifecycle records for observers and tests.                      | [`Notice`], [`NoticeKind`]                 |
//! | **Policies**      | Behaviour when the background cap is reached.                   | [`OverflowPolicy`]                         |
//! | **Errors**        | Typed errors for wiring, executions and the loop.               | [`BusError`], [`ExecuteError`], [`RuntimeError`] |
//! | **Configuration** | Centralized runtime settings.                                   | [`BusConfig`]                              |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use prioritybus::{BusConfig, Event, EventBus, ExecuteError, Mode, NoticeKind, SubscriberFn};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = BusConfig::default();
//!     cfg.max_background = 2;
//!
//!     let bus = EventBus::builder(cfg)
//!         .with_subscriber(
//!             "orders",
//!             SubscriberFn::arc("audit", Mode::JustDoIt, |ev: Event| async move {
//!                 println!("audit {} (priority {})", ev.id, ev.priority);
//!                 Ok::<_, ExecuteError>(())
//!             }),
//!         )
//!         .with_subscriber(
//!             "orders",
//!             SubscriberFn::arc("mailer", Mode::Background, |_ev: Event| async move {
//!                 tokio::time::sleep(Duration::from_millis(10)).await;
//!                 Ok::<_, ExecuteError>(())
//!             }),
//!         )
//!         .build()?;
//!
//!     let mut notices = bus.notices();
//!     let token = CancellationToken::new();
//!     let driver = bus.spawn(token.clone());
//!
//!     bus.post(Event::new("42", "orders").with_priority(10));
//!
//!     // Wait until the inline subscriber has run.
//!     while notices.recv().await?.kind != NoticeKind::Executed {}
//!
//!     // Cancelling waits for background work within the grace period.
//!     token.cancel();
//!     driver.await??;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod queue;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{BusConfig, Delivery, EventBus, EventBusBuilder};
pub use error::{BusError, ExecuteError, RuntimeError};
pub use events::{Event, Notice, NoticeFeed, NoticeKind};
pub use policies::OverflowPolicy;
pub use queue::{IndexedHeap, PriorityStore};
pub use subscribers::{Mode, Subscriber, SubscriberFn, SubscriberRef};
