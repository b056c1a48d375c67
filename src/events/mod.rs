//! Events and lifecycle notices.
//!
//! This module groups the **data model** of posted work and the **feed** used
//! to observe what the bus did with it.
//!
//! ## Contents
//! - [`Event`] the unit of work posted to the bus (id, topic, priority)
//! - [`NoticeKind`], [`Notice`] lifecycle classification and metadata
//! - [`NoticeFeed`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `EventBus::post`, the dispatch loop, the periodic sweep.
//! - **Consumers**: anything holding `EventBus::notices()`.

mod event;
mod feed;
mod notice;

pub use event::Event;
pub use feed::NoticeFeed;
pub use notice::{Notice, NoticeKind};
