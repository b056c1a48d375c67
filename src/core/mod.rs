//! Runtime core: the bus and its moving parts.
//!
//! The public API from this module is [`EventBus`] (with [`EventBusBuilder`],
//! [`Delivery`]) and its [`BusConfig`].
//!
//! Internal modules:
//! - [`bus`]: post/notify/run, dispatch passes, admission, sweep, shutdown;
//! - [`registry`]: topic → subscribers, unique names;
//! - [`running`]: running set of background executions;
//! - [`runner`]: executes one subscriber call with deadline and panic isolation;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod bus;
mod config;
mod registry;
mod runner;
mod running;
mod shutdown;

pub use builder::EventBusBuilder;
pub use bus::{Delivery, EventBus};
pub use config::BusConfig;
