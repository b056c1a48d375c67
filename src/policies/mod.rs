//! Scheduling policies.
//!
//! ## Contents
//! - [`OverflowPolicy`] what happens to a background admission when the cap is reached
//!
//! ## Defaults
//! - `OverflowPolicy::Reject` (explicit, reported drop).

mod overflow;

pub use overflow::OverflowPolicy;
