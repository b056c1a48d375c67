//! # Background overflow policy
//!
//! At most [`BusConfig::max_background`](crate::BusConfig::max_background)
//! background executions may be in the running set at once. When a new
//! background admission arrives while the set is full, the overflow policy
//! decides what to do.
//!
//! ## Variants
//! - `Reject`: skip that subscriber for this event and **report** it
//!   (in the returned [`Delivery`](crate::Delivery), as a `CapacityExceeded`
//!   notice and a warn log).
//! - `Wait`: hold the dispatch loop until a running execution finishes and is
//!   reaped, then admit. Nothing is dropped; later events wait behind it.
//!
//! ## Invariants
//! - The cap is never exceeded under either policy.
//! - JustDoIt subscribers are never affected by the cap.

/// Policy controlling background admissions when the running set is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Refuse the admission and report it.
    ///
    /// Use when:
    /// - Fresh events matter more than completeness
    /// - The poster watches the notice feed and re-posts on demand
    #[default]
    Reject,

    /// Block dispatching until a slot frees up.
    ///
    /// Use when:
    /// - Every event must reach its background subscribers
    /// - Backpressure on the pending queue is acceptable
    Wait,
}
