//! Pending-event storage.
//!
//! ## Contents
//! - [`IndexedHeap`] single-threaded indexed binary max-heap
//! - [`PriorityStore`] the same heap behind a read/write lock
//!
//! Both support upsert, delete, peek and pop by logical key in `O(log n)`.

mod heap;
mod store;

pub use heap::IndexedHeap;
pub use store::PriorityStore;
