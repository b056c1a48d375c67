//! # Thread-safe priority store.
//!
//! [`PriorityStore`] wraps an [`IndexedHeap`] behind a read/write lock so that
//! producers (posting) and the dispatcher (popping) can share it.
//!
//! ## Rules
//! - Every operation is a single short critical section; nothing awaits under the lock.
//! - `peek`/`len`/`contains` take the read lock, mutations take the write lock.
//! - An empty store yields `None`, never an error.

use std::hash::Hash;

use parking_lot::RwLock;

use super::heap::IndexedHeap;

/// Indexed priority queue shared between threads.
#[derive(Debug)]
pub struct PriorityStore<K, V> {
    inner: RwLock<IndexedHeap<K, V>>,
}

impl<K, V> Default for PriorityStore<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(IndexedHeap::default()),
        }
    }
}

impl<K, V> PriorityStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or re-prioritizes the element under `key`.
    ///
    /// Returns `true` if the key was not present before.
    pub fn upsert(&self, key: K, value: V, priority: i64) -> bool {
        self.inner.write().upsert(key, value, priority)
    }

    /// Inserts or re-prioritizes, adjusting the stored value on update.
    ///
    /// See [`IndexedHeap::upsert_with`]. Both closures run under the write lock.
    pub fn upsert_with(
        &self,
        key: K,
        priority: i64,
        insert: impl FnOnce() -> V,
        update: impl FnOnce(&mut V),
    ) -> bool {
        self.inner.write().upsert_with(key, priority, insert, update)
    }

    /// Removes the element under `key`, if any.
    pub fn delete(&self, key: &K) -> Option<V> {
        self.inner.write().delete(key)
    }

    /// Removes and returns the highest-priority value.
    pub fn pop(&self) -> Option<V> {
        self.inner.write().pop()
    }

    /// Removes up to `n` highest-priority values in one critical section.
    pub fn pop_n(&self, n: usize) -> Vec<V> {
        self.inner.write().pop_n(n)
    }

    /// Removes every value, in priority order, in one critical section.
    pub fn take_all(&self) -> Vec<V> {
        let mut heap = self.inner.write();
        let len = heap.len();
        heap.pop_n(len)
    }

    /// Returns a clone of the highest-priority value.
    pub fn peek(&self) -> Option<V> {
        self.inner.read().peek().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    pub fn priority_of(&self, key: &K) -> Option<i64> {
        self.inner.read().priority_of(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_upsert_is_idempotent_on_identity() {
        let store = PriorityStore::new();
        assert!(store.upsert("evt", "v1", 1));
        assert_eq!(store.len(), 1);

        assert!(!store.upsert("evt", "v2", 8));
        assert_eq!(store.len(), 1);
        assert_eq!(store.priority_of(&"evt"), Some(8));
        assert_eq!(store.peek(), Some("v1"));
    }

    #[test]
    fn test_peek_does_not_remove() {
        let store = PriorityStore::new();
        store.upsert(1u32, 'a', 1);
        store.upsert(2u32, 'b', 2);
        assert_eq!(store.peek(), Some('b'));
        assert_eq!(store.len(), 2);
        assert_eq!(store.pop(), Some('b'));
        assert_eq!(store.pop(), Some('a'));
        assert_eq!(store.pop(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_pop_n_is_bounded_by_len() {
        let store = PriorityStore::new();
        for (k, p) in [("a", 2), ("b", 9), ("c", 5)] {
            store.upsert(k, k, p);
        }
        assert_eq!(store.pop_n(2), vec!["b", "c"]);
        assert_eq!(store.pop_n(10), vec!["a"]);
        assert!(store.is_empty());

        store.upsert("x", "x", 1);
        store.upsert("y", "y", 3);
        assert_eq!(store.take_all(), vec!["y", "x"]);
        assert!(store.take_all().is_empty());
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let store: PriorityStore<&str, u8> = PriorityStore::new();
        assert_eq!(store.delete(&"missing"), None);
        store.upsert("present", 1, 0);
        assert_eq!(store.delete(&"present"), Some(1));
        assert!(!store.contains(&"present"));
    }

    #[test]
    fn test_concurrent_upserts_collapse_by_key() {
        let store = Arc::new(PriorityStore::new());
        let handles: Vec<_> = (0..8i64)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100u32 {
                        store.upsert(i, i, t);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 100);
        let mut popped = 0;
        let mut last = i64::MAX;
        while let Some(key) = store.peek() {
            let p = store.priority_of(&key).unwrap();
            assert!(p <= last);
            last = p;
            store.pop();
            popped += 1;
        }
        assert_eq!(popped, 100);
    }
}
