//! # Indexed binary max-heap.
//!
//! [`IndexedHeap`] is a priority queue whose elements are addressed by a logical
//! key. Besides the usual push/pop it can change the priority of, or remove, an
//! arbitrary element in `O(log n)`.
//!
//! ## Layout
//! ```text
//! queue:  [ k3 | k1 | k7 | k2 | ... ]        (keys, heap-ordered)
//!            │    │
//! lookup: k3 ─► Node { value, priority, seq, index: 0 }
//!         k1 ─► Node { value, priority, seq, index: 1 }
//! ```
//!
//! ## Invariants
//! - For every position `i` with children `2i+1`, `2i+2`, the node at `i`
//!   outranks (or ties) its children.
//! - `lookup[queue[i]].index == i` for every `i`: every swap updates both sides.
//!
//! ## Ordering
//! A node outranks another when its priority is numerically higher. Equal
//! priorities are ordered by insertion sequence (first inserted, first out).
//! Updating the priority of an existing key keeps its original sequence.

use std::collections::HashMap;
use std::hash::Hash;

/// Heap entry stored in the lookup table.
#[derive(Debug)]
struct Node<V> {
    value: V,
    priority: i64,
    /// Insertion sequence, used as tie-break among equal priorities.
    seq: u64,
    /// Current position in `queue`.
    index: usize,
}

/// Binary max-heap keyed by `K`, holding values `V`.
#[derive(Debug)]
pub struct IndexedHeap<K, V> {
    lookup: HashMap<K, Node<V>>,
    queue: Vec<K>,
    next_seq: u64,
}

impl<K, V> Default for IndexedHeap<K, V> {
    fn default() -> Self {
        Self {
            lookup: HashMap::new(),
            queue: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K, V> IndexedHeap<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.lookup.contains_key(key)
    }

    /// Returns the current priority of `key`, if present.
    pub fn priority_of(&self, key: &K) -> Option<i64> {
        self.lookup.get(key).map(|n| n.priority)
    }

    /// Inserts `value` under `key`, or re-prioritizes the existing element.
    ///
    /// On an existing key only the priority changes: the stored value is kept
    /// and `value` is dropped. The node is then moved up or down to restore
    /// heap order.
    ///
    /// Returns `true` if a new element was inserted.
    pub fn upsert(&mut self, key: K, value: V, priority: i64) -> bool {
        self.upsert_with(key, priority, || value, |_| {})
    }

    /// Like [`upsert`](Self::upsert), but builds the value lazily and lets the
    /// caller adjust the stored value when the key already exists.
    ///
    /// `update` runs before the node is repositioned and must not depend on
    /// heap order.
    pub fn upsert_with(
        &mut self,
        key: K,
        priority: i64,
        insert: impl FnOnce() -> V,
        update: impl FnOnce(&mut V),
    ) -> bool {
        if let Some(node) = self.lookup.get_mut(&key) {
            node.priority = priority;
            update(&mut node.value);
            let index = node.index;
            self.fix(index);
            return false;
        }

        let index = self.queue.len();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.lookup.insert(
            key.clone(),
            Node {
                value: insert(),
                priority,
                seq,
                index,
            },
        );
        self.queue.push(key);
        self.sift_up(index);
        true
    }

    /// Removes the element stored under `key`. Absent keys are a no-op.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let index = self.lookup.get(key)?.index;
        self.remove_at(index).map(|(_, v)| v)
    }

    /// Removes and returns the highest-ranked value.
    pub fn pop(&mut self) -> Option<V> {
        self.pop_entry().map(|(_, v)| v)
    }

    /// Removes and returns the highest-ranked `(key, value)` pair.
    pub fn pop_entry(&mut self) -> Option<(K, V)> {
        if self.queue.is_empty() {
            return None;
        }
        self.remove_at(0)
    }

    /// Removes up to `n` highest-ranked values, in rank order.
    pub fn pop_n(&mut self, n: usize) -> Vec<V> {
        let mut out = Vec::with_capacity(n.min(self.len()));
        while out.len() < n {
            match self.pop() {
                Some(v) => out.push(v),
                None => break,
            }
        }
        out
    }

    /// Returns the highest-ranked value without removing it.
    pub fn peek(&self) -> Option<&V> {
        let key = self.queue.first()?;
        self.lookup.get(key).map(|n| &n.value)
    }

    /// Removes the node at `index`: swap with the tail, shrink, repair.
    fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        let last = self.queue.len().checked_sub(1)?;
        if index != last {
            self.swap(index, last);
        }

        let key = self.queue.pop()?;
        let node = self.lookup.remove(&key)?;
        if index < self.queue.len() {
            self.fix(index);
        }
        Some((key, node.value))
    }

    /// Restores heap order for a node whose rank changed.
    fn fix(&mut self, index: usize) {
        if !self.sift_up(index) {
            self.sift_down(index);
        }
    }

    /// Moves the node at `index` towards the root. Returns true if it moved.
    fn sift_up(&mut self, mut index: usize) -> bool {
        let start = index;
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.outranks(index, parent) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index != start
    }

    /// Moves the node at `index` towards the leaves.
    fn sift_down(&mut self, mut index: usize) {
        let len = self.queue.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < len && self.outranks(right, left) {
                best = right;
            }
            if !self.outranks(best, index) {
                break;
            }
            self.swap(index, best);
            index = best;
        }
    }

    /// True if the node at position `i` must sit above the node at `j`.
    fn outranks(&self, i: usize, j: usize) -> bool {
        let a = &self.lookup[&self.queue[i]];
        let b = &self.lookup[&self.queue[j]];
        a.priority > b.priority || (a.priority == b.priority && a.seq < b.seq)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.queue.swap(i, j);
        for index in [i, j] {
            if let Some(node) = self.lookup.get_mut(&self.queue[index]) {
                node.index = index;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent<V>(heap: &IndexedHeap<String, V>) {
        assert_eq!(heap.lookup.len(), heap.queue.len());
        for (i, key) in heap.queue.iter().enumerate() {
            assert_eq!(heap.lookup[key].index, i, "index drift for {key}");
            for child in [2 * i + 1, 2 * i + 2] {
                if child < heap.queue.len() {
                    assert!(
                        !heap.outranks(child, i),
                        "child {child} outranks parent {i}"
                    );
                }
            }
        }
    }

    fn drain(heap: &mut IndexedHeap<String, i64>) -> Vec<i64> {
        std::iter::from_fn(|| heap.pop()).collect()
    }

    #[test]
    fn test_pop_in_priority_order() {
        let mut heap = IndexedHeap::new();
        for (i, p) in [5, 1, 9, 3].into_iter().enumerate() {
            heap.upsert(i.to_string(), p, p);
        }
        assert_consistent(&heap);
        assert_eq!(drain(&mut heap), vec![9, 5, 3, 1]);
        assert!(heap.pop().is_none());
    }

    #[test]
    fn test_empty_peek_and_pop() {
        let mut heap: IndexedHeap<String, i64> = IndexedHeap::new();
        assert!(heap.peek().is_none());
        assert!(heap.pop().is_none());
        assert!(heap.delete(&"nope".to_string()).is_none());
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn test_upsert_same_key_updates_priority_only() {
        let mut heap = IndexedHeap::new();
        assert!(heap.upsert("a".to_string(), "first", 1));
        assert!(heap.upsert("b".to_string(), "b", 5));
        assert!(!heap.upsert("a".to_string(), "second", 10));

        assert_eq!(heap.len(), 2);
        assert_eq!(heap.priority_of(&"a".to_string()), Some(10));
        assert_eq!(heap.peek(), Some(&"first"));
        assert_consistent(&heap);

        assert!(!heap.upsert("a".to_string(), "third", -1));
        assert_eq!(heap.peek(), Some(&"b"));
        assert_consistent(&heap);
    }

    #[test]
    fn test_upsert_with_adjusts_stored_value() {
        let mut heap: IndexedHeap<String, (char, i64)> = IndexedHeap::new();
        heap.upsert_with("k".to_string(), 1, || ('x', 1), |_| unreachable!());
        let inserted = heap.upsert_with(
            "k".to_string(),
            7,
            || unreachable!(),
            |v| v.1 = 7,
        );
        assert!(!inserted);
        assert_eq!(heap.pop(), Some(('x', 7)));
    }

    #[test]
    fn test_pop_n_takes_a_ranked_batch() {
        let mut heap = IndexedHeap::new();
        for p in [4i64, 8, 1, 6] {
            heap.upsert(format!("k{p}"), p, p);
        }
        assert_eq!(heap.pop_n(3), vec![8, 6, 4]);
        assert_eq!(heap.pop_n(5), vec![1]);
        assert!(heap.pop_n(2).is_empty());
    }

    #[test]
    fn test_equal_priorities_are_fifo() {
        let mut heap = IndexedHeap::new();
        for i in 0..20i64 {
            heap.upsert(format!("k{i}"), i, 7);
        }
        assert_eq!(drain(&mut heap), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_update_keeps_original_sequence() {
        let mut heap = IndexedHeap::new();
        heap.upsert("first".to_string(), 1, 1);
        heap.upsert("second".to_string(), 2, 3);
        heap.upsert("first".to_string(), 1, 3);
        assert_eq!(drain(&mut heap), vec![1, 2]);
    }

    #[test]
    fn test_delete_arbitrary_keys() {
        let mut heap = IndexedHeap::new();
        for p in 0..10i64 {
            heap.upsert(format!("k{p}"), p, p);
        }
        assert_eq!(heap.delete(&"k9".to_string()), Some(9));
        assert_eq!(heap.delete(&"k4".to_string()), Some(4));
        assert_eq!(heap.delete(&"k0".to_string()), Some(0));
        assert_eq!(heap.delete(&"k4".to_string()), None);
        assert!(!heap.contains(&"k4".to_string()));
        assert_consistent(&heap);
        assert_eq!(drain(&mut heap), vec![8, 7, 6, 5, 3, 2, 1]);
    }

    #[test]
    fn test_invariants_hold_under_mixed_operations() {
        let mut heap = IndexedHeap::new();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..2_000 {
            let key = format!("k{}", next() % 64);
            match next() % 4 {
                0 | 1 => {
                    let priority = (next() % 100) as i64 - 50;
                    heap.upsert_with(key, priority, || priority, |v| *v = priority);
                }
                2 => {
                    heap.delete(&key);
                }
                _ => {
                    heap.pop();
                }
            }
            assert_consistent(&heap);
        }

        let rest = drain(&mut heap);
        assert!(rest.windows(2).all(|w| w[0] >= w[1]));
    }
}
