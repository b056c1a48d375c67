//! # Running set: admitted background executions awaiting reap.
//!
//! A FIFO of background executions, one entry per `(event, subscriber)`
//! admission. It enforces the background cap and is swept periodically by the
//! dispatch loop.
//!
//! ## Architecture
//! ```text
//! try_admit(limit, event, sub)
//!     ├─ len >= limit → false (caller applies OverflowPolicy)
//!     └─ spawn task ──► run_once(sub, event, deadline)
//!                          ├─► store outcome in entry slot
//!                          └─► freed.notify_one()
//!
//! reap()
//!     └─ entries with an outcome (or whose task ended) are removed, FIFO order of the rest is kept
//! ```
//!
//! ## Rules
//! - Admission check and insertion happen under one lock, so the cap is never exceeded.
//! - The outcome is stored **before** `freed` is signalled; a waiter woken by
//!   `freed` always finds something to reap.
//! - The lock is never held across an `.await`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::core::runner::run_once;
use crate::error::ExecuteError;
use crate::events::Event;
use crate::subscribers::SubscriberRef;

type OutcomeSlot = Arc<Mutex<Option<Result<(), ExecuteError>>>>;

struct RunningEntry {
    event: Event,
    subscriber: SubscriberRef,
    started: Instant,
    outcome: OutcomeSlot,
    handle: JoinHandle<()>,
}

impl RunningEntry {
    fn label(&self) -> String {
        format!("{}@{}", self.subscriber.name(), self.event.id)
    }
}

/// A background execution removed from the running set.
pub struct Reaped {
    pub event: Event,
    pub subscriber: SubscriberRef,
    pub elapsed: Duration,
    pub outcome: Result<(), ExecuteError>,
}

/// FIFO of in-flight background executions.
#[derive(Default)]
pub struct RunningSet {
    entries: Mutex<VecDeque<RunningEntry>>,
    freed: Arc<Notify>,
}

impl RunningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Spawns `subscriber` for `event` if fewer than `limit` entries are running.
    ///
    /// `limit = None` means unlimited. Returns `false` without side effects
    /// when the set is full.
    pub fn try_admit(
        &self,
        limit: Option<usize>,
        event: &Event,
        subscriber: &SubscriberRef,
        deadline: Option<Duration>,
    ) -> bool {
        let mut entries = self.entries.lock();
        if limit.is_some_and(|n| entries.len() >= n) {
            return false;
        }

        let outcome: OutcomeSlot = Arc::new(Mutex::new(None));
        let handle = {
            let outcome = Arc::clone(&outcome);
            let freed = Arc::clone(&self.freed);
            let subscriber = Arc::clone(subscriber);
            let event = event.clone();
            tokio::spawn(async move {
                let res = run_once(subscriber.as_ref(), &event, deadline).await;
                *outcome.lock() = Some(res);
                freed.notify_one();
            })
        };

        entries.push_back(RunningEntry {
            event: event.clone(),
            subscriber: Arc::clone(subscriber),
            started: Instant::now(),
            outcome,
            handle,
        });
        true
    }

    /// Removes every finished entry and returns them in admission order.
    pub fn reap(&self) -> Vec<Reaped> {
        let mut entries = self.entries.lock();
        let mut reaped = Vec::new();
        let mut kept = VecDeque::with_capacity(entries.len());

        for entry in entries.drain(..) {
            let outcome = entry.outcome.lock().take();
            let outcome = match outcome {
                Some(o) => o,
                None if entry.handle.is_finished() => Err(ExecuteError::Panicked {
                    info: "execution ended without an outcome".to_string(),
                }),
                None => {
                    kept.push_back(entry);
                    continue;
                }
            };
            reaped.push(Reaped {
                elapsed: entry.started.elapsed(),
                event: entry.event,
                subscriber: entry.subscriber,
                outcome,
            });
        }

        *entries = kept;
        reaped
    }

    /// Completes when some background execution finishes (or already has, unobserved).
    pub async fn freed(&self) {
        self.freed.notified().await;
    }

    /// Returns `subscriber@event` labels of running entries, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().iter().map(RunningEntry::label).collect()
    }

    /// Aborts and removes every entry, returning their labels.
    pub fn abort_all(&self) -> Vec<String> {
        let mut entries = self.entries.lock();
        let labels = entries
            .drain(..)
            .map(|entry| {
                entry.handle.abort();
                entry.label()
            })
            .collect();
        labels
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Semaphore;

    use super::*;
    use crate::subscribers::{Mode, SubscriberFn};

    fn gated(name: &'static str, gate: Arc<Semaphore>, seen: Arc<AtomicUsize>) -> SubscriberRef {
        SubscriberFn::arc(name, Mode::Background, move |_ev: Event| {
            let gate = Arc::clone(&gate);
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| ExecuteError::fail(e.to_string()))?;
                Ok::<_, ExecuteError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_cap_is_enforced() {
        let set = RunningSet::new();
        let gate = Arc::new(Semaphore::new(0));
        let seen = Arc::new(AtomicUsize::new(0));
        let sub = gated("bg", Arc::clone(&gate), Arc::clone(&seen));

        for i in 0..3 {
            assert!(set.try_admit(Some(3), &Event::new(i.to_string(), "t"), &sub, None));
        }
        assert!(!set.try_admit(Some(3), &Event::new("3", "t"), &sub, None));
        assert_eq!(set.len(), 3);
        assert!(set.try_admit(None, &Event::new("4", "t"), &sub, None));
        assert_eq!(set.len(), 4);

        gate.close();
        set.abort_all();
    }

    #[tokio::test]
    async fn test_reap_collects_finished_entries() {
        let set = RunningSet::new();
        let gate = Arc::new(Semaphore::new(0));
        let seen = Arc::new(AtomicUsize::new(0));
        let sub = gated("bg", Arc::clone(&gate), Arc::clone(&seen));

        for i in 0..3 {
            assert!(set.try_admit(Some(5), &Event::new(i.to_string(), "t"), &sub, None));
        }
        assert!(set.reap().is_empty());

        gate.add_permits(3);
        let mut reaped = Vec::new();
        while reaped.len() < 3 {
            set.freed().await;
            reaped.extend(set.reap());
        }

        let mut ids: Vec<String> = reaped.iter().map(|r| r.event.id.to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert!(reaped.iter().all(|r| r.outcome.is_ok()));
        assert!(set.is_empty());
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_abort_all_reports_labels() {
        let set = RunningSet::new();
        let gate = Arc::new(Semaphore::new(0));
        let sub = gated("stuck", gate, Arc::new(AtomicUsize::new(0)));

        set.try_admit(None, &Event::new("e1", "t"), &sub, None);
        assert_eq!(set.snapshot(), vec!["stuck@e1".to_string()]);
        assert_eq!(set.abort_all(), vec!["stuck@e1".to_string()]);
        assert!(set.is_empty());
    }
}
