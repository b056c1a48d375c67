//! # EventBus: priority dispatch, background cap, periodic reap.
//!
//! The [`EventBus`] owns three independently locked parts:
//! - a [`PriorityStore`] of pending events keyed by event id,
//! - a [`Registry`] of subscribers per topic,
//! - a [`RunningSet`] of admitted background executions.
//!
//! ## High-level architecture
//! ```text
//! post(event) ──► PriorityStore.upsert(id, event, priority) ──► wake.notify_one()
//!
//! run(token):
//!   loop {
//!     select! {
//!       token.cancelled()  → stop
//!       ticker.tick()      → sweep(): reap every finished background execution
//!       wake.notified()    → (nothing, fall through)
//!     }
//!     dispatch pass: batch = pending.take_all() (one lock, priority order) → notify(each)
//!   }
//!   shutdown: wait up to cfg.grace for the running set to drain, else abort
//!
//! notify(event):
//!   for sub in registry.subscribers(topic)          (registration order)
//!     ├─ JustDoIt   → run_once(sub) inline          (never capped)
//!     └─ Background → running.try_admit(cap)
//!                        ├─ admitted → tokio::spawn(run_once(sub))
//!                        └─ full     → sweep, retry, then OverflowPolicy:
//!                                        Reject → Delivery.rejected + CapacityExceeded
//!                                        Wait   → await a freed slot
//! ```
//!
//! ## Rules
//! - One dispatch loop per bus (`run` twice → [`RuntimeError::AlreadyRunning`]).
//! - The wake signal is a single stored permit: posters never block, and a
//!   post made during a pass makes the next pass start right after it.
//! - A pass handles exactly the events pending at its start, taken from the
//!   store in one step; events posted during a pass are handled by the next one.
//! - Re-posting a pending id changes its priority only; topic and payload stay.
//! - Subscriber failures and panics are contained and reported as notices.
//!
//! ## Example
//! ```rust
//! use prioritybus::{BusConfig, Event, EventBus, ExecuteError, Mode, SubscriberFn};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::builder(BusConfig::default())
//!         .with_subscriber(
//!             "greetings",
//!             SubscriberFn::arc("printer", Mode::JustDoIt, |ev: Event| async move {
//!                 println!("hello from {}", ev.id);
//!                 Ok::<_, ExecuteError>(())
//!             }),
//!         )
//!         .build()?;
//!
//!     let token = CancellationToken::new();
//!     let driver = bus.spawn(token.clone());
//!
//!     bus.post(Event::new("1", "greetings"));
//!     tokio::task::yield_now().await;
//!
//!     token.cancel();
//!     driver.await??;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::{
    builder::EventBusBuilder,
    config::BusConfig,
    registry::Registry,
    runner::run_once,
    running::RunningSet,
    shutdown,
};
use crate::error::{BusError, RuntimeError};
use crate::events::{Event, Notice, NoticeFeed, NoticeKind};
use crate::policies::OverflowPolicy;
use crate::queue::PriorityStore;
use crate::subscribers::{Mode, SubscriberRef};

/// What `notify` did with one event, per subscriber name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// JustDoIt subscribers executed inline (successfully or not).
    pub executed: Vec<Arc<str>>,
    /// Background subscribers admitted into the running set.
    pub admitted: Vec<Arc<str>>,
    /// Background subscribers refused because the cap was reached.
    pub rejected: Vec<Arc<str>>,
}

impl Delivery {
    /// True if no subscriber was refused.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// True if the event reached no subscriber at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.executed.is_empty() && self.admitted.is_empty() && self.rejected.is_empty()
    }
}

/// In-process priority event bus.
pub struct EventBus {
    cfg: BusConfig,
    pending: PriorityStore<Arc<str>, Event>,
    registry: Registry,
    running: RunningSet,
    wake: Notify,
    feed: NoticeFeed,
    active: AtomicBool,
}

/// Clears the single-loop flag when `run` returns.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new(cfg: BusConfig) -> Self {
        let feed = NoticeFeed::new(cfg.notice_capacity_clamped());
        Self {
            cfg,
            pending: PriorityStore::new(),
            registry: Registry::new(),
            running: RunningSet::new(),
            wake: Notify::new(),
            feed,
            active: AtomicBool::new(false),
        }
    }

    /// Starts a builder with the given configuration.
    pub fn builder(cfg: BusConfig) -> EventBusBuilder {
        EventBusBuilder::new(cfg)
    }

    /// Configuration in use.
    pub fn config(&self) -> &BusConfig {
        &self.cfg
    }

    /// Registers `subscriber` under `topic`.
    ///
    /// Fails with [`BusError::DuplicateSubscriber`] if the name is already
    /// registered under any topic; the registry is then left unchanged.
    pub fn subscribe(&self, topic: &str, subscriber: SubscriberRef) -> Result<(), BusError> {
        let name = subscriber.name().to_string();
        let mode = subscriber.mode();
        self.registry.subscribe(topic, subscriber)?;
        debug!(topic, subscriber = %name, %mode, "subscribed");
        Ok(())
    }

    /// Enqueues `event`, or re-prioritizes the pending event with the same id.
    ///
    /// A re-post only changes the priority: the pending event keeps its topic
    /// and timestamp. Returns immediately; delivery is observable only through
    /// [`notices`](Self::notices).
    pub fn post(&self, event: Event) {
        let priority = event.priority;
        let mut stored: Option<Event> = None;
        let inserted = self.pending.upsert_with(
            Arc::clone(&event.id),
            priority,
            || event.clone(),
            |pending| {
                pending.priority = priority;
                stored = Some(pending.clone());
            },
        );
        let event = stored.unwrap_or(event);
        debug!(
            event = %event.id,
            topic = %event.topic,
            priority,
            inserted,
            "posted"
        );
        self.feed.publish(Notice::for_event(NoticeKind::Posted, &event));
        self.wake.notify_one();
    }

    /// Removes a still-pending event. Returns it if it had not been dispatched yet.
    pub fn withdraw(&self, id: &str) -> Option<Event> {
        let removed = self.pending.delete(&Arc::from(id));
        if removed.is_some() {
            debug!(event = id, "withdrawn");
        }
        removed
    }

    /// Number of pending (not yet dispatched) events.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if an event with this id is pending.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(&Arc::from(id))
    }

    /// Number of background executions currently in the running set.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    /// `subscriber@event` labels of the running set, oldest first.
    pub fn running_snapshot(&self) -> Vec<String> {
        self.running.snapshot()
    }

    /// Returns true if a subscriber with this name is registered on any topic.
    pub fn is_subscribed(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Sorted list of topics with at least one subscriber.
    pub fn topics(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Creates a receiver for lifecycle notices published after this call.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.feed.subscribe()
    }

    /// Spawns [`run`](Self::run) on the current tokio runtime.
    pub fn spawn(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<Result<(), RuntimeError>> {
        let bus = Arc::clone(self);
        tokio::spawn(async move { bus.run(token).await })
    }

    /// Runs the dispatch loop until an OS termination signal arrives, then shuts down.
    pub async fn serve(&self) -> Result<(), RuntimeError> {
        let token = CancellationToken::new();
        let run = self.run(token.clone());
        tokio::pin!(run);

        tokio::select! {
            res = &mut run => res,
            sig = shutdown::wait_for_shutdown_signal() => {
                sig?;
                info!("termination signal received");
                token.cancel();
                run.await
            }
        }
    }

    /// The dispatch loop.
    ///
    /// Wakes on [`post`](Self::post) or every [`BusConfig::tick`]; each tick
    /// sweeps the running set. Every wake is followed by a dispatch pass.
    /// When `token` is cancelled, pending events stay queued and running
    /// background work gets [`BusConfig::grace`] to finish.
    pub async fn run(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let _active = ActiveGuard(&self.active);

        let tick = self.cfg.tick_clamped();
        let mut ticker = time::interval_at(time::Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?tick, max_background = self.cfg.max_background, "dispatch loop started");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = self.wake.notified() => {}
            }
            self.dispatch_pass().await;
        }

        info!(pending = self.pending(), running = self.running(), "dispatch loop stopping");
        self.feed.publish(Notice::new(NoticeKind::ShutdownRequested));
        self.wait_all_with_grace().await
    }

    /// Takes every event pending at pass start, in priority order, and notifies each.
    ///
    /// The batch is removed from the store in one step, so events posted while
    /// it is being notified wait for the next pass.
    async fn dispatch_pass(&self) {
        let batch = self.pending.take_all();
        if batch.is_empty() {
            return;
        }
        debug!(size = batch.len(), "dispatch pass");

        for event in &batch {
            self.notify(event).await;
        }
    }

    /// Fans `event` out to the subscribers of its topic.
    ///
    /// Called by the dispatch loop for every popped event. A topic without
    /// subscribers consumes the event silently (a `NoSubscribers` notice is
    /// still published).
    pub async fn notify(&self, event: &Event) -> Delivery {
        self.feed
            .publish(Notice::for_event(NoticeKind::Dispatched, event));

        let mut delivery = Delivery::default();
        let subscribers = self.registry.subscribers(&event.topic);
        if subscribers.is_empty() {
            debug!(event = %event.id, topic = %event.topic, "no subscribers; consumed");
            self.feed
                .publish(Notice::for_event(NoticeKind::NoSubscribers, event));
            return delivery;
        }

        for sub in subscribers {
            let name: Arc<str> = Arc::from(sub.name());
            match sub.mode() {
                Mode::JustDoIt => {
                    self.execute_inline(&sub, event).await;
                    delivery.executed.push(name);
                }
                Mode::Background => {
                    if self.admit(&sub, event).await {
                        delivery.admitted.push(name);
                    } else {
                        delivery.rejected.push(name);
                    }
                }
            }
        }
        delivery
    }

    /// Runs a JustDoIt subscriber on the dispatch loop itself.
    async fn execute_inline(&self, sub: &SubscriberRef, event: &Event) {
        let started = Instant::now();
        let res = run_once(sub.as_ref(), event, self.cfg.execution_deadline()).await;
        let elapsed = started.elapsed();

        match res {
            Ok(()) => self.feed.publish(
                Notice::for_event(NoticeKind::Executed, event)
                    .with_subscriber(sub.name())
                    .with_elapsed(elapsed),
            ),
            Err(e) => {
                warn!(
                    event = %event.id,
                    subscriber = sub.name(),
                    error = %e,
                    "inline execution failed"
                );
                self.feed.publish(
                    Notice::for_event(NoticeKind::ExecuteFailed, event)
                        .with_subscriber(sub.name())
                        .with_outcome(e.as_label())
                        .with_reason(e.to_string())
                        .with_elapsed(elapsed),
                );
            }
        }
    }

    /// Admits a Background subscriber, applying the overflow policy when full.
    async fn admit(&self, sub: &SubscriberRef, event: &Event) -> bool {
        let limit = self.cfg.background_limit();
        let deadline = self.cfg.execution_deadline();
        let mut swept = false;

        loop {
            if self.running.try_admit(limit, event, sub, deadline) {
                debug!(event = %event.id, subscriber = sub.name(), "admitted");
                self.feed.publish(
                    Notice::for_event(NoticeKind::Admitted, event).with_subscriber(sub.name()),
                );
                return true;
            }

            if !swept {
                self.sweep();
                swept = true;
                continue;
            }

            match self.cfg.overflow {
                OverflowPolicy::Reject => {
                    warn!(
                        event = %event.id,
                        subscriber = sub.name(),
                        limit = self.cfg.max_background,
                        "background capacity exceeded; rejected"
                    );
                    self.feed.publish(
                        Notice::for_event(NoticeKind::CapacityExceeded, event)
                            .with_subscriber(sub.name())
                            .with_reason(format!("limit={}", self.cfg.max_background)),
                    );
                    return false;
                }
                OverflowPolicy::Wait => {
                    debug!(event = %event.id, subscriber = sub.name(), "waiting for a background slot");
                    self.running.freed().await;
                    swept = false;
                }
            }
        }
    }

    /// Reaps every finished background execution. Returns how many were reaped.
    ///
    /// Runs on every tick; also called before an admission is refused.
    pub fn sweep(&self) -> usize {
        let reaped = self.running.reap();
        for r in &reaped {
            let result = r.subscriber.result();
            let mut notice = Notice::for_event(NoticeKind::Reaped, &r.event)
                .with_subscriber(r.subscriber.name())
                .with_result(result.as_str())
                .with_elapsed(r.elapsed);

            match &r.outcome {
                Ok(()) => {
                    debug!(event = %r.event.id, subscriber = r.subscriber.name(), %result, "reaped");
                    notice = notice.with_outcome("completed");
                }
                Err(e) => {
                    warn!(
                        event = %r.event.id,
                        subscriber = r.subscriber.name(),
                        error = %e,
                        %result,
                        "background execution failed"
                    );
                    notice = notice.with_outcome(e.as_label()).with_reason(e.to_string());
                }
            }
            self.feed.publish(notice);
        }
        reaped.len()
    }

    /// Waits for the running set to drain within [`BusConfig::grace`].
    ///
    /// Publishes `AllReaped` on success; otherwise aborts what is left, publishes
    /// `GraceExceeded` and returns [`RuntimeError::GraceExceeded`].
    async fn wait_all_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async {
            loop {
                self.sweep();
                if self.running.is_empty() {
                    break;
                }
                self.running.freed().await;
            }
        };

        match time::timeout(grace, done).await {
            Ok(()) => {
                info!("all background work reaped");
                self.feed.publish(Notice::new(NoticeKind::AllReaped));
                Ok(())
            }
            Err(_) => {
                let stuck = self.running.abort_all();
                warn!(?grace, ?stuck, "grace exceeded; aborting background work");
                self.feed.publish(
                    Notice::new(NoticeKind::GraceExceeded).with_reason(stuck.join(",")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
