//! # Broadcast feed for lifecycle notices.
//!
//! [`NoticeFeed`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from posters, the dispatch loop and the sweep.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent notices for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: notices are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::notice::Notice;

/// Broadcast channel for lifecycle notices.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct NoticeFeed {
    tx: broadcast::Sender<Notice>,
}

impl NoticeFeed {
    /// Creates a new feed with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Notice>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a notice to all active receivers.
    ///
    /// If there are no receivers, the notice is dropped.
    pub fn publish(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    /// Creates a receiver that observes notices sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoticeKind;

    #[tokio::test]
    async fn test_publish_reaches_receivers() {
        let feed = NoticeFeed::new(4);
        let mut rx = feed.subscribe();
        feed.publish(Notice::new(NoticeKind::Posted));

        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, NoticeKind::Posted);
    }

    #[test]
    fn test_publish_without_receivers_is_dropped() {
        let feed = NoticeFeed::new(0);
        feed.publish(Notice::new(NoticeKind::AllReaped));

        let mut late = feed.subscribe();
        assert!(late.try_recv().is_err());
    }
}
