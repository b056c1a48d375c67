//! # Subscriber registry.
//!
//! Maps a topic to the ordered list of subscribers registered on it and keeps
//! the set of all registered names.
//!
//! ## Rules
//! - Names are unique **across all topics**; a duplicate is rejected and the
//!   registry is left unchanged.
//! - Notification order for a topic is registration order.
//! - Lookups hand out a cloned `Vec<SubscriberRef>` so no lock is held while
//!   subscribers execute.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::BusError;
use crate::subscribers::SubscriberRef;

#[derive(Default)]
struct Topics {
    by_topic: HashMap<Arc<str>, Vec<SubscriberRef>>,
    names: HashSet<String>,
}

/// Topic → subscribers table.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<Topics>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` under `topic`.
    pub fn subscribe(&self, topic: &str, subscriber: SubscriberRef) -> Result<(), BusError> {
        let mut inner = self.inner.write();
        let name = subscriber.name();
        if inner.names.contains(name) {
            return Err(BusError::DuplicateSubscriber {
                name: name.to_string(),
            });
        }

        inner.names.insert(name.to_string());
        inner
            .by_topic
            .entry(Arc::from(topic))
            .or_default()
            .push(subscriber);
        Ok(())
    }

    /// Subscribers of `topic` in registration order (empty if none).
    pub fn subscribers(&self, topic: &str) -> Vec<SubscriberRef> {
        self.inner
            .read()
            .by_topic
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if a subscriber named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().names.contains(name)
    }

    /// Returns sorted list of topics that have at least one subscriber.
    pub fn topics(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut topics: Vec<String> = inner.by_topic.keys().map(|t| t.to_string()).collect();
        topics.sort_unstable();
        topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecuteError;
    use crate::events::Event;
    use crate::subscribers::{Mode, SubscriberFn};

    fn sub(name: &'static str) -> SubscriberRef {
        SubscriberFn::arc(name, Mode::JustDoIt, |_ev: Event| async {
            Ok::<_, ExecuteError>(())
        })
    }

    #[test]
    fn test_duplicate_name_rejected_across_topics() {
        let reg = Registry::new();
        reg.subscribe("topicA", sub("x")).unwrap();

        let err = reg.subscribe("topicB", sub("x")).unwrap_err();
        assert_eq!(err, BusError::DuplicateSubscriber { name: "x".into() });
        assert!(reg.subscribers("topicB").is_empty());
        assert_eq!(reg.topics(), vec!["topicA".to_string()]);
    }

    #[test]
    fn test_registration_order_is_kept() {
        let reg = Registry::new();
        for name in ["c", "a", "b"] {
            reg.subscribe("t", sub(name)).unwrap();
        }
        let names: Vec<String> = reg
            .subscribers("t")
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(reg.contains("a"));
        assert!(!reg.contains("z"));
    }

    #[test]
    fn test_unknown_topic_is_empty() {
        let reg = Registry::new();
        assert!(reg.subscribers("nobody").is_empty());
    }
}
