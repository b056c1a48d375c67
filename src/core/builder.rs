use std::sync::Arc;

use crate::core::{bus::EventBus, config::BusConfig};
use crate::error::BusError;
use crate::subscribers::SubscriberRef;

/// Builder for constructing an [`EventBus`] with its initial subscriptions.
pub struct EventBusBuilder {
    cfg: BusConfig,
    subscriptions: Vec<(String, SubscriberRef)>,
}

impl EventBusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            subscriptions: Vec::new(),
        }
    }

    /// Adds a subscriber under `topic`.
    ///
    /// Registration order is notification order, as with [`EventBus::subscribe`].
    pub fn with_subscriber(mut self, topic: impl Into<String>, subscriber: SubscriberRef) -> Self {
        self.subscriptions.push((topic.into(), subscriber));
        self
    }

    /// Adds several subscribers under the same `topic`, in order.
    pub fn with_subscribers(
        mut self,
        topic: impl Into<String>,
        subscribers: impl IntoIterator<Item = SubscriberRef>,
    ) -> Self {
        let topic = topic.into();
        for sub in subscribers {
            self.subscriptions.push((topic.clone(), sub));
        }
        self
    }

    /// Builds the bus, registering every subscription.
    ///
    /// Fails on the first duplicate subscriber name.
    pub fn build(self) -> Result<Arc<EventBus>, BusError> {
        let bus = EventBus::new(self.cfg);
        for (topic, sub) in self.subscriptions {
            bus.subscribe(&topic, sub)?;
        }
        Ok(Arc::new(bus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecuteError;
    use crate::events::Event;
    use crate::subscribers::{Mode, SubscriberFn};

    fn sub(name: &'static str, mode: Mode) -> SubscriberRef {
        SubscriberFn::arc(name, mode, |_ev: Event| async {
            Ok::<_, ExecuteError>(())
        })
    }

    #[test]
    fn test_build_registers_all_topics() {
        let bus = EventBusBuilder::new(BusConfig::default())
            .with_subscriber("a", sub("s1", Mode::JustDoIt))
            .with_subscribers("b", [sub("s2", Mode::Background), sub("s3", Mode::JustDoIt)])
            .build()
            .unwrap();
        assert_eq!(bus.topics(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_build_fails_on_duplicate() {
        let err = EventBusBuilder::new(BusConfig::default())
            .with_subscriber("a", sub("same", Mode::JustDoIt))
            .with_subscriber("b", sub("same", Mode::Background))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "bus_duplicate_subscriber");
    }
}
