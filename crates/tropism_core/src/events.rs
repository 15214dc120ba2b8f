//! Topic-keyed publish/subscribe with scoped subscriptions.
//!
//! Subscription lifetime is tied to the returned [`Subscription`] guard:
//! dropping it removes the callback, so a component that goes away cannot
//! leave a dangling listener behind. Callbacks run on the triggering
//! thread; the handler list is snapshotted before invocation so handlers
//! may subscribe or trigger further events reentrantly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

type Handler = Arc<dyn Fn() + Send + Sync>;
type TopicMap = HashMap<String, Vec<(u64, Handler)>>;

/// Named events that can be triggered and subscribed to.
#[derive(Default)]
pub struct EventBus {
    topics: Arc<RwLock<TopicMap>>,
    next_id: AtomicU64,
}

/// Scoped subscription guard; unsubscribes on drop.
#[must_use = "dropping the subscription immediately unsubscribes"]
pub struct Subscription {
    topics: Weak<RwLock<TopicMap>>,
    topic: String,
    id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to one topic.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        topics
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription {
            topics: Arc::downgrade(&self.topics),
            topic: topic.to_string(),
            id,
        }
    }

    /// Triggers a topic, invoking every current subscriber.
    ///
    /// Triggering a topic nobody subscribed to is not an error.
    pub fn trigger(&self, topic: &str) {
        let handlers: Vec<Handler> = {
            let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
            match topics.get(topic) {
                Some(list) => list.iter().map(|(_, h)| h.clone()).collect(),
                None => return,
            }
        };
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics.get(topic).map_or(0, Vec::len)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(topics) = self.topics.upgrade() {
            let mut topics = topics.write().unwrap_or_else(|e| e.into_inner());
            if let Some(list) = topics.get_mut(&self.topic) {
                list.retain(|(id, _)| *id != self.id);
                if list.is_empty() {
                    topics.remove(&self.topic);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribe_and_trigger() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _sub = bus.subscribe("/test", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger("/test");
        bus.trigger("/test");

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let counter1 = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::new(AtomicUsize::new(0));

        let c1 = counter1.clone();
        let _s1 = bus.subscribe("/test", move || {
            c1.fetch_add(1, Ordering::SeqCst);
        });

        let c2 = counter2.clone();
        let _s2 = bus.subscribe("/test", move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger("/test");

        assert_eq!(counter1.load(Ordering::SeqCst), 1);
        assert_eq!(counter2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_subscribers() {
        let bus = EventBus::new();
        // Should not panic.
        bus.trigger("/nobody-listens");
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let sub = bus.subscribe("/test", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.subscriber_count("/test"), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count("/test"), 0);

        bus.trigger("/test");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_topics_are_independent() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        let _sub = bus.subscribe("/a", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger("/b");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reentrant_trigger() {
        let bus = Arc::new(EventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let bus_clone = bus.clone();
        let c = counter.clone();
        let _outer = bus.subscribe("/outer", move || {
            bus_clone.trigger("/inner");
        });
        let _inner = bus.subscribe("/inner", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger("/outer");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
