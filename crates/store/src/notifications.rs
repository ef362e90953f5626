//! Batches `EventRecorded` notifications behind their own lock and
//! drains them onto the bus in insertion order once the batch is full
//! or a caller explicitly flushes. A bounded queue
//! (`max_pending_notifications = 256`) forces a drain before it can
//! grow without limit.

use std::collections::VecDeque;
use std::sync::Mutex;

use actiontrace_events::{EventBus, InMemoryEventBus};
use actiontrace_events::Event;

pub const MAX_PENDING_NOTIFICATIONS: usize = 256;

pub(crate) struct NotificationQueue {
    pending: Mutex<VecDeque<Event>>,
    bus: InMemoryEventBus<Event>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            bus: InMemoryEventBus::new(),
        }
    }

    pub fn subscribe(&self) -> actiontrace_events::Subscription<Event> {
        self.bus.subscribe()
    }

    /// Enqueue a notification. Forces an immediate drain once the queue
    /// would exceed the bound, rather than growing unbounded.
    pub fn enqueue(&self, event: Event) {
        let should_drain = {
            let mut pending = self.pending.lock().unwrap();
            pending.push_back(event);
            pending.len() >= MAX_PENDING_NOTIFICATIONS
        };
        if should_drain {
            self.drain();
        }
    }

    /// Drain and publish everything pending, in insertion order.
    pub fn drain(&self) {
        let batch: Vec<Event> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain(..).collect()
        };
        for event in batch {
            let _ = self.bus.publish(event);
        }
    }

    pub fn clear(&self) {
        self.pending.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use serde_json::json;

    fn event(sequence: u64) -> Event {
        Event::candidate("Test", TargetId::instance(1), &json!({}), 0).with_sequence(sequence)
    }

    #[test]
    fn drain_publishes_in_insertion_order() {
        let queue = NotificationQueue::new();
        let sub = queue.subscribe();

        queue.enqueue(event(1));
        queue.enqueue(event(2));
        queue.drain();

        assert_eq!(sub.try_recv().unwrap().sequence(), 1);
        assert_eq!(sub.try_recv().unwrap().sequence(), 2);
    }

    #[test]
    fn reaching_the_cap_forces_a_drain() {
        let queue = NotificationQueue::new();
        let sub = queue.subscribe();

        for i in 0..MAX_PENDING_NOTIFICATIONS as u64 {
            queue.enqueue(event(i));
        }

        // Already drained by the cap; nothing left pending to explicitly drain.
        assert!(sub.try_recv().is_ok());
    }
}
