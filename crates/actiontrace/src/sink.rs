//! Bridges the sampling middleware's `EventSink` trait to the event
//! store, so a debounced/throttled event that gets flushed (on its own
//! timer, or evicted from a full pending-sample cache) still goes
//! through the same merge/dehydrate/evict pipeline as a directly
//! recorded one.

use std::sync::Arc;

use actiontrace_capture::EventSink;
use actiontrace_core::Clock;
use actiontrace_events::Event;
use actiontrace_store::EventStore;
use tracing::warn;

pub struct StoreSink<C: Clock> {
    store: Arc<EventStore<C>>,
}

impl<C: Clock> StoreSink<C> {
    pub fn new(store: Arc<EventStore<C>>) -> Self {
        Self { store }
    }
}

impl<C: Clock> EventSink for StoreSink<C> {
    fn record_flushed(&self, event: Event) {
        if let Err(error) = self.store.record_candidate(event) {
            warn!(%error, "failed to record flushed sample");
        }
    }
}
