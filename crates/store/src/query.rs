//! Read-side shapes returned by the store's query methods.

use actiontrace_events::{ContextMapping, Event};

/// One row of `QueryWithContext`: an event paired with one of its
/// context mappings, or `None` if it has none.
#[derive(Debug, Clone)]
pub struct EventWithContext {
    pub event: Event,
    pub context: Option<ContextMapping>,
}
