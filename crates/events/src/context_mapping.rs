//! Side-table row linking an event to a higher-level operational context.

use actiontrace_core::{ContextId, Payload, Sequence};
use serde::{Deserialize, Serialize};

/// Associates an [`Event`](crate::Event) with an external operational
/// context (a tool-invocation id, a session, an agent identity).
///
/// Multiple mappings per event are allowed; duplicates by
/// `(event_sequence, context_id)` are idempotent at the store's
/// `AddContextMapping` boundary, not here — this type is a plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMapping {
    event_sequence: Sequence,
    context_id: ContextId,
    attributes: Payload,
}

impl ContextMapping {
    pub fn new(event_sequence: Sequence, context_id: ContextId, attributes: Payload) -> Self {
        Self {
            event_sequence,
            context_id,
            attributes,
        }
    }

    pub fn event_sequence(&self) -> Sequence {
        self.event_sequence
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn attributes(&self) -> &Payload {
        &self.attributes
    }

    /// The `(event_sequence, context_id)` key duplicates are detected by.
    pub fn key(&self) -> (Sequence, ContextId) {
        (self.event_sequence, self.context_id)
    }
}
