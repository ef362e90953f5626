//! The `Event` record — the single unit the store, semantic layer, and
//! query layer all operate on.

use actiontrace_core::{sanitize_payload, Payload, Sequence, TargetId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Immutable record of one captured editor occurrence.
///
/// Equality is defined over `(sequence, timestamp_ms, type, target_id)` —
/// two events with the same identity-bearing fields but different
/// payload/summary/dehydration state (which shouldn't happen within one
/// process, but can after a schema-version upgrade on load) still compare
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    sequence: Sequence,
    timestamp_ms: i64,
    #[serde(rename = "type")]
    event_type: String,
    target_id: TargetId,
    payload: Option<Payload>,
    precomputed_summary: Option<String>,
    is_dehydrated: bool,
}

impl Event {
    /// Construct a new, not-yet-sequenced event candidate.
    ///
    /// `sequence` is assigned by the store at record-time; callers building
    /// an event before it has one leave it at `0` and let the store call
    /// [`Event::with_sequence`].
    pub fn candidate(
        event_type: impl Into<String>,
        target_id: TargetId,
        raw_payload: &JsonValue,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            sequence: 0,
            timestamp_ms,
            event_type: event_type.into(),
            target_id,
            payload: Some(sanitize_payload(raw_payload)),
            precomputed_summary: None,
            is_dehydrated: false,
        }
    }

    /// Construct directly from an already-sanitized payload (used when
    /// rehydrating from a snapshot, or merging, where sanitization has
    /// already happened).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        sequence: Sequence,
        timestamp_ms: i64,
        event_type: impl Into<String>,
        target_id: TargetId,
        payload: Option<Payload>,
        precomputed_summary: Option<String>,
        is_dehydrated: bool,
    ) -> Self {
        Self {
            sequence,
            timestamp_ms,
            event_type: event_type.into(),
            target_id,
            payload,
            precomputed_summary,
            is_dehydrated,
        }
    }

    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn set_timestamp_ms(&mut self, timestamp_ms: i64) {
        self.timestamp_ms = timestamp_ms;
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut Payload> {
        self.payload.as_mut()
    }

    pub fn set_payload(&mut self, payload: Option<Payload>) {
        self.payload = payload;
    }

    pub fn precomputed_summary(&self) -> Option<&str> {
        self.precomputed_summary.as_deref()
    }

    pub fn set_precomputed_summary(&mut self, summary: impl Into<String>) {
        self.precomputed_summary = Some(summary.into());
    }

    pub fn is_dehydrated(&self) -> bool {
        self.is_dehydrated
    }

    /// Replace the payload with `None`, caching `summary` so
    /// [`Event::precomputed_summary`] stays available. Idempotent: calling
    /// this twice on an already-dehydrated event is a no-op.
    pub fn dehydrate_with(&mut self, summary: impl Into<String>) {
        if self.is_dehydrated {
            return;
        }
        self.payload = None;
        self.precomputed_summary = Some(summary.into());
        self.is_dehydrated = true;
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
            && self.timestamp_ms == other.timestamp_ms
            && self.event_type == other.event_type
            && self.target_id == other.target_id
    }
}

impl Eq for Event {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_ignores_payload_and_summary() {
        let a = Event::candidate("test.evt", TargetId::instance(1), &json!({"x": 1}), 0).with_sequence(5);
        let mut b = a.clone();
        b.dehydrate_with("summary");
        assert_eq!(a, b);
    }

    #[test]
    fn dehydrate_is_idempotent() {
        let mut e = Event::candidate("test.evt", TargetId::instance(1), &json!({"x": 1}), 0).with_sequence(1);
        e.dehydrate_with("first");
        e.dehydrate_with("second");
        assert_eq!(e.precomputed_summary(), Some("first"));
        assert!(e.payload().is_none());
    }
}
