//! The versioned persisted snapshot document.

use actiontrace_core::Sequence;
use actiontrace_events::{ContextMapping, Event};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk schema version this crate writes. Older documents are
/// loaded and implicitly rewritten at this version on next save; newer
/// documents are loaded with a warning (forward compatibility, not
/// forward understanding).
pub const CURRENT_SCHEMA_VERSION: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub schema_version: u32,
    pub sequence_counter: Sequence,
    pub events: Vec<Event>,
    pub context_mappings: Vec<ContextMapping>,
    /// Metadata only; never interpreted by the load path. `chrono` rather
    /// than a raw epoch field since this, unlike `Event::timestamp_ms`,
    /// is a human-facing diagnostic value, not a hot-path sort key.
    pub saved_at: DateTime<Utc>,
}

impl SnapshotDocument {
    pub fn new(sequence_counter: Sequence, events: Vec<Event>, context_mappings: Vec<ContextMapping>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            sequence_counter,
            events,
            context_mappings,
            saved_at: Utc::now(),
        }
    }

    /// Post-load trim, looser than runtime eviction: unlike runtime
    /// eviction, which trims as soon as `count > max_events`, a freshly
    /// loaded snapshot is only trimmed when it overshoots by more than
    /// 2x — a reload right after a temporary overshoot shouldn't trigger
    /// aggressive deletion. When it does trigger, it reduces straight to
    /// `max_events`, keeping the most recent, and cascade-drops any
    /// context mapping whose event no longer exists.
    pub fn apply_load_time_trim(&mut self, max_events: usize) {
        if self.events.len() <= 2 * max_events {
            return;
        }

        let excess = self.events.len() - max_events;
        self.events.drain(0..excess);

        let live_sequences: std::collections::HashSet<Sequence> =
            self.events.iter().map(Event::sequence).collect();
        self.context_mappings
            .retain(|mapping| live_sequences.contains(&mapping.event_sequence()));
    }

    pub fn is_newer_than_current(&self) -> bool {
        self.schema_version > CURRENT_SCHEMA_VERSION
    }

    pub fn is_older_than_current(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;

    fn event(sequence: Sequence) -> Event {
        Event::candidate("Test", TargetId::instance(1), &serde_json::json!({}), 0).with_sequence(sequence)
    }

    #[test]
    fn trim_fires_only_past_double_overshoot_and_cascades_mappings() {
        let events = vec![event(1), event(2), event(3), event(4), event(5)];
        let mappings = vec![
            ContextMapping::new(1, Default::default(), Default::default()),
            ContextMapping::new(5, Default::default(), Default::default()),
        ];
        let mut doc = SnapshotDocument::new(5, events, mappings);

        // 5 events > 2 * max_events(2) == 4, so the loosened rule trims.
        doc.apply_load_time_trim(2);

        assert_eq!(doc.events.len(), 2);
        assert_eq!(doc.events[0].sequence(), 4);
        assert_eq!(doc.context_mappings.len(), 1);
        assert_eq!(doc.context_mappings[0].event_sequence(), 5);
    }

    #[test]
    fn trim_is_noop_within_double_overshoot() {
        let events = vec![event(1), event(2), event(3)];
        let mut doc = SnapshotDocument::new(3, events, vec![]);
        // 3 events <= 2 * max_events(2) == 4: loosened rule does not fire,
        // even though count > max_events.
        doc.apply_load_time_trim(2);
        assert_eq!(doc.events.len(), 3);
    }
}
