//! Inner state guarded by the store's single `RwLock`: events, context
//! mappings, the dehydration marker, and the merge/eviction mechanics
//! that operate on them. Notifications and settings live behind their
//! own locks — one lock guards the events list, context mappings, and
//! sequence counter; a separate lock guards the pending notifications
//! queue.

use actiontrace_core::Sequence;
use actiontrace_events::{ContextMapping, Event};

use crate::merge::MergePolicyRegistry;

pub(crate) struct StoreState {
    pub events: Vec<Event>,
    pub context_mappings: Vec<ContextMapping>,
    pub dirty: bool,
    /// Index into `events` of the last *appended* (never merged-into)
    /// event. Updated only after a successful append, so a merge attempt
    /// against it can never be an event merging with itself.
    pub last_recorded_index: Option<usize>,
    /// `events.len()` as of the last dehydration pass; re-walking is
    /// skipped when the count hasn't changed since.
    pub dehydration_marker: usize,
}

impl StoreState {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            context_mappings: Vec::new(),
            dirty: false,
            last_recorded_index: None,
            dehydration_marker: 0,
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.context_mappings.clear();
        self.dirty = true;
        self.last_recorded_index = None;
        self.dehydration_marker = 0;
    }

    /// Attempt to fold `candidate` into the last-recorded event. Returns
    /// the existing sequence on success.
    pub fn try_merge(
        &mut self,
        candidate: &Event,
        merge_window_ms: u64,
        policies: &MergePolicyRegistry,
    ) -> Option<Sequence> {
        let idx = self.last_recorded_index?;
        let last = self.events.get_mut(idx)?;

        if last.event_type() != candidate.event_type() {
            return None;
        }
        if last.target_id() != candidate.target_id() {
            return None;
        }
        let delta = (candidate.timestamp_ms() - last.timestamp_ms()).unsigned_abs();
        if delta > merge_window_ms {
            return None;
        }

        policies.policy_for(candidate.event_type()).merge(last, candidate);
        Some(last.sequence())
    }

    /// Append a freshly sequenced event, making it the new merge target.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
        self.last_recorded_index = Some(self.events.len() - 1);
        self.dirty = true;
    }

    /// Dehydrate the cold prefix once `events.len()` first exceeds
    /// `hot_event_count` and differs from the last marker.
    pub fn maybe_dehydrate(&mut self, hot_event_count: usize, summarize: impl Fn(&Event) -> String) {
        let count = self.events.len();
        if count <= hot_event_count || count == self.dehydration_marker {
            return;
        }

        let cutoff = count - hot_event_count;
        for event in &mut self.events[0..cutoff] {
            if event.payload().is_some() {
                let summary = event
                    .precomputed_summary()
                    .map(str::to_string)
                    .unwrap_or_else(|| summarize(event));
                event.dehydrate_with(summary);
            }
        }
        self.dehydration_marker = count;
    }

    /// Evict the oldest surplus once `events.len() > max_events`,
    /// cascade-deleting any context mapping that referenced a dropped
    /// event, and keeping `last_recorded_index`/`dehydration_marker`
    /// consistent with the shifted indices.
    pub fn maybe_evict(&mut self, max_events: usize) {
        let count = self.events.len();
        if count <= max_events {
            return;
        }

        let excess = count - max_events;
        let dropped: std::collections::HashSet<Sequence> =
            self.events[0..excess].iter().map(Event::sequence).collect();
        self.events.drain(0..excess);
        self.context_mappings.retain(|m| !dropped.contains(&m.event_sequence()));

        self.last_recorded_index = self.last_recorded_index.and_then(|idx| idx.checked_sub(excess));
        self.dehydration_marker = self.dehydration_marker.saturating_sub(excess);
    }

    /// Cap the context-mapping table at `2 * max_events`, trimming the
    /// oldest entries first.
    pub fn enforce_context_mapping_cap(&mut self, max_events: usize) {
        let cap = 2 * max_events;
        if self.context_mappings.len() > cap {
            let excess = self.context_mappings.len() - cap;
            self.context_mappings.drain(0..excess);
        }
    }
}
