//! The Event Store: the single owned value that assigns sequences,
//! merges, dehydrates, evicts, and notifies.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{error, warn};

use actiontrace_core::{ActionTraceError, ActionTraceResult, Clock, Sequence, TargetId};
use actiontrace_events::{ContextMapping, Event, Subscription};
use actiontrace_settings::{MemoryDiagnostics, Settings};

use crate::merge::MergePolicyRegistry;
use crate::notifications::NotificationQueue;
use crate::query::EventWithContext;
use crate::state::StoreState;

/// Single-writer/many-reader append-only event store. One `RwLock`
/// guards the mutable event/context-mapping state (`StoreState`); the
/// pending-notifications queue and the settings object each carry their
/// own lock, so a reader never blocks behind a writer's notification
/// drain or vice versa.
pub struct EventStore<C: Clock> {
    state: RwLock<StoreState>,
    settings: RwLock<Settings>,
    sequence_counter: AtomicU64,
    notifications: NotificationQueue,
    merge_policies: MergePolicyRegistry,
    clock: Arc<C>,
    /// Set once a fatal invariant violation is detected. While true, the
    /// store rejects writes but still answers reads.
    quarantined: AtomicBool,
}

impl<C: Clock> EventStore<C> {
    pub fn new(settings: Settings, clock: Arc<C>) -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
            settings: RwLock::new(settings),
            sequence_counter: AtomicU64::new(0),
            notifications: NotificationQueue::new(),
            merge_policies: MergePolicyRegistry::new(),
            clock,
            quarantined: AtomicBool::new(false),
        }
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantined.load(Ordering::SeqCst)
    }

    fn quarantine(&self, reason: &str) -> ActionTraceError {
        error!(%reason, "event store entering read-only quarantine");
        self.quarantined.store(true, Ordering::SeqCst);
        ActionTraceError::invariant(reason)
    }

    /// Record a candidate event, using the injected clock for its
    /// timestamp. Returns `Ok(None)` for an ordinary rejection (disabled
    /// type, below the importance floor) — that is not an error.
    pub fn record(
        &self,
        event_type: &str,
        target_id: TargetId,
        raw_payload: &serde_json::Value,
    ) -> ActionTraceResult<Option<Sequence>> {
        let timestamp_ms = self.clock.now_ms();
        self.record_at(event_type, target_id, raw_payload, timestamp_ms)
    }

    /// As [`Self::record`], but with an explicit timestamp — the entry
    /// point capture sources that already carry a timestamp should use,
    /// and what tests use for determinism.
    pub fn record_at(
        &self,
        event_type: &str,
        target_id: TargetId,
        raw_payload: &serde_json::Value,
        timestamp_ms: i64,
    ) -> ActionTraceResult<Option<Sequence>> {
        let candidate = Event::candidate(event_type, target_id, raw_payload, timestamp_ms);
        self.record_candidate(candidate)
    }

    /// As [`Self::record_at`], but for a candidate that has already been
    /// built and sanitized elsewhere (a sampling middleware flush, or a
    /// capture source that constructs its own `Event`). `candidate`'s own
    /// sequence is ignored and overwritten. This is what sampled/debounced
    /// events flush through, so a cap eviction still goes through the
    /// full merge/dehydrate/evict pipeline rather than skipping it.
    pub fn record_candidate(&self, candidate: Event) -> ActionTraceResult<Option<Sequence>> {
        if self.is_quarantined() {
            return Err(ActionTraceError::invariant("event store is quarantined"));
        }

        let (bypass, min_importance, merging_enabled, merge_window_ms, hot_event_count, max_events) = {
            let settings = self.settings.read().unwrap();
            if settings.filtering.disabled_event_types.contains(candidate.event_type()) {
                return Ok(None);
            }
            (
                settings.filtering.bypass_importance_filter,
                settings.filtering.min_importance_for_recording,
                settings.merging.enable_event_merging,
                settings.merging.merge_window_ms,
                settings.storage.hot_event_count,
                settings.storage.max_events,
            )
        };

        let score = actiontrace_semantic::score(&candidate);
        if !bypass && score <= min_importance {
            return Ok(None);
        }

        let previous = self.sequence_counter.fetch_add(1, Ordering::SeqCst);
        let Some(sequence) = previous.checked_add(1) else {
            return Err(self.quarantine("sequence counter overflow"));
        };

        let mut state = self.state.write().unwrap();

        if merging_enabled {
            if let Some(existing_sequence) =
                state.try_merge(&candidate, merge_window_ms, &self.merge_policies)
            {
                state.dirty = true;
                return Ok(Some(existing_sequence));
            }
        }

        let sequenced = candidate.with_sequence(sequence);
        state.append(sequenced.clone());
        state.maybe_dehydrate(hot_event_count, actiontrace_semantic::summarize);
        state.maybe_evict(max_events);
        state.enforce_context_mapping_cap(max_events);
        drop(state);

        self.notifications.enqueue(sequenced);
        Ok(Some(sequence))
    }

    /// Newest-first, optionally filtered to sequences strictly greater
    /// than `since_sequence`, truncated to `limit`.
    pub fn query(&self, limit: usize, since_sequence: Option<Sequence>) -> Vec<Event> {
        let state = self.state.read().unwrap();
        let mut events: Vec<Event> = match since_sequence {
            Some(since) => state.events.iter().filter(|e| e.sequence() > since).cloned().collect(),
            None => state.events.clone(),
        };
        events.sort_by(|a, b| b.sequence().cmp(&a.sequence()));
        events.truncate(limit);
        events
    }

    pub fn query_all(&self) -> Vec<Event> {
        let state = self.state.read().unwrap();
        let mut events = state.events.clone();
        events.sort_by(|a, b| b.sequence().cmp(&a.sequence()));
        events
    }

    /// Pairs each matching event with every context mapping that
    /// references it; events with no mapping yield one pair with `None`.
    /// Projection happens on a cloned snapshot, outside the lock.
    pub fn query_with_context(&self, limit: usize, since_sequence: Option<Sequence>) -> Vec<EventWithContext> {
        let events = self.query(limit, since_sequence);
        let mappings = {
            let state = self.state.read().unwrap();
            state.context_mappings.clone()
        };

        let mut rows = Vec::new();
        for event in events {
            let matching: Vec<ContextMapping> = mappings
                .iter()
                .filter(|m| m.event_sequence() == event.sequence())
                .cloned()
                .collect();

            if matching.is_empty() {
                rows.push(EventWithContext { event, context: None });
            } else {
                for mapping in matching {
                    rows.push(EventWithContext {
                        event: event.clone(),
                        context: Some(mapping),
                    });
                }
            }
        }
        rows
    }

    /// Reject duplicates by `(event_sequence, context_id)`, idempotently.
    /// Returns whether the mapping was newly added.
    pub fn add_context_mapping(&self, mapping: ContextMapping) -> bool {
        let max_events = self.settings.read().unwrap().storage.max_events;
        let mut state = self.state.write().unwrap();

        if state.context_mappings.iter().any(|m| m.key() == mapping.key()) {
            return false;
        }

        state.context_mappings.push(mapping);
        state.enforce_context_mapping_cap(max_events);
        true
    }

    pub fn remove_context_mappings(&self, context_id: actiontrace_core::ContextId) {
        let mut state = self.state.write().unwrap();
        state.context_mappings.retain(|m| m.context_id() != context_id);
    }

    /// Atomic wipe of events, mappings, sequence counter, and pending
    /// notifications.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.clear();
        self.sequence_counter.store(0, Ordering::SeqCst);
        self.notifications.clear();
    }

    pub fn count(&self) -> usize {
        self.state.read().unwrap().events.len()
    }

    pub fn current_sequence(&self) -> Sequence {
        self.sequence_counter.load(Ordering::SeqCst)
    }

    pub fn context_mapping_count(&self) -> usize {
        self.state.read().unwrap().context_mappings.len()
    }

    pub fn memory_diagnostics(&self) -> MemoryDiagnostics {
        let state = self.state.read().unwrap();
        let hot_count = state.events.iter().filter(|e| e.payload().is_some()).count();
        let cold_count = state.events.len() - hot_count;
        MemoryDiagnostics::new(hot_count, cold_count)
    }

    /// A consistent snapshot of everything a persisted document needs,
    /// in storage (append) order. Taken under the same short read lock
    /// every other reader uses; serialization happens outside it.
    pub fn snapshot_parts(&self) -> (Sequence, Vec<Event>, Vec<ContextMapping>) {
        let state = self.state.read().unwrap();
        (
            self.sequence_counter.load(Ordering::SeqCst),
            state.events.clone(),
            state.context_mappings.clone(),
        )
    }

    pub fn subscribe(&self) -> Subscription<Event> {
        self.notifications.subscribe()
    }

    pub fn drain_notifications(&self) {
        self.notifications.drain();
    }

    pub fn replace_settings(&self, settings: Settings) {
        if let Err(issues) = validate_or_warn(&settings) {
            warn!(?issues, "replacing settings with values that fail validation");
        }
        *self.settings.write().unwrap() = settings;
    }

    pub fn settings_snapshot(&self) -> Settings {
        self.settings.read().unwrap().clone()
    }

    /// For a host to build a fresh `StoreState` from a loaded snapshot;
    /// used once at startup, before any concurrent access begins.
    pub fn restore_from_parts(
        &self,
        sequence_counter: Sequence,
        events: Vec<Event>,
        context_mappings: Vec<ContextMapping>,
    ) {
        let mut state = self.state.write().unwrap();
        state.events = events;
        state.context_mappings = context_mappings;
        state.last_recorded_index = state.events.len().checked_sub(1);
        state.dehydration_marker = state.events.len();
        state.dirty = false;
        self.sequence_counter.store(sequence_counter, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.state.read().unwrap().dirty
    }

    pub fn mark_clean(&self) {
        self.state.write().unwrap().dirty = false;
    }
}

fn validate_or_warn(settings: &Settings) -> Result<(), Vec<actiontrace_settings::ValidationIssue>> {
    let issues = settings.validate();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
