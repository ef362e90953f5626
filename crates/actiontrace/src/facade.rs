//! `ActionTrace`: the single process-wide handle a host embeds. Wires
//! the capture registry, blacklist filter, sampling middleware, event
//! store, identity tracker, and persistence together: the composition
//! root for the whole pipeline.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, warn};

use actiontrace_capture::{
    spawn_flusher, BlacklistFilter, CaptureRegistry, FilterRuleSet, FlusherHandle, SamplingConfig,
    SamplingMiddleware,
};
use actiontrace_core::{ActionTraceResult, Clock, ContextId, Sequence, SystemClock, TargetId};
use actiontrace_events::{ContextMapping, Event, Subscription};
use actiontrace_identity::IdentityTracker;
use actiontrace_persistence::{SnapshotDocument, SnapshotStore};
use actiontrace_query::{self as query, ActionTraceViewItem, SortMode};
use actiontrace_settings::{MemoryDiagnostics, Settings};
use actiontrace_store::{EventStore, EventWithContext};

use crate::capture_points;
use crate::notification_drain::{self, NotificationDrainHandle};
use crate::save_scheduler::{self, SaveSchedulerHandle};
use crate::sink::StoreSink;

/// Sampling flusher ticks at 200ms; deferred saves throttle to at most
/// one per second.
pub const MIN_SAVE_INTERVAL_MS: i64 = 1000;

/// Composition root. Generic over the clock so tests can drive it
/// deterministically; hosts use [`ActionTrace::new`], which wires the
/// real wall clock.
pub struct ActionTrace<C: Clock + 'static = SystemClock> {
    store: Arc<EventStore<C>>,
    capture_registry: Mutex<CaptureRegistry>,
    blacklist: BlacklistFilter,
    sampling: Arc<SamplingMiddleware<C>>,
    identity: RwLock<IdentityTracker>,
    snapshot_store: Arc<dyn SnapshotStore>,
    clock: Arc<C>,
    flusher: Mutex<Option<FlusherHandle>>,
    save_scheduler: Mutex<Option<SaveSchedulerHandle>>,
    notification_drain: Mutex<Option<NotificationDrainHandle>>,
}

impl ActionTrace<SystemClock> {
    /// Load any persisted snapshot from `snapshot_store`, start the
    /// sampling flusher and deferred-save scheduler, and return a ready
    /// handle. The minimum set of capture points is pre-registered
    /// (disabled hooks, since wiring them to an actual host is an
    /// external-collaborator concern); a host registers its own on top.
    pub fn start(settings: Settings, snapshot_store: Arc<dyn SnapshotStore>) -> Self {
        Self::start_with_clock(settings, snapshot_store, Arc::new(SystemClock))
    }
}

impl<C: Clock + 'static> ActionTrace<C> {
    pub fn start_with_clock(settings: Settings, snapshot_store: Arc<dyn SnapshotStore>, clock: Arc<C>) -> Self {
        actiontrace_observability::init();
        let max_events = settings.storage.max_events;
        let store = Arc::new(EventStore::new(settings, clock.clone()));

        match snapshot_store.load() {
            Ok(Some(mut document)) => {
                document.apply_load_time_trim(max_events);
                info!(
                    events = document.events.len(),
                    context_mappings = document.context_mappings.len(),
                    "restoring persisted snapshot"
                );
                store.restore_from_parts(document.sequence_counter, document.events, document.context_mappings);
            }
            Ok(None) => info!("no persisted snapshot found; starting empty"),
            Err(error) => warn!(%error, "failed to load persisted snapshot; starting empty"),
        }

        let sampling = Arc::new(SamplingMiddleware::new(Arc::new(SamplingConfig::with_defaults()), clock.clone()));
        sampling.attach_sink(Arc::new(StoreSink::new(store.clone())));
        let flusher = spawn_flusher(sampling.clone(), Arc::new(StoreSink::new(store.clone())));
        let save_scheduler =
            save_scheduler::spawn(store.clone(), snapshot_store.clone(), clock.clone(), MIN_SAVE_INTERVAL_MS);
        let notification_drain = notification_drain::spawn(store.clone());

        Self {
            store,
            capture_registry: Mutex::new(capture_points::default_registry()),
            blacklist: BlacklistFilter::new(FilterRuleSet::default_rules(), FilterRuleSet::empty(), 1),
            sampling,
            identity: RwLock::new(IdentityTracker::new()),
            snapshot_store,
            clock,
            flusher: Mutex::new(Some(flusher)),
            save_scheduler: Mutex::new(Some(save_scheduler)),
            notification_drain: Mutex::new(Some(notification_drain)),
        }
    }

    /// Ingress entry point: sources supply `(type, target_id, payload)`
    /// and must not block. Flood-prone sources are
    /// expected to have already funneled through sampling via
    /// [`Self::should_record`]; this always performs a direct record.
    pub fn record(&self, event_type: &str, target_id: TargetId, payload: &serde_json::Value) -> ActionTraceResult<Option<Sequence>> {
        let result = self.store.record(event_type, target_id, payload);
        if matches!(result, Ok(Some(_))) {
            self.request_save();
        }
        result
    }

    /// Runs the blacklist and sampling gates before recording. This is
    /// the entry point flood-prone sources (selection/hierarchy/property)
    /// should use; a blacklist rejection or sampling suppression returns
    /// `Ok(None)` without ever reaching the store.
    pub fn capture(
        &self,
        event_type: &str,
        target_id: TargetId,
        path_or_name: Option<&str>,
        payload: &serde_json::Value,
    ) -> ActionTraceResult<Option<Sequence>> {
        if let Some(candidate) = path_or_name {
            if !self.blacklist.allows_path(candidate) && !self.blacklist.allows_name(candidate) {
                return Ok(None);
            }
        }

        let timestamp_ms = self.clock.now_ms();
        let probe = Event::candidate(event_type, target_id.clone(), payload, timestamp_ms);
        if !self.sampling.should_record(&probe) {
            return Ok(None);
        }

        let result = self.store.record_at(event_type, target_id, payload, timestamp_ms);
        if matches!(result, Ok(Some(_))) {
            self.request_save();
        }
        result
    }

    fn request_save(&self) {
        if let Some(handle) = self.save_scheduler.lock().unwrap().as_ref() {
            handle.request_save();
        }
    }

    /// Egress: `Query(limit, since_sequence) -> list[Event]` newest first.
    pub fn query(&self, limit: usize, since_sequence: Option<Sequence>) -> Vec<Event> {
        self.store.query(limit, since_sequence)
    }

    pub fn query_with_context(&self, limit: usize, since_sequence: Option<Sequence>) -> Vec<EventWithContext> {
        self.store.query_with_context(limit, since_sequence)
    }

    pub fn query_all(&self) -> Vec<Event> {
        self.store.query_all()
    }

    /// Projects a query result into view items, resolving target names
    /// through the identity tracker, and applies the requested ordering.
    /// `AIFiltered` drops items below the importance threshold;
    /// `ByTimeDesc` never drops anything.
    pub fn view(&self, limit: usize, since_sequence: Option<Sequence>, sort: SortMode) -> Vec<ActionTraceViewItem> {
        let identity = self.identity.read().unwrap();
        let resolve_name = |target_id: &TargetId| -> Option<String> {
            target_id
                .as_str()
                .strip_prefix("Instance:")
                .and_then(|n| n.parse::<i64>().ok())
                .and_then(|id| identity.display_name(id).map(str::to_string))
        };

        let rows = self.query_with_context(limit, since_sequence);
        let items: Vec<ActionTraceViewItem> = rows
            .into_iter()
            .map(|row| query::build_view_item(&row.event, row.context, &resolve_name))
            .collect();

        query::apply_sort(sort, items)
    }

    pub fn add_context_mapping(&self, mapping: ContextMapping) -> bool {
        self.store.add_context_mapping(mapping)
    }

    pub fn remove_context_mappings(&self, context_id: ContextId) {
        self.store.remove_context_mappings(context_id);
    }

    pub fn subscribe(&self) -> Subscription<Event> {
        self.store.subscribe()
    }

    /// Publish any pending `EventRecorded` notifications to subscribers
    /// right now, rather than waiting for the next background tick. The
    /// background drain already does this every 200ms; call this when a
    /// caller needs the latency guarantee tighter than that, e.g. in a
    /// test.
    pub fn drain_notifications(&self) {
        self.store.drain_notifications();
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn current_sequence(&self) -> Sequence {
        self.store.current_sequence()
    }

    pub fn context_mapping_count(&self) -> usize {
        self.store.context_mapping_count()
    }

    pub fn memory_diagnostics(&self) -> MemoryDiagnostics {
        self.store.memory_diagnostics()
    }

    pub fn is_quarantined(&self) -> bool {
        self.store.is_quarantined()
    }

    pub fn replace_settings(&self, settings: Settings) {
        self.store.replace_settings(settings);
    }

    pub fn settings_snapshot(&self) -> Settings {
        self.store.settings_snapshot()
    }

    /// Track (or refresh) an entity's live identity — call this on every
    /// event a capture source reports so the "will" cache stays warm
    /// before the entity is ever destroyed.
    pub fn observe_identity(&self, instance_id: i64, name: impl Into<String>, target_id: TargetId) {
        self.identity.write().unwrap().observe(instance_id, name, target_id);
    }

    /// Reconcile against the host's current live-instance set, moving
    /// anything no longer alive into the destroyed cache.
    pub fn reconcile_identity(&self, alive_instance_ids: &std::collections::HashSet<i64>) {
        self.identity.write().unwrap().reconcile(alive_instance_ids);
    }

    pub fn capture_registry(&self) -> std::sync::MutexGuard<'_, CaptureRegistry> {
        self.capture_registry.lock().unwrap()
    }

    /// Force an immediate save, bypassing the deferred-save throttle.
    /// Intended for an explicit host "save now" action and for a clean
    /// shutdown, not for the hot ingest path.
    pub fn save_now(&self) -> ActionTraceResult<()> {
        let (sequence_counter, events, context_mappings) = self.store.snapshot_parts();
        let document = SnapshotDocument::new(sequence_counter, events, context_mappings);
        match self.snapshot_store.save(&document) {
            Ok(()) => {
                self.store.mark_clean();
                Ok(())
            }
            Err(error) => {
                warn!(%error, "explicit save failed");
                Ok(())
            }
        }
    }

    /// Graceful shutdown: flush a final save, then stop the background
    /// threads. Consumes `self` since nothing should touch the handle
    /// afterward.
    pub fn shutdown(self) {
        if let Some(handle) = self.save_scheduler.lock().unwrap().take() {
            handle.shutdown();
        }
        if let Some(handle) = self.flusher.lock().unwrap().take() {
            handle.shutdown();
        }
        if let Some(handle) = self.notification_drain.lock().unwrap().take() {
            handle.shutdown();
        }
        self.capture_registry.lock().unwrap().shutdown_all();
        self.store.drain_notifications();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::collections::HashSet;

    struct FixedClock(AtomicI64);

    impl FixedClock {
        fn new(ms: i64) -> Self {
            Self(AtomicI64::new(ms))
        }

        fn advance(&self, delta: i64) {
            self.0.fetch_add(delta, Ordering::SeqCst);
        }
    }

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.filtering.bypass_importance_filter = true;
        settings
    }

    fn snapshot_store(dir: &tempfile::TempDir) -> Arc<dyn SnapshotStore> {
        Arc::new(actiontrace_persistence::FileSnapshotStore::new(dir.path().join("snapshot.json")))
    }

    /// Three `HierarchyChanged@root` events 1000ms apart collapse, via
    /// throttle, to exactly one recorded event at the first timestamp.
    #[test]
    fn throttle_scenario_collapses_a_burst_to_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(0));
        let trace = ActionTrace::start_with_clock(test_settings(), snapshot_store(&dir), clock.clone());

        let root = TargetId::scene("Assets/Main.unity", "Root");
        assert!(trace.capture("HierarchyChanged", root.clone(), None, &serde_json::json!({})).unwrap().is_some());

        clock.advance(100);
        assert!(trace.capture("HierarchyChanged", root.clone(), None, &serde_json::json!({})).unwrap().is_none());

        clock.advance(800);
        assert!(trace.capture("HierarchyChanged", root.clone(), None, &serde_json::json!({})).unwrap().is_none());

        assert_eq!(trace.count(), 1);
        let events = trace.query_all();
        assert_eq!(events[0].timestamp_ms(), 0);

        trace.shutdown();
    }

    /// A destroyed entity's identity still resolves, by name, through
    /// the facade's projection.
    #[test]
    fn identity_will_resolves_through_the_view_projection() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(0));
        let trace = ActionTrace::start_with_clock(test_settings(), snapshot_store(&dir), clock.clone());

        let target = TargetId::goid("G-1");
        trace.observe_identity(42, "Player", target.clone());
        trace.record("ComponentAdded", TargetId::instance(42), &serde_json::json!({})).unwrap();

        trace.reconcile_identity(&HashSet::new());
        trace
            .record("ComponentRemoved", TargetId::instance(42), &serde_json::json!({}))
            .unwrap();

        let view = trace.view(10, None, SortMode::ByTimeDesc);
        let destroyed_event = view
            .iter()
            .find(|item| item.display_summary.contains("ComponentRemoved"))
            .expect("event recorded after destruction should still be present");
        assert_eq!(destroyed_event.target_name.as_deref(), Some("Player"));

        trace.shutdown();
    }

    #[test]
    fn explicit_save_and_reload_round_trips_events() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(0));
        let trace = ActionTrace::start_with_clock(test_settings(), snapshot_store(&dir), clock.clone());

        trace.record("BuildStarted", TargetId::instance(1), &serde_json::json!({})).unwrap();
        trace.save_now().unwrap();
        let sequence_before = trace.current_sequence();
        trace.shutdown();

        let clock = Arc::new(FixedClock::new(0));
        let reloaded = ActionTrace::start_with_clock(test_settings(), snapshot_store(&dir), clock);
        assert_eq!(reloaded.count(), 1);
        assert_eq!(reloaded.current_sequence(), sequence_before);
        reloaded.shutdown();
    }
}
