//! Sampling Middleware: the pending-sample map and its periodic flusher
//! thread. Called synchronously before a record attempt; returns whether
//! the caller should record the event now.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, warn};

use actiontrace_core::Clock;
use actiontrace_events::Event;

use crate::sampling_config::{SamplingConfig, SamplingStrategy};

const MAX_PENDING_ENTRIES: usize = 128;
const FLUSH_TICK: Duration = Duration::from_millis(200);

/// Anything that can accept a directly-flushed pending event. Implemented
/// by the event store; kept as a trait here so this crate never depends
/// on the store crate.
pub trait EventSink: Send + Sync {
    fn record_flushed(&self, event: Event);
}

struct PendingEntry {
    inserted_at_ms: i64,
    strategy: SamplingStrategy,
    /// Present for Debounce/DebounceByKey (the event to flush later);
    /// `None` for Throttle, which only needs a window marker.
    event: Option<Event>,
}

/// Runtime stats for observability, mirroring the store's own diagnostic
/// counters.
#[derive(Debug, Default)]
pub struct SamplingStats {
    pub suppressed: AtomicU64,
    pub flushed: AtomicU64,
    pub evicted_recorded: AtomicU64,
    pub evicted_discarded: AtomicU64,
}

/// Decides, per incoming event, whether to record now or suppress/defer
/// it, consulting and mutating the shared pending-sample map.
pub struct SamplingMiddleware<C: Clock> {
    config: Arc<SamplingConfig>,
    pending: Arc<DashMap<String, PendingEntry>>,
    clock: Arc<C>,
    stats: Arc<SamplingStats>,
    /// Attached once the facade has a store to flush into. Until then,
    /// a cap eviction of a debounce entry is discarded with a warning
    /// rather than recorded — this only happens during startup, before
    /// 128 distinct sampling keys could plausibly have accumulated.
    sink: std::sync::RwLock<Option<Arc<dyn EventSink>>>,
}

impl<C: Clock + 'static> SamplingMiddleware<C> {
    pub fn new(config: Arc<SamplingConfig>, clock: Arc<C>) -> Self {
        Self {
            config,
            pending: Arc::new(DashMap::new()),
            clock,
            stats: Arc::new(SamplingStats::default()),
            sink: std::sync::RwLock::new(None),
        }
    }

    pub fn attach_sink(&self, sink: Arc<dyn EventSink>) {
        *self.sink.write().unwrap() = Some(sink);
    }

    pub fn stats(&self) -> &SamplingStats {
        &self.stats
    }

    fn sampling_key(event: &Event, strategy: &SamplingStrategy) -> String {
        match strategy {
            SamplingStrategy::DebounceByKey { .. } => {
                format!("{}:{}", event.event_type(), event.target_id())
            }
            _ => event.event_type().to_string(),
        }
    }

    /// Decide whether `event` should be recorded immediately.
    pub fn should_record(&self, event: &Event) -> bool {
        let strategy = self.config.strategy_for(event.event_type());
        let now = self.clock.now_ms();

        let decision = match strategy {
            SamplingStrategy::None => true,
            SamplingStrategy::Throttle { window_ms } => {
                let key = Self::sampling_key(event, &strategy);
                let first_in_window = match self.pending.get(&key) {
                    Some(entry) => (now - entry.inserted_at_ms) as u64 >= window_ms,
                    None => true,
                };
                if first_in_window {
                    self.pending.insert(
                        key,
                        PendingEntry {
                            inserted_at_ms: now,
                            strategy,
                            event: None,
                        },
                    );
                    true
                } else {
                    self.stats.suppressed.fetch_add(1, Ordering::Relaxed);
                    false
                }
            }
            SamplingStrategy::Debounce { .. } | SamplingStrategy::DebounceByKey { .. } => {
                let key = Self::sampling_key(event, &strategy);
                self.pending.insert(
                    key,
                    PendingEntry {
                        inserted_at_ms: now,
                        strategy,
                        event: Some(event.clone()),
                    },
                );
                self.stats.suppressed.fetch_add(1, Ordering::Relaxed);
                false
            }
        };

        self.enforce_cap(now);
        decision
    }

    /// Evict oldest-first once the pending map exceeds its cap. Debounce
    /// entries carrying a pending event are recorded rather than
    /// discarded; throttle markers are removed cleanly.
    fn enforce_cap(&self, _now: i64) {
        while self.pending.len() > MAX_PENDING_ENTRIES {
            let oldest_key = self
                .pending
                .iter()
                .min_by_key(|e| e.inserted_at_ms)
                .map(|e| e.key().clone());
            let Some(key) = oldest_key else { break };
            if let Some((_, entry)) = self.pending.remove(&key) {
                if let Some(event) = entry.event {
                    match self.sink.read().unwrap().as_ref() {
                        Some(sink) => {
                            self.stats.evicted_recorded.fetch_add(1, Ordering::Relaxed);
                            warn!(key = %key, "pending sample evicted at cache cap, recording to avoid data loss");
                            sink.record_flushed(event);
                        }
                        None => {
                            self.stats.evicted_discarded.fetch_add(1, Ordering::Relaxed);
                            warn!(key = %key, "pending sample evicted at cache cap with no sink attached, discarding");
                        }
                    }
                } else {
                    self.stats.evicted_discarded.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Scan the pending map once, flushing any entry whose age has
    /// exceeded its strategy's window (or the cleanup grace period for
    /// stragglers) directly to `sink`.
    pub fn flush_due(&self, sink: &dyn EventSink) {
        let now = self.clock.now_ms();
        let mut to_remove = Vec::new();

        for entry in self.pending.iter() {
            let age = (now - entry.inserted_at_ms).max(0) as u64;
            let window_ms = entry.strategy.window_ms().unwrap_or(0);
            let cleanup_threshold = cleanup_threshold_ms(&entry.strategy);

            if age >= window_ms.max(1) || age >= cleanup_threshold {
                to_remove.push(entry.key().clone());
            }
        }

        for key in to_remove {
            if let Some((_, entry)) = self.pending.remove(&key) {
                if let Some(event) = entry.event {
                    self.stats.flushed.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "flushing pending sample");
                    sink.record_flushed(event);
                }
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Cleanup grace period, a safety margin above the flusher's own window
/// check: `2 * window_ms` for debounce modes, `max(window_ms, 2000)` for
/// throttle, `2000` for anything without a window.
fn cleanup_threshold_ms(strategy: &SamplingStrategy) -> u64 {
    match strategy {
        SamplingStrategy::Debounce { window_ms } | SamplingStrategy::DebounceByKey { window_ms } => {
            2 * window_ms
        }
        SamplingStrategy::Throttle { window_ms } => (*window_ms).max(2000),
        SamplingStrategy::None => 2000,
    }
}

/// Handle to a background flusher thread, mirroring the
/// shutdown-channel-plus-join idiom used elsewhere in this workspace for
/// backgrounded work.
pub struct FlusherHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl FlusherHandle {
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Spawn the 200ms-tick background flusher. `sink` is cloned into the
/// thread via `Arc`.
pub fn spawn_flusher<C: Clock + 'static>(
    middleware: Arc<SamplingMiddleware<C>>,
    sink: Arc<dyn EventSink>,
) -> FlusherHandle {
    let (tx, rx) = mpsc::channel::<()>();

    let join = thread::Builder::new()
        .name("actiontrace-sampling-flusher".to_string())
        .spawn(move || loop {
            if rx.recv_timeout(FLUSH_TICK).is_ok() {
                break;
            }
            middleware.flush_due(sink.as_ref());
        })
        .expect("failed to spawn sampling flusher thread");

    FlusherHandle {
        shutdown: tx,
        join: Some(join),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use std::sync::Mutex;

    struct FixedClock(std::sync::atomic::AtomicI64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl FixedClock {
        fn new(ms: i64) -> Self {
            Self(std::sync::atomic::AtomicI64::new(ms))
        }

        fn advance(&self, delta: i64) {
            self.0.fetch_add(delta, Ordering::SeqCst);
        }
    }

    struct RecordingSink(Mutex<Vec<Event>>);

    impl EventSink for RecordingSink {
        fn record_flushed(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn event(event_type: &str) -> Event {
        Event::candidate(event_type, TargetId::instance(1), &serde_json::json!({}), 0)
    }

    #[test]
    fn none_strategy_always_records() {
        let config = Arc::new(SamplingConfig::with_defaults());
        let clock = Arc::new(FixedClock::new(0));
        let middleware = SamplingMiddleware::new(config, clock);
        assert!(middleware.should_record(&event("Unconfigured")));
        assert!(middleware.should_record(&event("Unconfigured")));
    }

    #[test]
    fn throttle_records_first_then_drops_until_window_elapses() {
        let config = Arc::new(SamplingConfig::with_defaults());
        let clock = Arc::new(FixedClock::new(0));
        let middleware = SamplingMiddleware::new(config, clock.clone());

        assert!(middleware.should_record(&event("HierarchyChanged")));
        assert!(!middleware.should_record(&event("HierarchyChanged")));

        clock.advance(1000);
        assert!(middleware.should_record(&event("HierarchyChanged")));
    }

    #[test]
    fn debounce_never_records_directly_and_flushes_via_sink() {
        let config = Arc::new(SamplingConfig::with_defaults());
        let clock = Arc::new(FixedClock::new(0));
        let middleware = Arc::new(SamplingMiddleware::new(config, clock.clone()));
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));

        assert!(!middleware.should_record(&event("PropertyModified")));
        assert_eq!(middleware.pending_count(), 1);

        clock.advance(250);
        middleware.flush_due(sink.as_ref());

        assert_eq!(middleware.pending_count(), 0);
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn debounce_by_key_replaces_pending_until_flush() {
        let config = Arc::new(SamplingConfig::with_defaults());
        let clock = Arc::new(FixedClock::new(0));
        let middleware = Arc::new(SamplingMiddleware::new(config, clock.clone()));
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));

        for _ in 0..5 {
            assert!(!middleware.should_record(&event("PropertyModified")));
        }
        assert_eq!(middleware.pending_count(), 1);

        clock.advance(250);
        middleware.flush_due(sink.as_ref());
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }
}
