//! Deferred-save-drain coalescing: a dirty store doesn't write to disk on
//! every record, but a pending save is never silently dropped either.
//! Uses the same shutdown-channel-plus-join background-thread idiom as
//! the sampling flusher.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::error;

use actiontrace_core::Clock;
use actiontrace_events::Event;
use actiontrace_persistence::{SnapshotDocument, SnapshotStore};
use actiontrace_store::EventStore;

/// How long to idle between requests; any `request_save` wakes the
/// thread immediately via the channel, so this only bounds how long a
/// shutdown might have to wait to notice nothing is pending.
const IDLE_WAIT: Duration = Duration::from_secs(3600);

enum SchedulerMessage {
    RequestSave,
    Shutdown,
}

pub struct SaveSchedulerHandle {
    sender: mpsc::Sender<SchedulerMessage>,
    join: Option<thread::JoinHandle<()>>,
}

impl SaveSchedulerHandle {
    /// Mark the store dirty and ask for a save at the next opportunity.
    /// Non-blocking; throttling happens on the background thread.
    pub fn request_save(&self) {
        let _ = self.sender.send(SchedulerMessage::RequestSave);
    }

    /// Request shutdown; a still-pending save is flushed before the
    /// thread exits.
    pub fn shutdown(mut self) {
        let _ = self.sender.send(SchedulerMessage::Shutdown);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn the background thread that coalesces save requests with a
/// `min_save_interval_ms` throttle, retrying at `min(remaining, 500)` ms
/// rather than dropping a pending request.
pub fn spawn<C: Clock + 'static>(
    store: Arc<EventStore<C>>,
    snapshot_store: Arc<dyn SnapshotStore>,
    clock: Arc<C>,
    min_save_interval_ms: i64,
) -> SaveSchedulerHandle {
    let (tx, rx) = mpsc::channel();

    let join = thread::Builder::new()
        .name("actiontrace-save-scheduler".to_string())
        .spawn(move || scheduler_loop(store, snapshot_store, clock, rx, min_save_interval_ms))
        .expect("failed to spawn save scheduler thread");

    SaveSchedulerHandle {
        sender: tx,
        join: Some(join),
    }
}

fn scheduler_loop<C: Clock>(
    store: Arc<EventStore<C>>,
    snapshot_store: Arc<dyn SnapshotStore>,
    clock: Arc<C>,
    rx: mpsc::Receiver<SchedulerMessage>,
    min_save_interval_ms: i64,
) {
    let mut pending = false;
    let mut last_saved_ms: Option<i64> = None;

    loop {
        let wait = next_wait(pending, last_saved_ms, clock.now_ms(), min_save_interval_ms);

        match rx.recv_timeout(wait) {
            Ok(SchedulerMessage::RequestSave) => pending = true,
            Ok(SchedulerMessage::Shutdown) => {
                if pending || store.is_dirty() {
                    perform_save(&store, snapshot_store.as_ref());
                }
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if pending && due(last_saved_ms, clock.now_ms(), min_save_interval_ms) {
                    perform_save(&store, snapshot_store.as_ref());
                    pending = false;
                    last_saved_ms = Some(clock.now_ms());
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn due(last_saved_ms: Option<i64>, now: i64, min_save_interval_ms: i64) -> bool {
    match last_saved_ms {
        Some(last) => now - last >= min_save_interval_ms,
        None => true,
    }
}

fn next_wait(pending: bool, last_saved_ms: Option<i64>, now: i64, min_save_interval_ms: i64) -> Duration {
    if !pending {
        return IDLE_WAIT;
    }
    if due(last_saved_ms, now, min_save_interval_ms) {
        return Duration::from_millis(0);
    }
    let remaining = min_save_interval_ms - last_saved_ms.map(|last| now - last).unwrap_or(0);
    Duration::from_millis(remaining.clamp(0, 500) as u64)
}

/// Serialize under the store's read lock, write outside it. Failures are
/// logged and never propagated; the dirty flag is only cleared on
/// success, so the next tick retries.
fn perform_save<C: Clock>(store: &EventStore<C>, snapshot_store: &dyn SnapshotStore) {
    let (sequence_counter, events, context_mappings): (_, Vec<Event>, _) = store.snapshot_parts();
    let document = SnapshotDocument::new(sequence_counter, events, context_mappings);

    match snapshot_store.save(&document) {
        Ok(()) => store.mark_clean(),
        Err(error) => error!(%error, "deferred save failed; will retry on next tick"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_immediately_due() {
        assert!(due(None, 0, 1000));
    }

    #[test]
    fn second_request_within_window_is_throttled() {
        assert!(!due(Some(0), 500, 1000));
        assert!(due(Some(0), 1000, 1000));
    }

    #[test]
    fn retry_wait_is_capped_at_500ms() {
        let wait = next_wait(true, Some(0), 100, 1000);
        assert_eq!(wait, Duration::from_millis(500));
    }

    #[test]
    fn retry_wait_shrinks_as_deadline_approaches() {
        let wait = next_wait(true, Some(0), 800, 1000);
        assert_eq!(wait, Duration::from_millis(200));
    }

    #[test]
    fn idle_with_nothing_pending_waits_long() {
        assert_eq!(next_wait(false, None, 0, 1000), IDLE_WAIT);
    }
}
