//! Drains the store's pending `EventRecorded` notifications onto the bus
//! on a fixed tick, so a live subscriber sees one callback per recorded
//! event in insertion order instead of waiting for the pending queue to
//! hit its backpressure cap. Same shutdown-channel-plus-join idiom as
//! the sampling flusher and the save scheduler.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use actiontrace_core::Clock;
use actiontrace_store::EventStore;

const DRAIN_TICK: Duration = Duration::from_millis(200);

pub struct NotificationDrainHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl NotificationDrainHandle {
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn the 200ms-tick background drain.
pub fn spawn<C: Clock + 'static>(store: Arc<EventStore<C>>) -> NotificationDrainHandle {
    let (tx, rx) = mpsc::channel::<()>();

    let join = thread::Builder::new()
        .name("actiontrace-notification-drain".to_string())
        .spawn(move || loop {
            if rx.recv_timeout(DRAIN_TICK).is_ok() {
                break;
            }
            store.drain_notifications();
        })
        .expect("failed to spawn notification drain thread");

    NotificationDrainHandle {
        shutdown: tx,
        join: Some(join),
    }
}
