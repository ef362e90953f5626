//! ActionTrace: the process-wide composition root. Wires the Capture
//! Pipeline, Event Store, Identity Layer, and Persistence together
//! behind one handle, and runs the two periodic background jobs: the
//! sampling flusher and the deferred-save scheduler.

mod capture_points;
mod error;
mod facade;
mod notification_drain;
mod save_scheduler;
mod sink;

pub use error::{ActionTraceError, ActionTraceResult};
pub use facade::{ActionTrace, MIN_SAVE_INTERVAL_MS};
pub use notification_drain::NotificationDrainHandle;
pub use save_scheduler::SaveSchedulerHandle;

/// Re-exported so a host only needs this one crate for the common path.
pub use actiontrace_core::{Clock, ContextId, Sequence, SystemClock, TargetId};
pub use actiontrace_events::{ContextMapping, Event, Subscription};
pub use actiontrace_query::{ActionTraceViewItem, ImportanceThreshold, SortMode};
pub use actiontrace_settings::{Preset, Settings};
pub use actiontrace_store::EventWithContext;
