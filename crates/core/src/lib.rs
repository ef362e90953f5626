//! Shared primitives for the ActionTrace workspace: identity, errors, and
//! the sanitized payload representation events are built from.

mod clock;
mod context_id;
mod error;
mod payload;
mod target_id;

pub use clock::{Clock, SystemClock};
pub use context_id::ContextId;
pub use error::{ActionTraceError, ActionTraceResult};
pub use payload::{sanitize_payload, Payload, PayloadValue, MAX_COLLECTION_LEN, MAX_DEPTH, MAX_STRING_LEN};
pub use target_id::{TargetId, TargetIdKind};

/// Monotone, process-lifetime-unique position assigned at successful
/// record-time. The canonical ordering key for everything in the store.
///
/// Kept as a bare `u64` (not a newtype) because it is compared and sorted
/// constantly in hot paths; `0` is reserved and never assigned (sequence
/// numbers start at 1).
pub type Sequence = u64;
