//! The persisted snapshot document and its atomic filesystem store.

mod error;
mod snapshot;
mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use snapshot::{SnapshotDocument, CURRENT_SCHEMA_VERSION};
pub use store::{FileSnapshotStore, SnapshotStore};
