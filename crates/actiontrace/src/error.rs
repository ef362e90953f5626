//! Facade-level errors. A failed snapshot load at startup is logged and
//! treated as "start empty" rather than surfaced here, so the store's own
//! `ActionTraceError` is the only error type this crate needs to re-export.

pub use actiontrace_core::{ActionTraceError, ActionTraceResult};
