//! Fatal store conditions. A fatal error puts the store into read-only
//! quarantine rather than risk silently corrupting further state.

pub use actiontrace_core::{ActionTraceError, ActionTraceResult};
