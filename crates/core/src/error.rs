//! Shared error taxonomy.
//!
//! Kept deliberately small: most crates in this workspace define their own
//! error enum for domain-specific failure modes and only reach for
//! [`ActionTraceError`] at the few seams where a truly fatal condition (one
//! that violates an invariant this crate promises) needs a common type the
//! facade can match on to enter quarantine.

use thiserror::Error;

/// Result type for fallible operations that aren't specific to one crate.
pub type ActionTraceResult<T> = Result<T, ActionTraceError>;

/// Fatal, invariant-violating failures.
///
/// Per spec: "Fatal (violated invariant, e.g. sequence overflow, unreachable
/// default arm): surfaced to the host; the store enters a read-only
/// quarantine state rather than silently corrupting further." Nothing in
/// the ingest or query path should ever propagate one of these to a caller;
/// they are for the facade's internal bookkeeping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionTraceError {
    #[error("sequence counter overflowed")]
    SequenceOverflow,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unreachable state reached: {0}")]
    Unreachable(String),
}

impl ActionTraceError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }
}
