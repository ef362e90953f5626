//! The three settings groups — filtering, merging, storage — plus their
//! range invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Controls what gets past the record gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteringSettings {
    /// Events scoring at or below this are rejected at record-time, unless
    /// `bypass_importance_filter` is set. Range `[0, 1]`.
    pub min_importance_for_recording: f64,
    /// When true, the importance gate is skipped entirely (disabled event
    /// types are still enforced).
    pub bypass_importance_filter: bool,
    /// Event types that are hard-rejected regardless of importance.
    pub disabled_event_types: HashSet<String>,
}

impl Default for FilteringSettings {
    fn default() -> Self {
        Self {
            min_importance_for_recording: 0.1,
            bypass_importance_filter: false,
            disabled_event_types: HashSet::new(),
        }
    }
}

/// Controls near-duplicate collapsing and transaction boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergingSettings {
    pub enable_event_merging: bool,
    /// Range `[0, 5000]` ms.
    pub merge_window_ms: u64,
    /// Range `[100, 10000]` ms.
    pub transaction_window_ms: u64,
}

impl Default for MergingSettings {
    fn default() -> Self {
        Self {
            enable_event_merging: true,
            merge_window_ms: 100,
            transaction_window_ms: 2000,
        }
    }
}

/// Controls the store's memory budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Range `[100, 5000]`.
    pub max_events: usize,
    /// Range `[10, 1000]`. Invariant: `hot_event_count <= max_events`.
    pub hot_event_count: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_events: 2000,
            hot_event_count: 200,
        }
    }
}

/// A single flagged configuration problem, surfaced to a user-facing
/// settings UI rather than returned as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    HotCountExceedsMax { hot_event_count: usize, max_events: usize },
    MergeWindowOutOfRange { value: u64 },
    TransactionWindowOutOfRange { value: u64 },
    MaxEventsOutOfRange { value: usize },
    HotEventCountOutOfRange { value: usize },
    ImportanceOutOfRange { value: f64 },
}
