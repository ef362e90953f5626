//! The aggregate `Settings` value and its validation.

use serde::{Deserialize, Serialize};

use crate::groups::{FilteringSettings, MergingSettings, StorageSettings, ValidationIssue};

/// Singleton-scoped persistent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub filtering: FilteringSettings,
    pub merging: MergingSettings,
    pub storage: StorageSettings,
    /// Name of the preset last applied, if any. Informational only; editing
    /// a group directly after applying a preset does not clear this.
    pub current_preset: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filtering: FilteringSettings::default(),
            merging: MergingSettings::default(),
            storage: StorageSettings::default(),
            current_preset: None,
        }
    }
}

impl Settings {
    /// Replace all three groups and stamp the preset name. Marking the
    /// store dirty and scheduling a save is the caller's concern, typically
    /// the facade.
    pub fn apply_preset(&mut self, preset: crate::Preset) {
        let definition = preset.definition();
        self.filtering = definition.filtering;
        self.merging = definition.merging;
        self.storage = definition.storage;
        self.current_preset = Some(preset.name().to_string());
    }

    /// Non-fatal validation: collects every user-visible issue rather than
    /// stopping at the first one.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.storage.hot_event_count > self.storage.max_events {
            issues.push(ValidationIssue::HotCountExceedsMax {
                hot_event_count: self.storage.hot_event_count,
                max_events: self.storage.max_events,
            });
        }
        if !(0.0..=1.0).contains(&self.filtering.min_importance_for_recording) {
            issues.push(ValidationIssue::ImportanceOutOfRange {
                value: self.filtering.min_importance_for_recording,
            });
        }
        if !(0..=5000).contains(&self.merging.merge_window_ms) {
            issues.push(ValidationIssue::MergeWindowOutOfRange {
                value: self.merging.merge_window_ms,
            });
        }
        if !(100..=10_000).contains(&self.merging.transaction_window_ms) {
            issues.push(ValidationIssue::TransactionWindowOutOfRange {
                value: self.merging.transaction_window_ms,
            });
        }
        if !(100..=5000).contains(&self.storage.max_events) {
            issues.push(ValidationIssue::MaxEventsOutOfRange {
                value: self.storage.max_events,
            });
        }
        if !(10..=1000).contains(&self.storage.hot_event_count) {
            issues.push(ValidationIssue::HotEventCountOutOfRange {
                value: self.storage.hot_event_count,
            });
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Estimated in-memory footprint: `hot * 300 + cold * 100` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDiagnostics {
    pub hot_count: usize,
    pub cold_count: usize,
}

impl MemoryDiagnostics {
    pub fn new(hot_count: usize, cold_count: usize) -> Self {
        Self { hot_count, cold_count }
    }

    pub fn estimated_bytes(&self) -> usize {
        self.hot_count * 300 + self.cold_count * 100
    }
}

impl core::fmt::Display for MemoryDiagnostics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} hot events, {} cold events, ~{} KB estimated",
            self.hot_count,
            self.cold_count,
            self.estimated_bytes() / 1024
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_hot_exceeding_max() {
        let mut s = Settings::default();
        s.storage.hot_event_count = s.storage.max_events + 1;
        assert!(s
            .validate()
            .iter()
            .any(|i| matches!(i, ValidationIssue::HotCountExceedsMax { .. })));
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(Settings::default().is_valid());
    }

    #[test]
    fn memory_diagnostics_formula() {
        let diag = MemoryDiagnostics::new(10, 20);
        assert_eq!(diag.estimated_bytes(), 10 * 300 + 20 * 100);
    }
}
