//! Named, canned configurations that populate the three settings groups
//! in one step.

use std::collections::HashSet;

use crate::groups::{FilteringSettings, MergingSettings, StorageSettings};

/// One preset's three settings groups, without the `current_preset` stamp
/// (that's applied by [`crate::Settings::apply_preset`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDefinition {
    pub filtering: FilteringSettings,
    pub merging: MergingSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Everything is recorded, nothing merged — for diagnosing the
    /// pipeline itself.
    DebugAll,
    /// Balanced defaults; what a fresh install ships with.
    Standard,
    /// Aggressive merging and a small ring, for memory-constrained hosts.
    Lean,
    /// Tuned for a context-limited AI consumer: higher importance floor,
    /// shorter transaction window so tool-call boundaries stay granular.
    AIFocused,
    /// Minimal merge window, large hot tail — favors freshness over
    /// aggregation for a live-viewing UI.
    Realtime,
    /// Smallest footprint: small ring, small hot tail, merging maximized.
    Performance,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::DebugAll => "DebugAll",
            Preset::Standard => "Standard",
            Preset::Lean => "Lean",
            Preset::AIFocused => "AIFocused",
            Preset::Realtime => "Realtime",
            Preset::Performance => "Performance",
        }
    }

    pub fn definition(&self) -> PresetDefinition {
        match self {
            Preset::DebugAll => PresetDefinition {
                filtering: FilteringSettings {
                    min_importance_for_recording: 0.0,
                    bypass_importance_filter: true,
                    disabled_event_types: HashSet::new(),
                },
                merging: MergingSettings {
                    enable_event_merging: false,
                    merge_window_ms: 0,
                    transaction_window_ms: 2000,
                },
                storage: StorageSettings {
                    max_events: 5000,
                    hot_event_count: 1000,
                },
            },
            Preset::Standard => PresetDefinition {
                filtering: FilteringSettings::default(),
                merging: MergingSettings::default(),
                storage: StorageSettings::default(),
            },
            Preset::Lean => PresetDefinition {
                filtering: FilteringSettings {
                    min_importance_for_recording: 0.3,
                    bypass_importance_filter: false,
                    disabled_event_types: HashSet::new(),
                },
                merging: MergingSettings {
                    enable_event_merging: true,
                    merge_window_ms: 500,
                    transaction_window_ms: 3000,
                },
                storage: StorageSettings {
                    max_events: 500,
                    hot_event_count: 50,
                },
            },
            Preset::AIFocused => PresetDefinition {
                filtering: FilteringSettings {
                    min_importance_for_recording: 0.4,
                    bypass_importance_filter: false,
                    disabled_event_types: HashSet::new(),
                },
                merging: MergingSettings {
                    enable_event_merging: true,
                    merge_window_ms: 150,
                    transaction_window_ms: 1200,
                },
                storage: StorageSettings {
                    max_events: 1500,
                    hot_event_count: 150,
                },
            },
            Preset::Realtime => PresetDefinition {
                filtering: FilteringSettings {
                    min_importance_for_recording: 0.05,
                    bypass_importance_filter: false,
                    disabled_event_types: HashSet::new(),
                },
                merging: MergingSettings {
                    enable_event_merging: true,
                    merge_window_ms: 50,
                    transaction_window_ms: 1500,
                },
                storage: StorageSettings {
                    max_events: 3000,
                    hot_event_count: 800,
                },
            },
            Preset::Performance => PresetDefinition {
                filtering: FilteringSettings {
                    min_importance_for_recording: 0.5,
                    bypass_importance_filter: false,
                    disabled_event_types: HashSet::new(),
                },
                merging: MergingSettings {
                    enable_event_merging: true,
                    merge_window_ms: 1000,
                    transaction_window_ms: 5000,
                },
                storage: StorageSettings {
                    max_events: 300,
                    hot_event_count: 30,
                },
            },
        }
    }

    pub const ALL: [Preset; 6] = [
        Preset::DebugAll,
        Preset::Standard,
        Preset::Lean,
        Preset::AIFocused,
        Preset::Realtime,
        Preset::Performance,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_produces_valid_settings() {
        for preset in Preset::ALL {
            let mut settings = crate::Settings::default();
            settings.apply_preset(preset);
            assert!(
                settings.is_valid(),
                "preset {:?} produced invalid settings: {:?}",
                preset,
                settings.validate()
            );
            assert_eq!(settings.current_preset.as_deref(), Some(preset.name()));
        }
    }
}
