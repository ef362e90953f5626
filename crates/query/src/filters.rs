//! Text search and importance-threshold filtering over view items.

use actiontrace_settings::Settings;

use crate::view_item::ActionTraceViewItem;

/// Case-insensitive substring match over summary, target name, and the
/// underlying event's type is applied by the caller before projection;
/// here it's applied to the already-projected item's summary and name,
/// plus the raw event type passed alongside.
pub fn matches_text(item: &ActionTraceViewItem, event_type: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    item.display_summary.to_lowercase().contains(&query)
        || item
            .target_name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&query))
        || event_type.to_lowercase().contains(&query)
}

/// Importance threshold, including the sentinel that defers to whatever
/// `min_importance_for_recording` is currently configured.
#[derive(Debug, Clone, Copy)]
pub enum ImportanceThreshold {
    Explicit(f64),
    UseSettingsDefault,
}

impl ImportanceThreshold {
    pub fn resolve(&self, settings: &Settings) -> f64 {
        match self {
            ImportanceThreshold::Explicit(value) => *value,
            ImportanceThreshold::UseSettingsDefault => settings.filtering.min_importance_for_recording,
        }
    }
}

pub fn passes_importance(item: &ActionTraceViewItem, threshold: f64) -> bool {
    item.importance_score >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use actiontrace_events::Event;
    use actiontrace_semantic::ImportanceCategory;

    fn item(summary: &str, score: f64) -> ActionTraceViewItem {
        let event = Event::candidate("Test", TargetId::instance(1), &serde_json::json!({}), 0)
            .with_sequence(1);
        ActionTraceViewItem {
            sequence: event.sequence(),
            display_time_ms: event.timestamp_ms(),
            display_summary: summary.to_string(),
            importance_score: score,
            importance_category: ImportanceCategory::from_score(score),
            context: None,
            target_name: None,
            target_instance_id: None,
            inferred_intent: None,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let item = item("anything", 0.1);
        assert!(matches_text(&item, "Test", ""));
    }

    #[test]
    fn text_search_is_case_insensitive() {
        let item = item("Opened Scene Main", 0.1);
        assert!(matches_text(&item, "SceneOpened", "scene"));
        assert!(!matches_text(&item, "SceneOpened", "asset"));
    }

    #[test]
    fn importance_threshold_is_inclusive() {
        let item = item("x", 0.5);
        assert!(passes_importance(&item, 0.5));
        assert!(!passes_importance(&item, 0.51));
    }

    #[test]
    fn settings_default_sentinel_resolves_to_configured_floor() {
        let mut settings = Settings::default();
        settings.filtering.min_importance_for_recording = 0.2;
        assert_eq!(ImportanceThreshold::UseSettingsDefault.resolve(&settings), 0.2);
        assert_eq!(ImportanceThreshold::Explicit(0.9).resolve(&settings), 0.9);
    }
}
