//! `ActionTraceViewItem`: the projected, read-only shape a UI or AI
//! consumer actually renders.

use actiontrace_core::{Sequence, TargetId};
use actiontrace_events::{ContextMapping, Event};
use actiontrace_semantic::{score, summarize, ImportanceCategory};

#[derive(Debug, Clone)]
pub struct ActionTraceViewItem {
    pub sequence: Sequence,
    pub display_time_ms: i64,
    pub display_summary: String,
    pub importance_score: f64,
    pub importance_category: ImportanceCategory,
    pub context: Option<ContextMapping>,
    pub target_name: Option<String>,
    pub target_instance_id: Option<i64>,
    pub inferred_intent: Option<String>,
}

/// Parse the numeric instance id out of an `Instance:<n>` target id, the
/// only grammar variant that carries one.
fn instance_id_of(target_id: &TargetId) -> Option<i64> {
    target_id.as_str().strip_prefix("Instance:").and_then(|n| n.parse().ok())
}

fn inferred_intent_of(context: Option<&ContextMapping>) -> Option<String> {
    context
        .and_then(|c| c.attributes().get("intent"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Build one view item from an event and its (optional) context mapping.
/// `resolve_name` is an injected lookup (typically backed by the
/// identity tracker's live/destroyed caches) so this crate never needs
/// to depend on the identity layer directly.
pub fn build_view_item(
    event: &Event,
    context: Option<ContextMapping>,
    resolve_name: &dyn Fn(&TargetId) -> Option<String>,
) -> ActionTraceViewItem {
    let display_summary = event
        .precomputed_summary()
        .map(str::to_string)
        .unwrap_or_else(|| summarize(event));
    let importance_score = score(event);

    ActionTraceViewItem {
        sequence: event.sequence(),
        display_time_ms: event.timestamp_ms(),
        display_summary,
        importance_score,
        importance_category: ImportanceCategory::from_score(importance_score),
        target_name: resolve_name(event.target_id()),
        target_instance_id: instance_id_of(event.target_id()),
        inferred_intent: inferred_intent_of(context.as_ref()),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_precomputed_summary_when_present() {
        let mut event = Event::candidate("Test", TargetId::instance(1), &serde_json::json!({}), 0)
            .with_sequence(1);
        event.dehydrate_with("cached summary");

        let item = build_view_item(&event, None, &|_| None);
        assert_eq!(item.display_summary, "cached summary");
    }

    #[test]
    fn extracts_instance_id_only_for_instance_grammar() {
        let instance_event =
            Event::candidate("Test", TargetId::instance(42), &serde_json::json!({}), 0);
        assert_eq!(
            build_view_item(&instance_event, None, &|_| None).target_instance_id,
            Some(42)
        );

        let goid_event = Event::candidate("Test", TargetId::goid("G-1"), &serde_json::json!({}), 0);
        assert_eq!(build_view_item(&goid_event, None, &|_| None).target_instance_id, None);
    }

    #[test]
    fn inferred_intent_reads_context_attribute() {
        use actiontrace_core::PayloadValue;
        use std::collections::BTreeMap;

        let mut attrs = BTreeMap::new();
        attrs.insert("intent".to_string(), PayloadValue::String("debug-session".to_string()));
        let mapping = ContextMapping::new(1, Default::default(), attrs);

        let event = Event::candidate("Test", TargetId::instance(1), &serde_json::json!({}), 0).with_sequence(1);
        let item = build_view_item(&event, Some(mapping), &|_| None);
        assert_eq!(item.inferred_intent.as_deref(), Some("debug-session"));
    }
}
