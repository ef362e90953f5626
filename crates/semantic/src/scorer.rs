//! Scorer: a deterministic, pure mapping from event to importance.

use actiontrace_events::Event;

/// Coarse bucket derived from a score, via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImportanceCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportanceCategory {
    pub fn from_score(score: f64) -> Self {
        if score < 0.25 {
            ImportanceCategory::Low
        } else if score < 0.5 {
            ImportanceCategory::Medium
        } else if score < 0.75 {
            ImportanceCategory::High
        } else {
            ImportanceCategory::Critical
        }
    }
}

/// Base importance per event type; unknown types fall back to a modest
/// default rather than zero, since an unrecognized type is more likely a
/// new capture point than noise.
fn base_importance(event_type: &str) -> f64 {
    match event_type {
        "BuildStarted" | "BuildCompleted" | "BuildFailed" | "CompilationFailed" => 0.9,
        "CompilationStarted" | "CompilationCompleted" | "SceneOpened" | "SceneSaved" => 0.7,
        "HierarchyChanged" | "PropertyModified" | "AssetImported" | "AssetDeleted" => 0.4,
        "SelectionChanged" => 0.15,
        _ => 0.3,
    }
}

/// Map an event to an importance score in `[0, 1]`. Pure and
/// deterministic: the same event always produces the same score.
pub fn score(event: &Event) -> f64 {
    let mut value = base_importance(event.event_type());

    if event.event_type().ends_with("Failed") {
        value = (value + 0.15).min(1.0);
    }

    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;

    fn event(event_type: &str) -> Event {
        Event::candidate(event_type, TargetId::instance(1), &serde_json::json!({}), 0)
    }

    #[test]
    fn score_is_deterministic() {
        let e = event("PropertyModified");
        assert_eq!(score(&e), score(&e));
    }

    #[test]
    fn failures_score_higher_than_their_base() {
        let base = base_importance("CompilationFailed");
        assert!(score(&event("CompilationFailed")) >= base);
    }

    #[test]
    fn category_thresholds() {
        assert_eq!(ImportanceCategory::from_score(0.0), ImportanceCategory::Low);
        assert_eq!(ImportanceCategory::from_score(0.25), ImportanceCategory::Medium);
        assert_eq!(ImportanceCategory::from_score(0.5), ImportanceCategory::High);
        assert_eq!(ImportanceCategory::from_score(0.75), ImportanceCategory::Critical);
    }
}
