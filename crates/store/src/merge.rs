//! Per-type merge policy: how an eligible incoming event folds into the
//! existing "last recorded" event instead of being appended.

use std::collections::HashMap;

use actiontrace_core::PayloadValue;
use actiontrace_events::Event;

/// Refines how a merge updates the existing event beyond the
/// structural-equality gate (same type, same target, within window) the
/// store itself enforces. Per-type policies let, say, repeated
/// `PropertyModified` edits accumulate a count without the store needing
/// to know about any particular event type.
pub trait MergePolicy: Send + Sync {
    fn merge(&self, existing: &mut Event, incoming: &Event);
}

/// Default policy: adopt the incoming timestamp and payload wholesale,
/// and track how many events were folded into this one under
/// `__merge_count__` so a summary can later say "edited 6 times".
pub struct CountingMergePolicy;

impl MergePolicy for CountingMergePolicy {
    fn merge(&self, existing: &mut Event, incoming: &Event) {
        existing.set_timestamp_ms(incoming.timestamp_ms());

        let mut payload = incoming.payload().cloned().unwrap_or_default();
        let count = existing
            .payload()
            .and_then(|p| p.get("__merge_count__"))
            .and_then(|v| match v {
                PayloadValue::Number(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(1.0);
        payload.insert("__merge_count__".to_string(), PayloadValue::Number(count + 1.0));
        existing.set_payload(Some(payload));
    }
}

/// Registry of per-type merge policies, falling back to
/// [`CountingMergePolicy`] for any type without a specific one.
pub struct MergePolicyRegistry {
    policies: HashMap<String, Box<dyn MergePolicy>>,
    default_policy: Box<dyn MergePolicy>,
}

impl MergePolicyRegistry {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            default_policy: Box::new(CountingMergePolicy),
        }
    }

    pub fn register(&mut self, event_type: impl Into<String>, policy: Box<dyn MergePolicy>) {
        self.policies.insert(event_type.into(), policy);
    }

    pub fn policy_for(&self, event_type: &str) -> &dyn MergePolicy {
        self.policies
            .get(event_type)
            .map(|p| p.as_ref())
            .unwrap_or(self.default_policy.as_ref())
    }
}

impl Default for MergePolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use serde_json::json;

    #[test]
    fn default_policy_counts_merges() {
        let mut existing = Event::candidate("PropertyModified", TargetId::instance(1), &json!({}), 0);
        let incoming = Event::candidate("PropertyModified", TargetId::instance(1), &json!({"v": 1}), 50);

        let registry = MergePolicyRegistry::new();
        registry.policy_for("PropertyModified").merge(&mut existing, &incoming);

        assert_eq!(existing.timestamp_ms(), 50);
        assert_eq!(
            existing.payload().unwrap().get("__merge_count__"),
            Some(&PayloadValue::Number(2.0))
        );
    }
}
