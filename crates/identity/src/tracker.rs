//! Caches identity so a destroyed entity's last known name and stable id
//! remain resolvable after the host has already torn it down — the
//! "identity will".

use std::collections::{HashMap, HashSet};

use actiontrace_core::TargetId;

#[derive(Debug, Clone)]
struct LiveEntry {
    name: String,
    target_id: TargetId,
}

/// Tracks the live `instance_id -> (name, TargetId)` mapping a capture
/// source reports, and preserves the last known mapping for ids that drop
/// out of the live set.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    live: HashMap<i64, LiveEntry>,
    destroyed: HashMap<i64, LiveEntry>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or refresh) what a capture source currently knows about a
    /// live entity. Call this on every event so the cache stays warm
    /// before the entity is ever destroyed.
    pub fn observe(&mut self, instance_id: i64, name: impl Into<String>, target_id: TargetId) {
        self.live.insert(
            instance_id,
            LiveEntry {
                name: name.into(),
                target_id,
            },
        );
        self.destroyed.remove(&instance_id);
    }

    /// Reconcile against the host's current set of alive instance ids.
    /// Any instance id previously observed but no longer alive is moved
    /// into the destroyed cache, "willing" its last known identity
    /// forward for any event that arrives after destruction.
    pub fn reconcile(&mut self, alive_ids: &HashSet<i64>) {
        let gone: Vec<i64> = self
            .live
            .keys()
            .copied()
            .filter(|id| !alive_ids.contains(id))
            .collect();
        for id in gone {
            if let Some(entry) = self.live.remove(&id) {
                self.destroyed.insert(id, entry);
            }
        }
    }

    /// Resolve an instance id to its stable `TargetId`, checking the live
    /// cache before the destroyed cache.
    pub fn resolve(&self, instance_id: i64) -> Option<TargetId> {
        self.live
            .get(&instance_id)
            .or_else(|| self.destroyed.get(&instance_id))
            .map(|entry| entry.target_id.clone())
    }

    /// Resolve an instance id to its last known display name.
    pub fn display_name(&self, instance_id: i64) -> Option<&str> {
        self.live
            .get(&instance_id)
            .or_else(|| self.destroyed.get(&instance_id))
            .map(|entry| entry.name.as_str())
    }

    pub fn is_destroyed(&self, instance_id: i64) -> bool {
        self.destroyed.contains_key(&instance_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }
}
