//! Sampling Config: event type -> strategy mapping, with hardcoded
//! defaults and runtime mutation.

use std::collections::HashMap;
use std::sync::RwLock;

/// A sampling strategy and the window (milliseconds) it operates over.
/// `None` carries no window: every event is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    None,
    Throttle { window_ms: u64 },
    Debounce { window_ms: u64 },
    DebounceByKey { window_ms: u64 },
}

impl SamplingStrategy {
    pub fn window_ms(&self) -> Option<u64> {
        match self {
            SamplingStrategy::None => None,
            SamplingStrategy::Throttle { window_ms }
            | SamplingStrategy::Debounce { window_ms }
            | SamplingStrategy::DebounceByKey { window_ms } => Some(*window_ms),
        }
    }
}

/// Concurrent map from event type to its configured strategy. Reads and
/// writes are rare relative to sampling decisions, so a single `RwLock`
/// over the whole map is the right granularity here (unlike the
/// per-event pending-sample map, which needs finer-grained concurrency).
pub struct SamplingConfig {
    strategies: RwLock<HashMap<String, SamplingStrategy>>,
}

impl SamplingConfig {
    /// Hardcoded defaults: `HierarchyChanged` throttled at 1000ms,
    /// `SelectionChanged` throttled at 500ms, `PropertyModified`
    /// debounced-by-key at 200ms. Everything else defaults to `None`.
    pub fn with_defaults() -> Self {
        let mut map = HashMap::new();
        map.insert(
            "HierarchyChanged".to_string(),
            SamplingStrategy::Throttle { window_ms: 1000 },
        );
        map.insert(
            "SelectionChanged".to_string(),
            SamplingStrategy::Throttle { window_ms: 500 },
        );
        map.insert(
            "PropertyModified".to_string(),
            SamplingStrategy::DebounceByKey { window_ms: 200 },
        );
        Self {
            strategies: RwLock::new(map),
        }
    }

    pub fn strategy_for(&self, event_type: &str) -> SamplingStrategy {
        self.strategies
            .read()
            .unwrap()
            .get(event_type)
            .copied()
            .unwrap_or(SamplingStrategy::None)
    }

    pub fn set_strategy(&self, event_type: impl Into<String>, strategy: SamplingStrategy) {
        self.strategies.write().unwrap().insert(event_type.into(), strategy);
    }

    pub fn remove_strategy(&self, event_type: &str) {
        self.strategies.write().unwrap().remove(event_type);
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = SamplingConfig::with_defaults();
        assert_eq!(
            config.strategy_for("HierarchyChanged"),
            SamplingStrategy::Throttle { window_ms: 1000 }
        );
        assert_eq!(
            config.strategy_for("SelectionChanged"),
            SamplingStrategy::Throttle { window_ms: 500 }
        );
        assert_eq!(
            config.strategy_for("PropertyModified"),
            SamplingStrategy::DebounceByKey { window_ms: 200 }
        );
        assert_eq!(config.strategy_for("SomethingElse"), SamplingStrategy::None);
    }

    #[test]
    fn runtime_mutation_and_removal() {
        let config = SamplingConfig::with_defaults();
        config.set_strategy("Custom", SamplingStrategy::Debounce { window_ms: 50 });
        assert_eq!(config.strategy_for("Custom"), SamplingStrategy::Debounce { window_ms: 50 });

        config.remove_strategy("Custom");
        assert_eq!(config.strategy_for("Custom"), SamplingStrategy::None);
    }
}
