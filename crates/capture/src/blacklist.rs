//! Blacklist Filter: ordered rule evaluation over paths and entity names.

use std::sync::Mutex;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a matching rule does with the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    Block,
    Allow,
}

/// How a rule's `pattern` is matched against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    /// `candidate.starts_with(pattern)`.
    PathPrefix,
    /// `candidate.ends_with(pattern)`.
    FileExtension,
    /// `pattern` compiled as a regular expression, matched with `is_match`.
    Regex,
    /// `candidate.contains(pattern)`, evaluated against an entity name.
    EntityName,
}

/// One evaluation rule. `priority` breaks ties when several rules would
/// otherwise match (higher priority evaluated first). A disabled rule is
/// skipped entirely during evaluation, as if it were absent.
///
/// `Regex` rules keep a compiled-pattern cache behind a lock; the cache is
/// transient (never serialized) and is invalidated whenever `pattern` or
/// `rule_type` is mutated.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterRule {
    pub name: String,
    pub enabled: bool,
    pub rule_type: RuleType,
    pub pattern: String,
    pub action: RuleAction,
    pub priority: i32,
    #[serde(skip)]
    compiled: Mutex<Option<Regex>>,
}

impl FilterRule {
    pub fn new(
        name: impl Into<String>,
        rule_type: RuleType,
        pattern: impl Into<String>,
        action: RuleAction,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            rule_type,
            pattern: pattern.into(),
            action,
            priority,
            compiled: Mutex::new(None),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_action(&mut self, action: RuleAction) {
        self.action = action;
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Changing the pattern invalidates the compiled-regex cache; the next
    /// `Regex`-typed match recompiles it.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
        self.invalidate_cache();
    }

    pub fn set_rule_type(&mut self, rule_type: RuleType) {
        self.rule_type = rule_type;
        self.invalidate_cache();
    }

    fn invalidate_cache(&mut self) {
        *self.compiled.get_mut().unwrap() = None;
    }

    fn matches(&self, candidate: &str) -> bool {
        if !self.enabled {
            return false;
        }
        match self.rule_type {
            RuleType::PathPrefix => candidate.starts_with(self.pattern.as_str()),
            RuleType::FileExtension => candidate.ends_with(self.pattern.as_str()),
            RuleType::EntityName => candidate.contains(self.pattern.as_str()),
            RuleType::Regex => self.matches_regex(candidate),
        }
    }

    fn matches_regex(&self, candidate: &str) -> bool {
        let mut cache = self.compiled.lock().unwrap();
        if cache.is_none() {
            match Regex::new(&self.pattern) {
                Ok(compiled) => *cache = Some(compiled),
                Err(error) => {
                    warn!(rule = %self.name, pattern = %self.pattern, %error, "invalid filter rule regex; rule never matches");
                    return false;
                }
            }
        }
        cache.as_ref().unwrap().is_match(candidate)
    }
}

impl Clone for FilterRule {
    /// The compiled-pattern cache is transient and starts empty in the
    /// clone, same as after deserializing or mutating the rule.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            enabled: self.enabled,
            rule_type: self.rule_type,
            pattern: self.pattern.clone(),
            action: self.action,
            priority: self.priority,
            compiled: Mutex::new(None),
        }
    }
}

/// The default rules merged ahead of any user rules at evaluation time:
/// `.meta` files are blocked unless they accompany a scene or prefab
/// file, and a Resources-folder exception always admits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRuleSet {
    rules: Vec<FilterRule>,
}

impl FilterRuleSet {
    pub fn default_rules() -> Self {
        Self {
            rules: vec![
                FilterRule::new("block-meta-files", RuleType::FileExtension, ".meta", RuleAction::Block, 100),
                FilterRule::new(
                    "allow-scene-meta",
                    RuleType::FileExtension,
                    ".scene.meta",
                    RuleAction::Allow,
                    200,
                ),
                FilterRule::new(
                    "allow-prefab-meta",
                    RuleType::FileExtension,
                    ".prefab.meta",
                    RuleAction::Allow,
                    200,
                ),
                FilterRule::new("allow-resources-folder", RuleType::Regex, "/Resources/", RuleAction::Allow, 300),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }
}

impl Default for FilterRuleSet {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Evaluates a candidate path or entity name against the merged default
/// and user rule sets, sorted by descending priority. First match wins;
/// no match means accept.
pub struct BlacklistFilter {
    rules: Vec<FilterRule>,
    min_name_length: usize,
}

impl BlacklistFilter {
    pub fn new(defaults: FilterRuleSet, user_rules: FilterRuleSet, min_name_length: usize) -> Self {
        let mut rules = defaults.rules;
        rules.extend(user_rules.rules);
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules, min_name_length }
    }

    fn evaluate(&self, candidate: &str) -> bool {
        for rule in &self.rules {
            if rule.matches(candidate) {
                return rule.action == RuleAction::Allow;
            }
        }
        true
    }

    /// Path filtering entry point for asset-event candidates.
    pub fn allows_path(&self, path: &str) -> bool {
        self.evaluate(path)
    }

    /// Entity-name filtering entry point. Names shorter than the
    /// configured minimum are rejected outright, before rule evaluation.
    pub fn allows_name(&self, name: &str) -> bool {
        if name.len() < self.min_name_length {
            return false;
        }
        self.evaluate(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_meta_file_is_blocked() {
        let filter = BlacklistFilter::new(FilterRuleSet::default_rules(), FilterRuleSet::empty(), 0);
        assert!(!filter.allows_path("Assets/Textures/rock.png.meta"));
    }

    #[test]
    fn scene_meta_is_allowed() {
        let filter = BlacklistFilter::new(FilterRuleSet::default_rules(), FilterRuleSet::empty(), 0);
        assert!(filter.allows_path("Assets/Scenes/Main.scene.meta"));
    }

    #[test]
    fn resources_folder_exception_overrides_meta_block() {
        let filter = BlacklistFilter::new(FilterRuleSet::default_rules(), FilterRuleSet::empty(), 0);
        // Resources rule has higher priority than the bare .meta block.
        assert!(filter.allows_path("Assets/Resources/icons/rock.png.meta"));
    }

    #[test]
    fn unmatched_path_is_allowed_by_default() {
        let filter = BlacklistFilter::new(FilterRuleSet::default_rules(), FilterRuleSet::empty(), 0);
        assert!(filter.allows_path("Assets/Scripts/Player.cs"));
    }

    #[test]
    fn names_shorter_than_minimum_are_rejected() {
        let filter = BlacklistFilter::new(FilterRuleSet::empty(), FilterRuleSet::empty(), 3);
        assert!(!filter.allows_name("ab"));
        assert!(filter.allows_name("abc"));
    }

    #[test]
    fn user_rule_can_block_ahead_of_defaults() {
        let mut user = FilterRuleSet::empty();
        user.push(FilterRule::new("block-secret", RuleType::Regex, "Secret", RuleAction::Block, 1000));
        let filter = BlacklistFilter::new(FilterRuleSet::default_rules(), user, 0);
        assert!(!filter.allows_path("Assets/Secret/key.asset"));
    }

    #[test]
    fn disabled_rule_is_never_evaluated() {
        let mut user = FilterRuleSet::empty();
        let mut rule = FilterRule::new("block-secret", RuleType::EntityName, "Secret", RuleAction::Block, 1000);
        rule.set_enabled(false);
        user.push(rule);
        let filter = BlacklistFilter::new(FilterRuleSet::empty(), user, 0);
        assert!(filter.allows_name("SecretAgent"));
    }

    #[test]
    fn path_prefix_rule_matches_only_at_the_start() {
        let mut user = FilterRuleSet::empty();
        user.push(FilterRule::new(
            "block-generated",
            RuleType::PathPrefix,
            "Library/",
            RuleAction::Block,
            50,
        ));
        let filter = BlacklistFilter::new(FilterRuleSet::empty(), user, 0);
        assert!(!filter.allows_path("Library/ShaderCache/foo.bin"));
        assert!(filter.allows_path("Assets/Library/readme.txt"));
    }

    #[test]
    fn regex_rule_matches_a_pattern_not_expressible_as_prefix_or_suffix() {
        let mut user = FilterRuleSet::empty();
        user.push(FilterRule::new(
            "block-numbered-backups",
            RuleType::Regex,
            r"\.bak\.\d+$",
            RuleAction::Block,
            50,
        ));
        let filter = BlacklistFilter::new(FilterRuleSet::empty(), user, 0);
        assert!(!filter.allows_path("Assets/Scene.unity.bak.3"));
        assert!(filter.allows_path("Assets/Scene.unity.bak.latest"));
    }

    #[test]
    fn invalid_regex_never_matches_and_does_not_panic() {
        let mut user = FilterRuleSet::empty();
        user.push(FilterRule::new("broken", RuleType::Regex, "(unterminated", RuleAction::Block, 50));
        let filter = BlacklistFilter::new(FilterRuleSet::empty(), user, 0);
        assert!(filter.allows_path("anything"));
    }

    #[test]
    fn mutating_pattern_invalidates_the_compiled_cache() {
        let mut rule = FilterRule::new("swap", RuleType::Regex, "^A", RuleAction::Block, 0);
        assert!(!rule.matches("Apple"));
        rule.set_pattern("^B");
        assert!(!rule.matches("Apple"));
        assert!(rule.matches("Banana"));
    }

    #[test]
    fn filter_rule_round_trips_through_json() {
        let rule = FilterRule::new("block-secret", RuleType::EntityName, "Secret", RuleAction::Block, 1000);
        let json = serde_json::to_string(&rule).unwrap();
        let restored: FilterRule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, "block-secret");
        assert_eq!(restored.rule_type, RuleType::EntityName);
        assert!(restored.matches("SecretAgent"));
    }
}
