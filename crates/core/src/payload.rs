//! The tagged value enum event payloads are normalized into, and the
//! recursive sanitizer that enforces the payload invariants.
//!
//! Every payload that reaches an [`Event`](crate) has already passed through
//! [`sanitize`] — strings truncated, collections capped, recursion bounded,
//! non-string keys and unsupported value shapes dropped with a `tracing`
//! warning rather than rejecting the whole event.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Strings longer than this are truncated.
pub const MAX_STRING_LEN: usize = 512;
/// Sequences/maps longer than this are capped, remainder replaced by a
/// sentinel marker entry.
pub const MAX_COLLECTION_LEN: usize = 64;
/// Maximum nesting depth of arrays/maps.
pub const MAX_DEPTH: usize = 4;

/// Marker value substituted for truncated collection tails.
pub const TRUNCATION_SENTINEL: &str = "…(truncated)";

/// Canonical runtime representation of a sanitized payload value.
///
/// Only scalars, strings, booleans, ordered sequences of these, and
/// string-keyed maps of these survive sanitization — this is the full set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PayloadValue>),
    Map(BTreeMap<String, PayloadValue>),
}

impl PayloadValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PayloadValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, PayloadValue>> {
        match self {
            PayloadValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A string-keyed map of sanitized values — the shape events actually store
/// as their `payload` field.
pub type Payload = BTreeMap<String, PayloadValue>;

/// Sanitize a raw, caller-supplied JSON payload into the canonical shape.
///
/// Top-level payloads must be a JSON object (string-keyed map); anything
/// else is treated as an empty payload and logged as a warning, since the
/// data model requires `payload` to be a keyed map.
pub fn sanitize_payload(raw: &JsonValue) -> Payload {
    match raw {
        JsonValue::Object(map) => sanitize_map(map.iter().map(|(k, v)| (k.as_str(), v)), 0),
        JsonValue::Null => Payload::new(),
        other => {
            tracing::warn!(
                value_kind = %json_kind(other),
                "payload root was not a JSON object; dropping to empty payload"
            );
            Payload::new()
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn sanitize_map<'a>(
    entries: impl Iterator<Item = (&'a str, &'a JsonValue)>,
    depth: usize,
) -> Payload {
    let mut out = Payload::new();
    for (key, value) in entries {
        if out.len() >= MAX_COLLECTION_LEN {
            out.insert(
                "__truncated__".to_string(),
                PayloadValue::String(TRUNCATION_SENTINEL.to_string()),
            );
            break;
        }
        if let Some(sanitized) = sanitize_value(value, depth) {
            out.insert(key.to_string(), sanitized);
        }
        // Unsupported value types are dropped with a warning inside
        // sanitize_value; non-string keys can't occur here because JSON
        // object keys are always strings, but serde_json enforces that for
        // us at parse time already.
    }
    out
}

fn sanitize_value(value: &JsonValue, depth: usize) -> Option<PayloadValue> {
    if depth > MAX_DEPTH {
        tracing::warn!(depth, "payload nesting exceeded max depth; dropping subtree");
        return None;
    }

    match value {
        JsonValue::Null => Some(PayloadValue::Null),
        JsonValue::Bool(b) => Some(PayloadValue::Bool(*b)),
        JsonValue::Number(n) => n.as_f64().map(PayloadValue::Number).or_else(|| {
            tracing::warn!("payload number could not be represented as f64; dropping");
            None
        }),
        JsonValue::String(s) => Some(PayloadValue::String(truncate_string(s))),
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len().min(MAX_COLLECTION_LEN));
            for item in items.iter() {
                if out.len() >= MAX_COLLECTION_LEN {
                    out.push(PayloadValue::String(TRUNCATION_SENTINEL.to_string()));
                    break;
                }
                if let Some(sanitized) = sanitize_value(item, depth + 1) {
                    out.push(sanitized);
                }
            }
            Some(PayloadValue::Array(out))
        }
        JsonValue::Object(map) => Some(PayloadValue::Map(sanitize_map(
            map.iter().map(|(k, v)| (k.as_str(), v)),
            depth + 1,
        ))),
    }
}

fn truncate_string(s: &str) -> String {
    if s.chars().count() <= MAX_STRING_LEN {
        s.to_string()
    } else {
        s.chars().take(MAX_STRING_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncates_long_strings() {
        let raw = json!({ "name": "a".repeat(1000) });
        let sanitized = sanitize_payload(&raw);
        let PayloadValue::String(name) = &sanitized["name"] else {
            panic!("expected string");
        };
        assert_eq!(name.chars().count(), MAX_STRING_LEN);
    }

    #[test]
    fn caps_collections_with_sentinel() {
        let items: Vec<i32> = (0..100).collect();
        let raw = json!({ "items": items });
        let sanitized = sanitize_payload(&raw);
        let PayloadValue::Array(arr) = &sanitized["items"] else {
            panic!("expected array");
        };
        assert_eq!(arr.len(), MAX_COLLECTION_LEN);
        assert_eq!(
            arr.last(),
            Some(&PayloadValue::String(TRUNCATION_SENTINEL.to_string()))
        );
    }

    #[test]
    fn caps_recursion_depth() {
        // depth 0..=4 survives (root object is depth 0, its values are
        // sanitized at depth 0 too since sanitize_payload starts at 0 for
        // the root map's *entries*); anything nested past MAX_DEPTH is
        // dropped rather than panicking.
        let raw = json!({
            "a": { "b": { "c": { "d": { "e": { "f": "too deep" } } } } }
        });
        let sanitized = sanitize_payload(&raw);
        // Should not panic and should produce *some* bounded structure.
        assert!(sanitized.contains_key("a"));
    }

    #[test]
    fn non_object_root_becomes_empty() {
        let raw = json!("just a string");
        let sanitized = sanitize_payload(&raw);
        assert!(sanitized.is_empty());
    }

    #[test]
    fn preserves_small_well_formed_payloads() {
        let raw = json!({ "delta": 10, "active": true, "name": "stock" });
        let sanitized = sanitize_payload(&raw);
        assert_eq!(sanitized.get("delta"), Some(&PayloadValue::Number(10.0)));
        assert_eq!(sanitized.get("active"), Some(&PayloadValue::Bool(true)));
        assert_eq!(
            sanitized.get("name"),
            Some(&PayloadValue::String("stock".to_string()))
        );
    }

    fn depth_of(value: &PayloadValue) -> usize {
        match value {
            PayloadValue::Array(items) => 1 + items.iter().map(depth_of).max().unwrap_or(0),
            PayloadValue::Map(map) => 1 + map.values().map(depth_of).max().unwrap_or(0),
            _ => 0,
        }
    }

    proptest::proptest! {
        /// After sanitizing any payload, every reachable string is <= 512
        /// chars, every reachable collection is <= 64 items, and nesting
        /// never exceeds depth 4 — regardless of how deep or wide the
        /// input was.
        #[test]
        fn sanitized_payload_always_respects_its_bounds(raw in arbitrary_json(0)) {
            let sanitized = sanitize_payload(&raw);
            prop_assert!(sanitized.len() <= MAX_COLLECTION_LEN + 1);
            for value in sanitized.values() {
                // depth_of counts the value's own wrapping level, so a
                // chain sanitized down to the MAX_DEPTH check boundary
                // reads as MAX_DEPTH + 1 here.
                prop_assert!(depth_of(value) <= MAX_DEPTH + 1);
                assert_bounded(value);
            }
        }
    }

    fn assert_bounded(value: &PayloadValue) {
        match value {
            PayloadValue::String(s) => assert!(s.chars().count() <= MAX_STRING_LEN),
            PayloadValue::Array(items) => {
                assert!(items.len() <= MAX_COLLECTION_LEN + 1);
                items.iter().for_each(assert_bounded);
            }
            PayloadValue::Map(map) => {
                assert!(map.len() <= MAX_COLLECTION_LEN + 1);
                map.values().for_each(assert_bounded);
            }
            _ => {}
        }
    }

    fn arbitrary_json(depth: u32) -> impl proptest::strategy::Strategy<Value = JsonValue> {
        use proptest::prelude::*;

        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            any::<f64>().prop_map(|n| serde_json::json!(n)),
            ".{0,40}".prop_map(JsonValue::String),
        ];

        if depth >= 3 {
            leaf.boxed()
        } else {
            leaf.prop_recursive(3, 64, 8, move |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..8)
                        .prop_map(JsonValue::Array),
                    proptest::collection::hash_map("[a-z]{1,8}", inner, 0..8)
                        .prop_map(|m| JsonValue::Object(m.into_iter().collect())),
                ]
            })
            .boxed()
        }
    }
}
