//! Cross-session-stable identity strings (the "target id" grammar).
//!
//! An event's `target_id` is a plain string at rest (it crosses process
//! boundaries via the persisted snapshot), but construction and inspection
//! go through [`TargetId`] so the grammar is enforced in one place instead
//! of re-parsed ad hoc by every consumer.
//!
//! Grammar, most to least preferred:
//! - `GOID:<id>` — host-native global id.
//! - `Scene:<scene_path>@<hierarchy_path>` — in-scene entity without one.
//! - `Asset:<asset_path>` — asset-backed entity.
//! - `Instance:<numeric_id>` — last resort, not cross-session stable.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetIdKind {
    Goid,
    Scene,
    Asset,
    Instance,
}

impl TargetId {
    pub fn goid(native_id: impl fmt::Display) -> Self {
        Self(format!("GOID:{native_id}"))
    }

    pub fn scene(scene_path: &str, hierarchy_path: &str) -> Self {
        Self(format!("Scene:{scene_path}@{hierarchy_path}"))
    }

    pub fn asset(asset_path: &str) -> Self {
        Self(format!("Asset:{asset_path}"))
    }

    /// Last-resort identity; callers should prefer the other constructors
    /// whenever a cross-session-stable id is available.
    pub fn instance(numeric_id: i64) -> Self {
        Self(format!("Instance:{numeric_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> Option<TargetIdKind> {
        if self.0.starts_with("GOID:") {
            Some(TargetIdKind::Goid)
        } else if self.0.starts_with("Scene:") {
            Some(TargetIdKind::Scene)
        } else if self.0.starts_with("Asset:") {
            Some(TargetIdKind::Asset)
        } else if self.0.starts_with("Instance:") {
            Some(TargetIdKind::Instance)
        } else {
            None
        }
    }

    /// Cross-session stable identities are everything except the
    /// `Instance:` last resort.
    pub fn is_cross_session_stable(&self) -> bool {
        !matches!(self.kind(), Some(TargetIdKind::Instance) | None)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TargetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<TargetId> for String {
    fn from(value: TargetId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goid_is_cross_session_stable() {
        let id = TargetId::goid("12345-abcde");
        assert_eq!(id.as_str(), "GOID:12345-abcde");
        assert_eq!(id.kind(), Some(TargetIdKind::Goid));
        assert!(id.is_cross_session_stable());
    }

    #[test]
    fn instance_is_not_cross_session_stable() {
        let id = TargetId::instance(42);
        assert_eq!(id.as_str(), "Instance:42");
        assert!(!id.is_cross_session_stable());
    }

    #[test]
    fn scene_and_asset_grammar() {
        let scene = TargetId::scene("Assets/Main.unity", "Root/Player");
        assert_eq!(scene.as_str(), "Scene:Assets/Main.unity@Root/Player");

        let asset = TargetId::asset("Assets/Textures/rock.png");
        assert_eq!(asset.as_str(), "Asset:Assets/Textures/rock.png");
    }
}
