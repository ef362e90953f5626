//! Resolves whatever identity hints a host can supply into a single
//! [`TargetId`], trying the most stable identity kind first and falling
//! back to weaker hints only when nothing stronger is available.

use actiontrace_core::TargetId;

/// Everything a capture source might know about an entity's identity, in
/// priority order. Empty/`None` fields simply fall through to the next
/// grammar rule.
#[derive(Debug, Clone, Default)]
pub struct IdentityHints<'a> {
    /// Host-native globally unique identifier, when the host exposes one.
    pub native_global_id: Option<&'a str>,
    pub scene_path: Option<&'a str>,
    pub hierarchy_path: Option<&'a str>,
    pub asset_path: Option<&'a str>,
    /// Transient instance id — always available, last resort.
    pub instance_id: i64,
}

/// Resolve hints into a [`TargetId`], preferring `GOID` > `Scene` > `Asset`
/// > `Instance`.
pub fn resolve_target_id(hints: &IdentityHints<'_>) -> TargetId {
    if let Some(goid) = hints.native_global_id {
        return TargetId::goid(goid);
    }
    if let (Some(scene), Some(hierarchy)) = (hints.scene_path, hints.hierarchy_path) {
        return TargetId::scene(scene, hierarchy);
    }
    if let Some(asset) = hints.asset_path {
        return TargetId::asset(asset);
    }
    TargetId::instance(hints.instance_id)
}
