//! Registers the minimum set of capture points the pipeline must
//! originate events for. Wiring each point to an actual host callback is
//! an external-collaborator concern; what lives here is the
//! lifecycle-managed registration itself, so a host can enable, disable,
//! and read statistics per category uniformly.

use actiontrace_capture::{CapturePoint, CaptureRegistry};

/// Build a registry pre-populated with one `CapturePoint` per semantic
/// category from the minimum event set. Priorities group related
/// categories so related hooks come up together; a host is free to
/// register additional points of its own on top of these.
pub fn default_registry() -> CaptureRegistry {
    let mut registry = CaptureRegistry::new();
    for (id, description, priority) in DEFAULT_POINTS {
        registry.register(CapturePoint::new(*id, *description, *priority));
    }
    registry
}

const DEFAULT_POINTS: &[(&str, &str, i32)] = &[
    ("scene", "scene opened/saved/loaded/unloaded/new", 100),
    ("hierarchy", "hierarchy changed, gameobject created/destroyed", 90),
    ("component", "component added/removed", 90),
    ("selection", "selection changed", 80),
    ("property", "property modified", 80),
    ("asset", "asset created/moved/deleted/modified", 70),
    ("play_mode", "play-mode changed", 60),
    ("compilation", "script-compiled / script-compilation-failed", 50),
    ("build", "build-started/completed/failed", 50),
    ("tool_invocation", "tool-invocation begin/end", 40),
];
