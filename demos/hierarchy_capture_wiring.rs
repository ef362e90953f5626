//! Documented stub: how a host editor would wire a single capture point
//! (`hierarchy`) to `ActionTrace::capture`. Not compiled as part of the
//! workspace — host callback wiring is out of scope, so this is reference
//! material for the integrator, not a live editor hook.
//!
//! A real host has its own hierarchy-changed callback (e.g. a Unity
//! `EditorApplication.hierarchyChanged` delegate, or an equivalent event
//! in whatever editor this is embedded in); it would look roughly like
//! this sketch.

use std::sync::Arc;

use actiontrace::{ActionTrace, TargetId};

fn on_hierarchy_changed(trace: &ActionTrace, instance_id: i64, path: &str) {
    let target = TargetId::instance(instance_id);
    let payload = serde_json::json!({ "path": path });

    // `capture` (not `record`) because this point is flood-prone: rapid
    // selection/hierarchy churn during a drag should collapse under the
    // sampling middleware rather than recording every intermediate frame.
    let _ = trace.capture("HierarchyChanged", target, Some(path), &payload);
}

fn register_with_host(trace: Arc<ActionTrace>) {
    {
        let mut registry = trace.capture_registry();
        if let Some(point) = registry.find_mut("hierarchy") {
            point.set_enabled(true);
        }
    }

    // host_editor_api::on_hierarchy_changed(move |instance_id, path| {
    //     on_hierarchy_changed(&trace, instance_id, &path);
    // });
    let _ = on_hierarchy_changed;
}

fn main() {
    let _ = register_with_host;
}
