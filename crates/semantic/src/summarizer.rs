//! Summarizer: templated, missing-field-tolerant human-readable summaries.

use actiontrace_events::Event;

/// Read a string field out of an event's payload, if present.
fn field<'a>(event: &'a Event, key: &str) -> Option<&'a str> {
    event.payload().and_then(|p| p.get(key)).and_then(|v| v.as_str())
}

/// Produce a short, human-readable summary of `event`. Called lazily on
/// first access and eagerly at dehydration time, since a dehydrated event
/// has no payload left to summarize from afterward.
pub fn summarize(event: &Event) -> String {
    let target = event.target_id().as_str();

    match event.event_type() {
        "HierarchyChanged" => match field(event, "change_kind") {
            Some(kind) => format!("{target}: hierarchy {kind}"),
            None => format!("{target}: hierarchy changed"),
        },
        "SelectionChanged" => match field(event, "selected_name") {
            Some(name) => format!("Selected {name}"),
            None => "Selection changed".to_string(),
        },
        "PropertyModified" => match (field(event, "property_name"), field(event, "new_value")) {
            (Some(name), Some(value)) => format!("{target}.{name} = {value}"),
            (Some(name), None) => format!("{target}.{name} modified"),
            _ => format!("{target}: property modified"),
        },
        "AssetImported" => match field(event, "asset_path") {
            Some(path) => format!("Imported {path}"),
            None => format!("Imported asset {target}"),
        },
        "AssetDeleted" => match field(event, "asset_path") {
            Some(path) => format!("Deleted {path}"),
            None => format!("Deleted asset {target}"),
        },
        "BuildStarted" => "Build started".to_string(),
        "BuildCompleted" => match field(event, "duration_ms") {
            Some(duration) => format!("Build completed in {duration}ms"),
            None => "Build completed".to_string(),
        },
        "BuildFailed" => match field(event, "error") {
            Some(error) => format!("Build failed: {error}"),
            None => "Build failed".to_string(),
        },
        "CompilationStarted" => "Compilation started".to_string(),
        "CompilationCompleted" => "Compilation completed".to_string(),
        "CompilationFailed" => match field(event, "error") {
            Some(error) => format!("Compilation failed: {error}"),
            None => "Compilation failed".to_string(),
        },
        "SceneOpened" => match field(event, "scene_path") {
            Some(path) => format!("Opened scene {path}"),
            None => format!("Opened scene {target}"),
        },
        "SceneSaved" => match field(event, "scene_path") {
            Some(path) => format!("Saved scene {path}"),
            None => format!("Saved scene {target}"),
        },
        other => format!("{other} on {target}"),
    }
}
