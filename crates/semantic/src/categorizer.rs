//! Categorizer: event type -> coarse category, for grouping and filtering
//! in the query layer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Category {
    Scene,
    Asset,
    Build,
    Compilation,
    GameObject,
    Component,
    Property,
    User,
    Tool,
    Unknown,
}

/// Categorize by prefix of the event type string. Order matters: more
/// specific prefixes are checked before their broader siblings.
pub fn categorize(event_type: &str) -> Category {
    let t = event_type;
    if t.starts_with("Scene") {
        Category::Scene
    } else if t.starts_with("Asset") {
        Category::Asset
    } else if t.starts_with("Build") {
        Category::Build
    } else if t.starts_with("Compilation") {
        Category::Compilation
    } else if t.starts_with("Hierarchy") || t.starts_with("GameObject") || t.starts_with("Selection") {
        Category::GameObject
    } else if t.starts_with("Component") {
        Category::Component
    } else if t.starts_with("Property") {
        Category::Property
    } else if t.starts_with("Tool") {
        Category::Tool
    } else if t.starts_with("User") {
        Category::User
    } else {
        Category::Unknown
    }
}
