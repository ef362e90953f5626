//! Cross-session stable identity: the GOID/Scene/Asset/Instance grammar
//! and the live/destroyed cache that lets a destroyed entity's identity
//! still resolve after the fact.

mod grammar;
mod tracker;

pub use grammar::{resolve_target_id, IdentityHints};
pub use tracker::IdentityTracker;
