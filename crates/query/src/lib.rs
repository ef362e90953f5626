//! Query/Projection layer: turns stored events into the read-only shape
//! a UI or AI consumer renders, with text search, importance filtering,
//! and the two supported orderings.

mod filters;
mod sort;
mod view_item;

pub use filters::{matches_text, passes_importance, ImportanceThreshold};
pub use sort::{apply as apply_sort, SortMode};
pub use view_item::{build_view_item, ActionTraceViewItem};
