//! The two view orderings a consumer can ask for.

use crate::filters::passes_importance;
use crate::view_item::ActionTraceViewItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Pure reverse chronological order, no filtering applied.
    ByTimeDesc,
    /// Time desc, importance desc within a tie, with the importance
    /// floor actually enforced. This is the only mode that drops items.
    AIFiltered { importance_threshold: f64 },
}

/// Orders (and for `AIFiltered`, filters) a batch of view items in place.
pub fn apply(mode: SortMode, mut items: Vec<ActionTraceViewItem>) -> Vec<ActionTraceViewItem> {
    match mode {
        SortMode::ByTimeDesc => {
            items.sort_by(|a, b| b.display_time_ms.cmp(&a.display_time_ms).then(b.sequence.cmp(&a.sequence)));
            items
        }
        SortMode::AIFiltered { importance_threshold } => {
            items.retain(|item| passes_importance(item, importance_threshold));
            items.sort_by(|a, b| {
                b.display_time_ms
                    .cmp(&a.display_time_ms)
                    .then(b.importance_score.partial_cmp(&a.importance_score).unwrap_or(std::cmp::Ordering::Equal))
            });
            items
        }
    }
}
