//! Scoring, categorization, summarization, and transaction aggregation —
//! the layer that turns raw events into something worth reading.

mod aggregator;
mod categorizer;
mod scorer;
mod summarizer;

pub use aggregator::{aggregate, AtomicOperation};
pub use categorizer::{categorize, Category};
pub use scorer::{score, ImportanceCategory};
pub use summarizer::summarize;
