//! Transaction Aggregator: splits a flat ordered event sequence into
//! atomic operations at tool/time boundaries.

use actiontrace_core::Sequence;
use actiontrace_events::Event;

use crate::summarizer::summarize;

/// Derived (never stored) aggregation of a contiguous event range.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicOperation {
    pub start_sequence: Sequence,
    pub end_sequence: Sequence,
    pub summary: String,
    pub event_count: usize,
    pub duration_ms: i64,
    pub tool_call_id: Option<String>,
    pub triggered_by_tool: Option<String>,
}

fn tool_call_id(event: &Event) -> Option<String> {
    event
        .payload()
        .and_then(|p| p.get("tool_call_id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn triggered_by_tool(event: &Event) -> Option<String> {
    event
        .payload()
        .and_then(|p| p.get("triggered_by_tool"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn format_duration(duration_ms: i64) -> String {
    if duration_ms < 1000 {
        format!("{duration_ms}ms")
    } else {
        format!("{:.1}s", duration_ms as f64 / 1000.0)
    }
}

/// Split `events` (assumed already in sequence order) into atomic
/// operations. A new boundary starts whenever, in priority order: the
/// `tool_call_id` changes, the `triggered_by_tool` changes, or the batch
/// has run longer than `transaction_window_ms` since its first event.
pub fn aggregate(events: &[Event], transaction_window_ms: u64) -> Vec<AtomicOperation> {
    let mut operations = Vec::new();
    let mut batch: Vec<&Event> = Vec::new();

    for event in events {
        if let Some(first) = batch.first() {
            let boundary = tool_call_id(first) != tool_call_id(event)
                || triggered_by_tool(first) != triggered_by_tool(event)
                || (event.timestamp_ms() - first.timestamp_ms()) as u64 > transaction_window_ms;

            if boundary {
                operations.push(finish_batch(&batch));
                batch.clear();
            }
        }
        batch.push(event);
    }

    if !batch.is_empty() {
        operations.push(finish_batch(&batch));
    }

    operations
}

fn finish_batch(batch: &[&Event]) -> AtomicOperation {
    let first = batch[0];
    let last = batch[batch.len() - 1];
    let duration_ms = last.timestamp_ms() - first.timestamp_ms();
    let tool_id = tool_call_id(first);
    let tool_name = triggered_by_tool(first);

    let summary = if batch.len() == 1 {
        summarize(first)
    } else if let Some(name) = tool_name.as_deref().or(tool_id.as_deref()) {
        format!("{name}: {} events in {}", batch.len(), format_duration(duration_ms))
    } else {
        format!("{} + {} related events", summarize(first), batch.len() - 1)
    };

    AtomicOperation {
        start_sequence: first.sequence(),
        end_sequence: last.sequence(),
        summary,
        event_count: batch.len(),
        duration_ms,
        tool_call_id: tool_id,
        triggered_by_tool: tool_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiontrace_core::TargetId;
    use serde_json::json;

    fn event_at(sequence: Sequence, timestamp_ms: i64, payload: serde_json::Value) -> Event {
        Event::candidate("PropertyModified", TargetId::instance(1), &payload, timestamp_ms)
            .with_sequence(sequence)
    }

    #[test]
    fn splits_on_tool_call_id_change_then_time() {
        let events = vec![
            event_at(1, 0, json!({ "tool_call_id": "T1" })),
            event_at(2, 30, json!({ "tool_call_id": "T1" })),
            event_at(3, 60, json!({ "tool_call_id": "T2" })),
            event_at(4, 80, json!({})),
            event_at(5, 2500, json!({})),
        ];

        let ops = aggregate(&events, 2000);

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].event_count, 2);
        assert_eq!(ops[0].tool_call_id.as_deref(), Some("T1"));
        assert_eq!(ops[1].event_count, 1);
        assert_eq!(ops[1].tool_call_id.as_deref(), Some("T2"));
        assert_eq!(ops[2].event_count, 1);
        assert_eq!(ops[2].tool_call_id, None);
        assert_eq!(ops[3].event_count, 1);
    }

    #[test]
    fn single_event_batch_uses_plain_summary() {
        let events = vec![event_at(1, 0, json!({}))];
        let ops = aggregate(&events, 2000);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].summary, summarize(&events[0]));
    }

    #[test]
    fn empty_input_produces_no_operations() {
        assert!(aggregate(&[], 2000).is_empty());
    }
}
