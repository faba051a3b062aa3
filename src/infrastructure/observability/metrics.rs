//! Counters emitted through the `metrics` facade
//!
//! Nothing is recorded unless the embedding application installs a recorder.

use metrics::counter;

/// Record an operation invocation
pub fn record_operation_invocation(operation: &str, is_replay: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("replay", is_replay.to_string()),
    ];

    counter!("content_chain_operation_invocations_total", &labels).increment(1);
}

/// Record the outcome an operation reported
pub fn record_operation_outcome(operation: &str, outcome: &str) {
    let labels = [
        ("operation", operation.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("content_chain_operation_outcomes_total", &labels).increment(1);

    if outcome == "fail" {
        counter!("content_chain_operation_failures_total", &labels).increment(1);
    }
}

/// Record a chain reaching a terminal state
pub fn record_chain_finished(state: &str) {
    counter!("content_chain_finished_total", "state" => state.to_string()).increment(1);
}
