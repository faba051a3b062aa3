//! Metrics for chain execution

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::content_operation::{ContentOperationOutcome, OperationId};

/// Metrics for a chain run
#[derive(Debug, Default, Clone, Serialize)]
pub struct ChainMetrics {
    /// Operation invocations, replays included
    pub total_invocations: u64,
    /// Invocations that replayed a deferred operation
    pub replays: u64,
    /// Outcomes that parked the chain on connectivity
    pub deferrals: u64,
    /// Fatal outcomes
    pub failures: u64,
    /// Per-operation metrics
    pub operation_metrics: BTreeMap<String, OperationMetrics>,
}

/// Metrics for a single operation
#[derive(Debug, Default, Clone, Serialize)]
pub struct OperationMetrics {
    /// Times this operation was invoked
    pub invocations: u64,
    /// Invocations that reported Continue
    pub continues: u64,
    /// Invocations that reported Defer
    pub deferrals: u64,
    /// Invocations that reported Fail
    pub failures: u64,
    /// Average latency in milliseconds
    pub avg_latency_ms: f64,
}

impl ChainMetrics {
    pub fn record_invocation(&mut self, operation_id: &OperationId, is_replay: bool) {
        self.total_invocations += 1;

        if is_replay {
            self.replays += 1;
        }

        self.operation_metrics
            .entry(operation_id.to_string())
            .or_default()
            .invocations += 1;
    }

    pub fn record_outcome(
        &mut self,
        operation_id: &OperationId,
        outcome: &ContentOperationOutcome,
        latency_ms: u64,
    ) {
        let operation = self
            .operation_metrics
            .entry(operation_id.to_string())
            .or_default();
        let completed = operation.continues + operation.deferrals + operation.failures;

        match outcome {
            ContentOperationOutcome::Continue => operation.continues += 1,
            ContentOperationOutcome::Defer(_) => {
                operation.deferrals += 1;
                self.deferrals += 1;
            }
            ContentOperationOutcome::Fail(_) => {
                operation.failures += 1;
                self.failures += 1;
            }
        }

        let total_latency = operation.avg_latency_ms * completed as f64 + latency_ms as f64;
        operation.avg_latency_ms = total_latency / (completed + 1) as f64;
    }

    /// Number of times the operation with the given id was invoked
    pub fn invocations_of(&self, operation_id: &str) -> u64 {
        self.operation_metrics
            .get(operation_id)
            .map(|m| m.invocations)
            .unwrap_or(0)
    }
}
