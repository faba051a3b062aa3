//! Observability infrastructure - metrics facade counters

mod metrics;

pub use self::metrics::{record_chain_finished, record_operation_invocation, record_operation_outcome};
