//! Infrastructure layer - Executor, connectivity and operation implementations

pub mod chain;
pub mod connectivity;
pub mod content_operation;
pub mod logging;
pub mod observability;
