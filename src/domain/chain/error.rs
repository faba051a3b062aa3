//! Chain error types

use thiserror::Error;

/// Errors raised by the chain itself, never by its operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    #[error("Duplicate operation in chain: {0}")]
    DuplicateOperation(String),

    #[error("Chain executor stopped: {0}")]
    Stopped(String),
}

impl ChainError {
    pub fn duplicate_operation(id: impl Into<String>) -> Self {
        Self::DuplicateOperation(id.into())
    }

    pub fn stopped(run_id: impl Into<String>) -> Self {
        Self::Stopped(run_id.into())
    }
}
