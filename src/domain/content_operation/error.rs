//! Content operation error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OperationId;

/// Classification of a content operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOperationErrorKind {
    /// Transient failure, retried once connectivity returns
    Connectivity,
    /// Terminal failure for the chain
    Fatal,
}

impl ContentOperationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Fatal => "fatal",
        }
    }
}

/// Error reported by a content operation alongside its outcome
///
/// The operation classifies the error; the executor never inspects the
/// message, it only dispatches on the outcome variant carrying it.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{} error{}: {message}", .kind.as_str(), operation_suffix(.operation_id.as_ref()))]
pub struct ContentOperationError {
    pub kind: ContentOperationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<OperationId>,
}

fn operation_suffix(operation_id: Option<&OperationId>) -> String {
    operation_id
        .map(|id| format!(" in '{}'", id))
        .unwrap_or_default()
}

impl ContentOperationError {
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self {
            kind: ContentOperationErrorKind::Connectivity,
            message: message.into(),
            operation_id: None,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: ContentOperationErrorKind::Fatal,
            message: message.into(),
            operation_id: None,
        }
    }

    /// Attribute the error to the operation that produced it
    pub fn for_operation(mut self, operation_id: OperationId) -> Self {
        self.operation_id = Some(operation_id);
        self
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind == ContentOperationErrorKind::Connectivity
    }
}
