//! Content operation trait and outcome types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ContentOperationError, OperationId};
use crate::domain::connectivity::ConnectivityState;
use crate::domain::view_model::ViewModelBuilder;

/// Result reported by a content operation when it finishes an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum ContentOperationOutcome {
    /// Content produced, the chain moves on to the next operation
    Continue,
    /// Could not complete because of connectivity, replay once back online
    Defer(ContentOperationError),
    /// Unrecoverable, the chain stops
    Fail(ContentOperationError),
}

impl ContentOperationOutcome {
    pub fn defer(error: ContentOperationError) -> Self {
        Self::Defer(error)
    }

    pub fn fail(error: ContentOperationError) -> Self {
        Self::Fail(error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Defer(_) => "defer",
            Self::Fail(_) => "fail",
        }
    }

    pub fn error(&self) -> Option<&ContentOperationError> {
        match self {
            Self::Continue => None,
            Self::Defer(error) | Self::Fail(error) => Some(error),
        }
    }
}

/// A stage of a content chain
///
/// Operations are registered in a fixed order when a chain is built. The
/// chain calls `add_initial_content` once on every operation when it starts,
/// then calls `perform_with_connectivity` on one operation at a time.
#[async_trait]
pub trait ContentOperation: Send + Sync + std::fmt::Debug {
    /// Identity of this operation, unique within its chain
    fn id(&self) -> &OperationId;

    /// Add cached content synchronously before any live content is loaded.
    ///
    /// Must not block on I/O and cannot fail.
    fn add_initial_content(&self, _builder: &mut ViewModelBuilder) {}

    /// Produce live content into `builder`.
    ///
    /// `previous_error` is the error this operation reported the last time it
    /// deferred, and is only set when the chain replays it after connectivity
    /// came back. The returned future resolves exactly once; the builder is
    /// borrowed for the duration of the call only.
    async fn perform_with_connectivity(
        &self,
        connectivity: ConnectivityState,
        previous_error: Option<&ContentOperationError>,
        builder: &mut ViewModelBuilder,
    ) -> ContentOperationOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_labels() {
        let err = ContentOperationError::connectivity("offline");

        assert_eq!(ContentOperationOutcome::Continue.label(), "continue");
        assert_eq!(ContentOperationOutcome::defer(err.clone()).label(), "defer");
        assert_eq!(ContentOperationOutcome::fail(err.clone()).label(), "fail");
        assert_eq!(ContentOperationOutcome::defer(err.clone()).error(), Some(&err));
        assert!(ContentOperationOutcome::Continue.error().is_none());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ContentOperationOutcome::fail(ContentOperationError::fatal("boom"));
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["outcome"], json!("fail"));
        assert_eq!(value["error"]["kind"], json!("fatal"));
        assert_eq!(value["error"]["message"], json!("boom"));
    }
}
