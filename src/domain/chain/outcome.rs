//! Progress and outcome published by a chain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ChainState;
use crate::domain::content_operation::ContentOperationError;
use crate::domain::view_model::ViewModel;

/// State of a chain together with its committed view model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainProgress {
    pub state: ChainState,
    pub view_model: ViewModel,
}

/// Final result of a chain that reached `Completed` or `Failed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainOutcome {
    pub state: ChainState,

    /// Complete view model, or the partial one if the chain failed
    pub view_model: ViewModel,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ContentOperationError>,

    pub finished_at: DateTime<Utc>,
}

impl ChainOutcome {
    /// Build an outcome from terminal progress, `None` while the chain is still running
    pub fn from_progress(progress: ChainProgress) -> Option<Self> {
        if !progress.state.is_terminal() {
            return None;
        }

        Some(Self {
            error: progress.state.last_error().cloned(),
            state: progress.state,
            view_model: progress.view_model,
            finished_at: Utc::now(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self.state, ChainState::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_terminal_progress_has_no_outcome() {
        let progress = ChainProgress {
            state: ChainState::Running { index: 0 },
            view_model: ViewModel::default(),
        };

        assert!(ChainOutcome::from_progress(progress).is_none());
    }

    #[test]
    fn test_failed_outcome_carries_error() {
        let error = ContentOperationError::fatal("boom");
        let progress = ChainProgress {
            state: ChainState::Failed {
                index: 2,
                last_error: error.clone(),
            },
            view_model: ViewModel::default(),
        };

        let outcome = ChainOutcome::from_progress(progress).unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.error, Some(error));
    }

    #[test]
    fn test_completed_outcome() {
        let progress = ChainProgress {
            state: ChainState::Completed,
            view_model: ViewModel::default(),
        };

        let outcome = ChainOutcome::from_progress(progress).unwrap();
        assert!(outcome.is_success());
        assert!(outcome.error.is_none());
    }
}
