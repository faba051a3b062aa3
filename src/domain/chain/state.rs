//! Chain lifecycle state

use serde::{Deserialize, Serialize};

use crate::domain::content_operation::ContentOperationError;

/// Where a chain is in its lifecycle
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChainState {
    #[default]
    Idle,
    Running {
        index: usize,
    },
    WaitingForConnectivity {
        index: usize,
        last_error: ContentOperationError,
    },
    Completed,
    Failed {
        index: usize,
        last_error: ContentOperationError,
    },
}

impl ChainState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Index of the operation the chain is running or waiting on
    pub fn current_index(&self) -> Option<usize> {
        match self {
            Self::Running { index } | Self::WaitingForConnectivity { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ContentOperationError> {
        match self {
            Self::WaitingForConnectivity { last_error, .. } | Self::Failed { last_error, .. } => {
                Some(last_error)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::WaitingForConnectivity { .. } => "waiting_for_connectivity",
            Self::Completed => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running { index } => write!(f, "running({})", index),
            Self::WaitingForConnectivity { index, .. } => {
                write!(f, "waiting_for_connectivity({})", index)
            }
            Self::Failed { index, .. } => write!(f, "failed({})", index),
            other => f.write_str(other.name()),
        }
    }
}
