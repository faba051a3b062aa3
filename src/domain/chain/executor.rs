//! Chain executor trait

use async_trait::async_trait;
use tokio::sync::watch;

use super::{ChainError, ChainMetrics, ChainOutcome, ChainProgress, ChainState};
use crate::domain::view_model::ViewModel;

/// Runs an ordered chain of content operations against one view model
#[async_trait]
pub trait ChainExecutor: Send + Sync + std::fmt::Debug {
    /// Start the chain. Calling it again once started has no effect.
    ///
    /// Returns without waiting for any operation.
    fn start(&self) -> Result<(), ChainError>;

    /// Current lifecycle state
    fn state(&self) -> ChainState;

    /// View model as of the last applied transition, safe to call mid-flight
    fn current_snapshot(&self) -> ViewModel;

    /// Receive every state transition along with the committed view model
    fn subscribe(&self) -> watch::Receiver<ChainProgress>;

    /// Invocation counters for this chain
    async fn metrics(&self) -> ChainMetrics;

    /// Wait until the chain is `Completed` or `Failed`.
    ///
    /// A chain parked on connectivity keeps this pending indefinitely.
    async fn wait_for_outcome(&self) -> Result<ChainOutcome, ChainError>;

    /// Stop processing; results of in-flight operations are discarded
    fn shutdown(&self);
}
