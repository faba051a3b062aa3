//! Connectivity monitor and observer traits

use std::sync::Arc;

use super::ConnectivityState;

#[cfg(test)]
use mockall::automock;

/// Receives connectivity transitions from a monitor
pub trait ConnectivityObserver: Send + Sync {
    /// Called by the monitor whenever it observes a connectivity state.
    ///
    /// Monitors may deliver the same state more than once; observers are
    /// expected to tolerate duplicates.
    fn on_connectivity_changed(&self, state: ConnectivityState);

    /// Whether the observer has gone away; monitors drop closed observers
    fn is_closed(&self) -> bool {
        false
    }
}

/// Source of connectivity transitions (network reachability, host bridge, ...)
#[cfg_attr(test, automock)]
pub trait ConnectivityMonitor: Send + Sync {
    /// The most recently observed connectivity state
    fn current_state(&self) -> ConnectivityState;

    /// Register an observer that receives every subsequent transition until
    /// it reports itself closed
    fn register_observer(&self, observer: Arc<dyn ConnectivityObserver>);
}
