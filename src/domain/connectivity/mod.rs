//! Connectivity domain - reachability state and the monitor boundary

mod monitor;
mod state;

pub use monitor::{ConnectivityMonitor, ConnectivityObserver};
pub use state::ConnectivityState;

#[cfg(test)]
pub use monitor::MockConnectivityMonitor;
