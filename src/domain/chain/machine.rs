//! Chain state machine
//!
//! Pure transition logic for a chain of content operations. It knows nothing
//! about tasks or channels: every input returns a `ChainDirective` telling the
//! driver what to do next.

use super::ChainState;
use crate::domain::connectivity::ConnectivityState;
use crate::domain::content_operation::{ContentOperationError, ContentOperationOutcome};

/// A request to run one operation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub index: usize,
    pub connectivity: ConnectivityState,
    pub previous_error: Option<ContentOperationError>,
}

impl Invocation {
    /// Whether this invocation replays an operation that deferred
    pub fn is_replay(&self) -> bool {
        self.previous_error.is_some()
    }
}

/// What the driver must do after an input was applied
#[derive(Debug, Clone, PartialEq)]
pub enum ChainDirective {
    /// Input had no effect
    Ignore,
    /// Invoke the given operation
    Invoke(Invocation),
    /// The chain parked until connectivity returns
    Wait,
    /// The chain reached a terminal state
    Finish,
}

/// Transition logic for one chain, driven by start, outcome and connectivity inputs
#[derive(Debug, Clone)]
pub struct ChainStateMachine {
    operation_count: usize,
    state: ChainState,
    connectivity: ConnectivityState,
    /// Connectivity handed to the invocation currently running
    invoked_with: ConnectivityState,
}

impl ChainStateMachine {
    pub fn new(operation_count: usize, connectivity: ConnectivityState) -> Self {
        Self {
            operation_count,
            state: ChainState::Idle,
            connectivity,
            invoked_with: connectivity,
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
    }

    pub fn operation_count(&self) -> usize {
        self.operation_count
    }

    /// Start the chain; only has an effect while idle
    pub fn start(&mut self) -> ChainDirective {
        if !self.state.is_idle() {
            return ChainDirective::Ignore;
        }

        if self.operation_count == 0 {
            self.state = ChainState::Completed;
            return ChainDirective::Finish;
        }

        self.run(0, None)
    }

    /// Apply the outcome reported by the operation at `index`.
    ///
    /// Outcomes for any operation other than the one currently running are
    /// ignored.
    pub fn complete(&mut self, index: usize, outcome: ContentOperationOutcome) -> ChainDirective {
        if self.state != (ChainState::Running { index }) {
            return ChainDirective::Ignore;
        }

        match outcome {
            ContentOperationOutcome::Continue => {
                let next = index + 1;

                if next >= self.operation_count {
                    self.state = ChainState::Completed;
                    ChainDirective::Finish
                } else {
                    self.run(next, None)
                }
            }
            ContentOperationOutcome::Defer(error) => {
                // Connectivity came back while the operation was still running
                if !self.invoked_with.is_online() && self.connectivity.is_online() {
                    return self.run(index, Some(error));
                }

                self.state = ChainState::WaitingForConnectivity {
                    index,
                    last_error: error,
                };
                ChainDirective::Wait
            }
            ContentOperationOutcome::Fail(error) => {
                self.state = ChainState::Failed {
                    index,
                    last_error: error,
                };
                ChainDirective::Finish
            }
        }
    }

    /// Record a connectivity notification.
    ///
    /// Only a change to `Online` while waiting replays the parked operation;
    /// every other notification just updates the retained value. A recovery
    /// seen while an operation runs offline is picked up when it defers.
    pub fn connectivity_changed(&mut self, connectivity: ConnectivityState) -> ChainDirective {
        if connectivity == self.connectivity {
            return ChainDirective::Ignore;
        }

        self.connectivity = connectivity;

        if !connectivity.is_online() {
            return ChainDirective::Ignore;
        }

        match &self.state {
            ChainState::WaitingForConnectivity { index, last_error } => {
                let (index, last_error) = (*index, last_error.clone());
                self.run(index, Some(last_error))
            }
            _ => ChainDirective::Ignore,
        }
    }

    fn run(&mut self, index: usize, previous_error: Option<ContentOperationError>) -> ChainDirective {
        self.state = ChainState::Running { index };
        self.invoked_with = self.connectivity;

        ChainDirective::Invoke(Invocation {
            index,
            connectivity: self.connectivity,
            previous_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defer(message: &str) -> ContentOperationOutcome {
        ContentOperationOutcome::defer(ContentOperationError::connectivity(message))
    }

    fn invoked(directive: ChainDirective) -> Invocation {
        match directive {
            ChainDirective::Invoke(invocation) => invocation,
            other => panic!("expected invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_start_invokes_first_operation() {
        let mut machine = ChainStateMachine::new(3, ConnectivityState::Online);

        let invocation = invoked(machine.start());
        assert_eq!(invocation.index, 0);
        assert_eq!(invocation.connectivity, ConnectivityState::Online);
        assert!(!invocation.is_replay());
        assert_eq!(machine.state(), &ChainState::Running { index: 0 });
    }

    #[test]
    fn test_start_is_ignored_once_started() {
        let mut machine = ChainStateMachine::new(2, ConnectivityState::Online);
        machine.start();

        assert_eq!(machine.start(), ChainDirective::Ignore);
        assert_eq!(machine.state(), &ChainState::Running { index: 0 });
    }

    #[test]
    fn test_empty_chain_completes_on_start() {
        let mut machine = ChainStateMachine::new(0, ConnectivityState::Offline);

        assert_eq!(machine.start(), ChainDirective::Finish);
        assert_eq!(machine.state(), &ChainState::Completed);
        assert_eq!(machine.start(), ChainDirective::Ignore);
    }

    #[test]
    fn test_continue_advances_then_completes() {
        let mut machine = ChainStateMachine::new(2, ConnectivityState::Online);
        machine.start();

        let next = invoked(machine.complete(0, ContentOperationOutcome::Continue));
        assert_eq!(next.index, 1);
        assert!(next.previous_error.is_none());

        assert_eq!(
            machine.complete(1, ContentOperationOutcome::Continue),
            ChainDirective::Finish
        );
        assert_eq!(machine.state(), &ChainState::Completed);
    }

    #[test]
    fn test_defer_parks_until_online() {
        let mut machine = ChainStateMachine::new(2, ConnectivityState::Offline);
        machine.start();
        machine.complete(0, ContentOperationOutcome::Continue);

        assert_eq!(machine.complete(1, defer("no route")), ChainDirective::Wait);
        assert_eq!(machine.state().current_index(), Some(1));

        let replay = invoked(machine.connectivity_changed(ConnectivityState::Online));
        assert_eq!(replay.index, 1);
        assert_eq!(replay.connectivity, ConnectivityState::Online);
        assert_eq!(
            replay.previous_error,
            Some(ContentOperationError::connectivity("no route"))
        );
        assert_eq!(machine.state(), &ChainState::Running { index: 1 });
    }

    #[test]
    fn test_replay_carries_latest_deferred_error() {
        let mut machine = ChainStateMachine::new(1, ConnectivityState::Offline);
        machine.start();
        machine.complete(0, defer("first"));
        machine.connectivity_changed(ConnectivityState::Online);
        machine.complete(0, defer("second"));
        machine.connectivity_changed(ConnectivityState::Offline);

        let replay = invoked(machine.connectivity_changed(ConnectivityState::Online));
        assert_eq!(
            replay.previous_error,
            Some(ContentOperationError::connectivity("second"))
        );
    }

    #[test]
    fn test_offline_only_updates_retained_value() {
        let mut machine = ChainStateMachine::new(2, ConnectivityState::Online);
        machine.start();

        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Offline),
            ChainDirective::Ignore
        );
        assert_eq!(machine.connectivity(), ConnectivityState::Offline);
        assert_eq!(machine.state(), &ChainState::Running { index: 0 });

        let next = invoked(machine.complete(0, ContentOperationOutcome::Continue));
        assert_eq!(next.connectivity, ConnectivityState::Offline);
    }

    #[test]
    fn test_duplicate_online_notification_is_ignored() {
        let mut machine = ChainStateMachine::new(1, ConnectivityState::Offline);
        machine.start();
        machine.complete(0, defer("offline"));

        assert!(matches!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Invoke(_)
        ));
        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Ignore
        );
    }

    #[test]
    fn test_defer_while_online_waits_for_next_recovery() {
        let mut machine = ChainStateMachine::new(1, ConnectivityState::Online);
        machine.start();
        machine.complete(0, defer("flaky"));

        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Ignore
        );
        machine.connectivity_changed(ConnectivityState::Offline);
        assert!(matches!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Invoke(_)
        ));
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut machine = ChainStateMachine::new(3, ConnectivityState::Online);
        machine.start();
        machine.complete(0, ContentOperationOutcome::Continue);

        let error = ContentOperationError::fatal("bad payload");
        assert_eq!(
            machine.complete(1, ContentOperationOutcome::fail(error.clone())),
            ChainDirective::Finish
        );
        assert_eq!(
            machine.state(),
            &ChainState::Failed {
                index: 1,
                last_error: error
            }
        );

        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Offline),
            ChainDirective::Ignore
        );
        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Ignore
        );
        assert_eq!(machine.start(), ChainDirective::Ignore);
    }

    #[test]
    fn test_outcome_for_other_index_is_ignored() {
        let mut machine = ChainStateMachine::new(3, ConnectivityState::Online);
        machine.start();

        assert_eq!(
            machine.complete(2, ContentOperationOutcome::Continue),
            ChainDirective::Ignore
        );
        assert_eq!(machine.state(), &ChainState::Running { index: 0 });
    }

    #[test]
    fn test_outcome_while_waiting_is_ignored() {
        let mut machine = ChainStateMachine::new(1, ConnectivityState::Offline);
        machine.start();
        machine.complete(0, defer("offline"));

        assert_eq!(
            machine.complete(0, ContentOperationOutcome::Continue),
            ChainDirective::Ignore
        );
        assert!(matches!(
            machine.state(),
            ChainState::WaitingForConnectivity { index: 0, .. }
        ));
    }

    #[test]
    fn test_recovery_during_offline_invocation_replays_on_defer() {
        let mut machine = ChainStateMachine::new(2, ConnectivityState::Offline);
        let first = invoked(machine.start());
        assert_eq!(first.connectivity, ConnectivityState::Offline);

        assert_eq!(
            machine.connectivity_changed(ConnectivityState::Online),
            ChainDirective::Ignore
        );

        let replay = invoked(machine.complete(0, defer("offline")));
        assert_eq!(replay.index, 0);
        assert_eq!(replay.connectivity, ConnectivityState::Online);
        assert_eq!(
            replay.previous_error,
            Some(ContentOperationError::connectivity("offline"))
        );
        assert_eq!(machine.state(), &ChainState::Running { index: 0 });

        // The replay itself ran online, so a second deferral parks
        assert_eq!(machine.complete(0, defer("still failing")), ChainDirective::Wait);
    }

    #[test]
    fn test_flapping_during_offline_invocation_parks_on_defer() {
        let mut machine = ChainStateMachine::new(1, ConnectivityState::Offline);
        machine.start();
        machine.connectivity_changed(ConnectivityState::Online);
        machine.connectivity_changed(ConnectivityState::Offline);

        assert_eq!(machine.complete(0, defer("offline")), ChainDirective::Wait);
    }
}
