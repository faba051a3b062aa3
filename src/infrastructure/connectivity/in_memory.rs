//! In-memory connectivity monitor

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::domain::{ConnectivityMonitor, ConnectivityObserver, ConnectivityState};

/// Connectivity monitor whose state is set programmatically
///
/// Used by host bridges that receive reachability callbacks from the
/// platform, by the CLI connectivity timeline, and by tests. Every call to
/// `set_state` is delivered to all observers, including repeats of the
/// current state.
pub struct InMemoryConnectivityMonitor {
    state: RwLock<ConnectivityState>,
    observers: RwLock<Vec<Arc<dyn ConnectivityObserver>>>,
}

impl InMemoryConnectivityMonitor {
    pub fn new(initial: ConnectivityState) -> Self {
        Self {
            state: RwLock::new(initial),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Record a new state and notify every registered observer
    pub fn set_state(&self, state: ConnectivityState) {
        match self.state.write() {
            Ok(mut current) => *current = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }

        let observers = {
            let mut observers = match self.observers.write() {
                Ok(observers) => observers,
                Err(poisoned) => poisoned.into_inner(),
            };
            prune_closed(&mut observers);
            observers.clone()
        };

        debug!(
            connectivity = %state,
            observers = observers.len(),
            "Delivering connectivity state"
        );

        for observer in observers {
            observer.on_connectivity_changed(state);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().map(|o| o.len()).unwrap_or(0)
    }
}

impl Default for InMemoryConnectivityMonitor {
    fn default() -> Self {
        Self::new(ConnectivityState::default())
    }
}

impl std::fmt::Debug for InMemoryConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConnectivityMonitor")
            .field("state", &self.current_state())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl ConnectivityMonitor for InMemoryConnectivityMonitor {
    fn current_state(&self) -> ConnectivityState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn register_observer(&self, observer: Arc<dyn ConnectivityObserver>) {
        let mut observers = match self.observers.write() {
            Ok(observers) => observers,
            Err(poisoned) => poisoned.into_inner(),
        };

        prune_closed(&mut observers);
        observers.push(observer);
    }
}

fn prune_closed(observers: &mut Vec<Arc<dyn ConnectivityObserver>>) {
    let before = observers.len();
    observers.retain(|observer| !observer.is_closed());

    if observers.len() < before {
        debug!(removed = before - observers.len(), "Pruned closed connectivity observers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<ConnectivityState>>,
    }

    impl ConnectivityObserver for RecordingObserver {
        fn on_connectivity_changed(&self, state: ConnectivityState) {
            self.seen.lock().unwrap().push(state);
        }
    }

    #[derive(Default)]
    struct ClosableObserver {
        closed: AtomicBool,
        calls: Mutex<usize>,
    }

    impl ConnectivityObserver for ClosableObserver {
        fn on_connectivity_changed(&self, _state: ConnectivityState) {
            *self.calls.lock().unwrap() += 1;
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_initial_state() {
        let monitor = InMemoryConnectivityMonitor::new(ConnectivityState::Offline);
        assert_eq!(monitor.current_state(), ConnectivityState::Offline);
        assert_eq!(monitor.observer_count(), 0);
    }

    #[test]
    fn test_set_state_notifies_observers() {
        let monitor = InMemoryConnectivityMonitor::default();
        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        monitor.register_observer(first.clone());
        monitor.register_observer(second.clone());

        monitor.set_state(ConnectivityState::Offline);
        monitor.set_state(ConnectivityState::Online);

        let expected = vec![ConnectivityState::Offline, ConnectivityState::Online];
        assert_eq!(*first.seen.lock().unwrap(), expected);
        assert_eq!(*second.seen.lock().unwrap(), expected);
        assert_eq!(monitor.current_state(), ConnectivityState::Online);
    }

    #[test]
    fn test_repeated_state_is_delivered() {
        let monitor = InMemoryConnectivityMonitor::new(ConnectivityState::Online);
        let observer = Arc::new(RecordingObserver::default());
        monitor.register_observer(observer.clone());

        monitor.set_state(ConnectivityState::Online);
        monitor.set_state(ConnectivityState::Online);

        assert_eq!(observer.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_closed_observers_are_pruned() {
        let monitor = InMemoryConnectivityMonitor::default();
        let live = Arc::new(ClosableObserver::default());
        let gone = Arc::new(ClosableObserver::default());
        monitor.register_observer(live.clone());
        monitor.register_observer(gone.clone());

        gone.closed.store(true, Ordering::SeqCst);
        monitor.set_state(ConnectivityState::Offline);

        assert_eq!(monitor.observer_count(), 1);
        assert_eq!(*live.calls.lock().unwrap(), 1);
        assert_eq!(*gone.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_registration_prunes_closed_observers() {
        let monitor = InMemoryConnectivityMonitor::default();
        for _ in 0..10 {
            let observer = Arc::new(ClosableObserver::default());
            monitor.register_observer(observer.clone());
            observer.closed.store(true, Ordering::SeqCst);
        }

        monitor.register_observer(Arc::new(ClosableObserver::default()));

        assert_eq!(monitor.observer_count(), 1);
    }
}
