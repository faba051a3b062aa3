//! Chain executor implementation
//!
//! Every state transition runs on a single event-loop task. Operations run on
//! their own tasks and report back through the loop's command channel, so an
//! outcome and a connectivity notification can never race on the chain state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    ChainDirective, ChainError, ChainExecutor, ChainMetrics, ChainOutcome, ChainProgress,
    ChainState, ChainStateMachine, ConnectivityMonitor, ConnectivityObserver, ConnectivityState,
    ContentOperation, ContentOperationError, ContentOperationOutcome, Invocation, ViewModel,
    ViewModelBuilder,
};
use crate::infrastructure::observability::{
    record_chain_finished, record_operation_invocation, record_operation_outcome,
};

/// Configuration for the chain executor
#[derive(Debug, Clone, Default)]
pub struct ChainExecutorConfig {
    /// Identifier of the view the chain builds, copied into the view model
    pub view_identifier: Option<String>,

    /// Whether to emit invocation and outcome counters through the metrics facade
    pub emit_metrics: bool,
}

enum ChainCommand {
    Start,
    ConnectivityChanged(ConnectivityState),
    OperationFinished {
        generation: u64,
        index: usize,
        outcome: ContentOperationOutcome,
        builder: ViewModelBuilder,
        latency_ms: u64,
    },
}

/// Forwards monitor notifications into the executor's event loop
struct LoopConnectivityObserver {
    commands: mpsc::UnboundedSender<ChainCommand>,
}

impl ConnectivityObserver for LoopConnectivityObserver {
    fn on_connectivity_changed(&self, state: ConnectivityState) {
        if self
            .commands
            .send(ChainCommand::ConnectivityChanged(state))
            .is_err()
        {
            debug!(connectivity = %state, "Chain stopped, connectivity change dropped");
        }
    }

    fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Chain executor backed by a tokio event loop
///
/// Must be created inside a tokio runtime. Dropping the executor stops its
/// event loop.
pub struct ChainExecutorImpl {
    run_id: Uuid,
    commands: mpsc::UnboundedSender<ChainCommand>,
    progress: watch::Receiver<ChainProgress>,
    metrics: Arc<RwLock<ChainMetrics>>,
    stop: CancellationToken,
}

impl std::fmt::Debug for ChainExecutorImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainExecutorImpl")
            .field("run_id", &self.run_id)
            .field("state", &self.progress.borrow().state)
            .finish()
    }
}

impl ChainExecutorImpl {
    /// Create an executor for `operations`, registering with `monitor`
    pub fn new(
        operations: Vec<Arc<dyn ContentOperation>>,
        monitor: &dyn ConnectivityMonitor,
    ) -> Result<Self, ChainError> {
        Self::with_config(operations, monitor, ChainExecutorConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(
        operations: Vec<Arc<dyn ContentOperation>>,
        monitor: &dyn ConnectivityMonitor,
        config: ChainExecutorConfig,
    ) -> Result<Self, ChainError> {
        let mut seen = HashSet::new();
        for operation in &operations {
            if !seen.insert(operation.id().clone()) {
                return Err(ChainError::duplicate_operation(operation.id().as_str()));
            }
        }

        let run_id = Uuid::new_v4();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let builder = match &config.view_identifier {
            Some(view) => ViewModelBuilder::for_view(view.clone()),
            None => ViewModelBuilder::new(),
        };
        let (progress_tx, progress_rx) = watch::channel(ChainProgress {
            state: ChainState::Idle,
            view_model: builder.snapshot(),
        });

        // Register before reading the current state; a notification repeating
        // the value read below is then ignored as a duplicate
        monitor.register_observer(Arc::new(LoopConnectivityObserver {
            commands: commands_tx.clone(),
        }));

        let metrics = Arc::new(RwLock::new(ChainMetrics::default()));
        let stop = CancellationToken::new();

        let event_loop = ChainEventLoop {
            run_id,
            machine: ChainStateMachine::new(operations.len(), monitor.current_state()),
            operations,
            builder,
            commands: commands_tx.clone(),
            progress: progress_tx,
            metrics: Arc::clone(&metrics),
            pending: None,
            next_generation: 0,
            emit_metrics: config.emit_metrics,
        };

        tokio::spawn(event_loop.run(commands_rx, stop.clone()));

        debug!(run_id = %run_id, "Chain executor created");

        Ok(Self {
            run_id,
            commands: commands_tx,
            progress: progress_rx,
            metrics,
            stop,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl Drop for ChainExecutorImpl {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

#[async_trait]
impl ChainExecutor for ChainExecutorImpl {
    fn start(&self) -> Result<(), ChainError> {
        self.commands
            .send(ChainCommand::Start)
            .map_err(|_| ChainError::stopped(self.run_id.to_string()))
    }

    fn state(&self) -> ChainState {
        self.progress.borrow().state.clone()
    }

    fn current_snapshot(&self) -> ViewModel {
        self.progress.borrow().view_model.clone()
    }

    fn subscribe(&self) -> watch::Receiver<ChainProgress> {
        self.progress.clone()
    }

    async fn metrics(&self) -> ChainMetrics {
        self.metrics.read().await.clone()
    }

    async fn wait_for_outcome(&self) -> Result<ChainOutcome, ChainError> {
        let mut progress = self.progress.clone();

        let terminal = progress
            .wait_for(|p| p.state.is_terminal())
            .await
            .map_err(|_| ChainError::stopped(self.run_id.to_string()))?
            .clone();

        ChainOutcome::from_progress(terminal).ok_or_else(|| ChainError::stopped(self.run_id.to_string()))
    }

    fn shutdown(&self) {
        debug!(run_id = %self.run_id, "Chain executor shutting down");
        self.stop.cancel();
    }
}

/// Owns the chain state; the only writer of the committed builder
struct ChainEventLoop {
    run_id: Uuid,
    operations: Vec<Arc<dyn ContentOperation>>,
    machine: ChainStateMachine,
    builder: ViewModelBuilder,
    commands: mpsc::UnboundedSender<ChainCommand>,
    progress: watch::Sender<ChainProgress>,
    metrics: Arc<RwLock<ChainMetrics>>,
    /// Generation of the invocation currently in flight
    pending: Option<u64>,
    next_generation: u64,
    emit_metrics: bool,
}

impl ChainEventLoop {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<ChainCommand>,
        stop: CancellationToken,
    ) {
        loop {
            let command = tokio::select! {
                _ = stop.cancelled() => {
                    debug!(run_id = %self.run_id, state = %self.machine.state(), "Chain event loop stopped");
                    return;
                }
                command = commands.recv() => command,
            };

            match command {
                Some(command) => self.handle(command).await,
                None => return,
            }
        }
    }

    async fn handle(&mut self, command: ChainCommand) {
        match command {
            ChainCommand::Start => self.handle_start().await,
            ChainCommand::ConnectivityChanged(state) => {
                debug!(run_id = %self.run_id, connectivity = %state, "Connectivity changed");
                let directive = self.machine.connectivity_changed(state);
                self.apply(directive).await;
            }
            ChainCommand::OperationFinished {
                generation,
                index,
                outcome,
                builder,
                latency_ms,
            } => {
                self.handle_finished(generation, index, outcome, builder, latency_ms)
                    .await
            }
        }
    }

    async fn handle_start(&mut self) {
        let directive = self.machine.start();

        if directive == ChainDirective::Ignore {
            debug!(run_id = %self.run_id, state = %self.machine.state(), "Chain already started");
            return;
        }

        info!(
            run_id = %self.run_id,
            operations = self.operations.len(),
            connectivity = %self.machine.connectivity(),
            "Starting content chain"
        );

        for operation in &self.operations {
            operation.add_initial_content(&mut self.builder);
        }

        self.apply(directive).await;
    }

    async fn handle_finished(
        &mut self,
        generation: u64,
        index: usize,
        outcome: ContentOperationOutcome,
        builder: ViewModelBuilder,
        latency_ms: u64,
    ) {
        if self.pending != Some(generation) {
            warn!(
                run_id = %self.run_id,
                generation,
                index,
                "Ignoring stale operation outcome"
            );
            return;
        }
        self.pending = None;

        let operation_id = self.operations[index].id().clone();

        debug!(
            run_id = %self.run_id,
            operation = %operation_id,
            index,
            generation,
            outcome = outcome.label(),
            latency_ms,
            "Operation finished"
        );

        self.metrics
            .write()
            .await
            .record_outcome(&operation_id, &outcome, latency_ms);

        if self.emit_metrics {
            record_operation_outcome(operation_id.as_str(), outcome.label());
        }

        // Only a successful invocation commits its writes
        match &outcome {
            ContentOperationOutcome::Continue => self.builder = builder,
            ContentOperationOutcome::Defer(error) => {
                debug!(run_id = %self.run_id, operation = %operation_id, %error, "Operation deferred");
            }
            ContentOperationOutcome::Fail(error) => {
                warn!(run_id = %self.run_id, operation = %operation_id, %error, "Operation failed");
            }
        }

        let directive = self.machine.complete(index, outcome);
        self.apply(directive).await;
    }

    async fn apply(&mut self, directive: ChainDirective) {
        match directive {
            ChainDirective::Ignore => return,
            ChainDirective::Invoke(invocation) => self.invoke(invocation).await,
            ChainDirective::Wait => {
                info!(
                    run_id = %self.run_id,
                    state = %self.machine.state(),
                    "Chain waiting for connectivity"
                );
            }
            ChainDirective::Finish => {
                info!(run_id = %self.run_id, state = %self.machine.state(), "Content chain finished");

                if self.emit_metrics {
                    record_chain_finished(self.machine.state().name());
                }
            }
        }

        self.publish();
    }

    async fn invoke(&mut self, invocation: Invocation) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending = Some(generation);

        let index = invocation.index;
        let operation = Arc::clone(&self.operations[index]);

        debug!(
            run_id = %self.run_id,
            operation = %operation.id(),
            index,
            generation,
            connectivity = %invocation.connectivity,
            replay = invocation.is_replay(),
            "Invoking operation"
        );

        self.metrics
            .write()
            .await
            .record_invocation(operation.id(), invocation.is_replay());

        if self.emit_metrics {
            record_operation_invocation(operation.id().as_str(), invocation.is_replay());
        }

        let mut working = self.builder.clone();
        let commands = self.commands.clone();

        tokio::spawn(async move {
            let started = Instant::now();
            let operation_id = operation.id().clone();

            let performing = tokio::spawn(async move {
                let outcome = operation
                    .perform_with_connectivity(
                        invocation.connectivity,
                        invocation.previous_error.as_ref(),
                        &mut working,
                    )
                    .await;

                (outcome, working)
            });

            // A panicking operation still completes its ticket, as a fatal failure
            let (outcome, builder) = match performing.await {
                Ok(performed) => performed,
                Err(e) => {
                    warn!(operation = %operation_id, generation, index, error = %e, "Operation task aborted");

                    let error = ContentOperationError::fatal(format!("operation task aborted: {}", e))
                        .for_operation(operation_id);
                    (ContentOperationOutcome::fail(error), ViewModelBuilder::default())
                }
            };

            let finished = ChainCommand::OperationFinished {
                generation,
                index,
                outcome,
                builder,
                latency_ms: started.elapsed().as_millis() as u64,
            };

            if commands.send(finished).is_err() {
                debug!(generation, index, "Chain stopped, operation outcome discarded");
            }
        });
    }

    fn publish(&self) {
        self.progress.send_replace(ChainProgress {
            state: self.machine.state().clone(),
            view_model: self.builder.snapshot(),
        });
    }
}
