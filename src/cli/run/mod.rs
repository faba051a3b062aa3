//! Run command - executes a chain script and prints the outcome as JSON

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::{ChainExecutor, ChainOutcome, ChainProgress};
use crate::infrastructure::chain::{ChainExecutorConfig, ChainExecutorImpl};
use crate::infrastructure::connectivity::InMemoryConnectivityMonitor;
use crate::infrastructure::content_operation::{ChainScript, ConnectivityEvent};
use crate::infrastructure::logging;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Chain script, `.toml` or `.json`
    pub script: PathBuf,

    /// Give up if the chain has not finished after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Run a chain script
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let script = ChainScript::from_path(&args.script)?;
    let timeout_ms = args.timeout_ms.unwrap_or(config.executor.outcome_timeout_ms);

    info!(script = %args.script.display(), operations = script.operations.len(), "Running chain script");

    match execute(&script, &config, Duration::from_millis(timeout_ms)).await? {
        RunResult::Finished(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if let Some(error) = outcome.error {
                anyhow::bail!("Chain failed: {}", error);
            }

            Ok(())
        }
        RunResult::TimedOut(progress) => {
            println!("{}", serde_json::to_string_pretty(&progress)?);
            anyhow::bail!(
                "Chain did not finish within {} ms (state: {})",
                timeout_ms,
                progress.state
            );
        }
    }
}

/// How a scripted run ended
#[derive(Debug)]
pub enum RunResult {
    Finished(ChainOutcome),
    /// The chain was still in flight; carries its last published progress
    TimedOut(ChainProgress),
}

/// Execute `script` to completion or until `timeout` elapses
pub async fn execute(
    script: &ChainScript,
    config: &AppConfig,
    timeout: Duration,
) -> anyhow::Result<RunResult> {
    let operations = script.content_operations()?;
    let monitor = Arc::new(InMemoryConnectivityMonitor::new(
        script
            .initial_connectivity
            .unwrap_or(config.executor.initial_connectivity),
    ));

    let executor = ChainExecutorImpl::with_config(
        operations,
        monitor.as_ref(),
        ChainExecutorConfig {
            view_identifier: script.view_identifier.clone(),
            emit_metrics: config.executor.emit_metrics,
        },
    )?;

    let transitions = tokio::spawn(log_transitions(executor.subscribe()));

    executor.start()?;
    let timeline = tokio::spawn(play_timeline(Arc::clone(&monitor), script.timeline()));

    let result = tokio::time::timeout(timeout, executor.wait_for_outcome()).await;

    timeline.abort();
    executor.shutdown();
    transitions.abort();

    match result {
        Ok(outcome) => Ok(RunResult::Finished(outcome?)),
        Err(_) => Ok(RunResult::TimedOut(ChainProgress {
            state: executor.state(),
            view_model: executor.current_snapshot(),
        })),
    }
}

async fn play_timeline(monitor: Arc<InMemoryConnectivityMonitor>, events: Vec<ConnectivityEvent>) {
    let started = tokio::time::Instant::now();

    for event in events {
        tokio::time::sleep_until(started + Duration::from_millis(event.after_ms)).await;
        debug!(after_ms = event.after_ms, connectivity = %event.state, "Applying connectivity event");
        monitor.set_state(event.state);
    }
}

async fn log_transitions(progress: tokio::sync::watch::Receiver<ChainProgress>) {
    let mut states = WatchStream::new(progress);

    while let Some(progress) = states.next().await {
        info!(
            state = %progress.state,
            components = progress.view_model.components.len(),
            "Chain state"
        );
    }
}
