//! Content operation driven by a fixed script of outcomes

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    Component, ConnectivityState, ContentOperation, ContentOperationError,
    ContentOperationOutcome, Fields, OperationId, ViewModelBuilder, ViewModelError,
};

/// Outcome a scripted step reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedOutcome {
    #[default]
    Continue,
    Defer,
    Fail,
    /// Never report an outcome
    Stall,
}

/// One invocation worth of behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStep {
    #[serde(default)]
    pub outcome: ScriptedOutcome,

    /// Error message for `defer` and `fail`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_title: Option<String>,

    #[serde(default)]
    pub header: Fields,

    /// Components written with overwrite-by-id semantics
    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,

    /// Simulated latency before the outcome is reported
    #[serde(default)]
    pub delay_ms: u64,
}

impl ScriptedStep {
    pub fn proceed() -> Self {
        Self::default()
    }

    pub fn defer(message: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::Defer,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::Fail,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// A step whose invocation never completes
    pub fn stall() -> Self {
        Self {
            outcome: ScriptedOutcome::Stall,
            ..Self::default()
        }
    }

    pub fn with_header_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.header.insert(key.into(), value);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_navigation_title(mut self, title: impl Into<String>) -> Self {
        self.navigation_title = Some(title.into());
        self
    }

    pub fn with_extension_data(mut self, data: Value) -> Self {
        self.extension_data = Some(data);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// What a scripted operation observed across its invocations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformRecord {
    pub perform_count: usize,
    pub initial_content_count: usize,
    /// Connectivity passed to the most recent invocation
    pub connectivity_state: Option<ConnectivityState>,
    /// Previous error passed to the most recent invocation
    pub previous_error: Option<ContentOperationError>,
}

/// Content operation that plays back a list of steps, one per invocation
///
/// When the script runs out, the last step repeats; an empty script always
/// continues without contributing content. The record of an invocation is
/// updated before its outcome is reported, so an observer that sees the
/// chain react to an outcome also sees the matching `perform_count`,
/// `connectivity_state` and `previous_error`.
#[derive(Debug)]
pub struct ScriptedContentOperation {
    id: OperationId,
    initial_header: Fields,
    initial_components: Vec<Component>,
    steps: Vec<ScriptedStep>,
    record: Mutex<PerformRecord>,
}

impl ScriptedContentOperation {
    pub fn new(id: OperationId) -> Self {
        Self {
            id,
            initial_header: Fields::new(),
            initial_components: Vec::new(),
            steps: Vec::new(),
            record: Mutex::new(PerformRecord::default()),
        }
    }

    pub fn with_step(mut self, step: ScriptedStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_steps(mut self, steps: impl IntoIterator<Item = ScriptedStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Header fields added as cached initial content
    pub fn with_initial_header(mut self, header: Fields) -> Self {
        self.initial_header = header;
        self
    }

    /// Component added as cached initial content
    pub fn with_initial_component(mut self, component: Component) -> Self {
        self.initial_components.push(component);
        self
    }

    pub fn record(&self) -> PerformRecord {
        self.lock_record().clone()
    }

    pub fn perform_count(&self) -> usize {
        self.lock_record().perform_count
    }

    pub fn initial_content_count(&self) -> usize {
        self.lock_record().initial_content_count
    }

    pub fn connectivity_state(&self) -> Option<ConnectivityState> {
        self.lock_record().connectivity_state
    }

    pub fn previous_error(&self) -> Option<ContentOperationError> {
        self.lock_record().previous_error.clone()
    }

    fn lock_record(&self) -> MutexGuard<'_, PerformRecord> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn step_for(&self, perform_count: usize) -> Option<ScriptedStep> {
        let last = self.steps.len().checked_sub(1)?;
        self.steps.get(perform_count.saturating_sub(1).min(last)).cloned()
    }

    fn apply(&self, step: &ScriptedStep, builder: &mut ViewModelBuilder) -> Result<(), ViewModelError> {
        if let Some(title) = &step.navigation_title {
            builder.set_navigation_title(title.clone());
        }

        builder.set_header(step.header.clone());

        for component in &step.components {
            if builder.contains_component(&component.id) {
                builder.upsert_component(component.id.clone(), component.fields.clone())?;
            } else {
                builder.append_component(component.clone())?;
            }
        }

        if let Some(data) = &step.extension_data {
            builder.set_extension_data(self.id.clone(), data.clone());
        }

        Ok(())
    }

    async fn outcome_for(&self, step: &ScriptedStep) -> ContentOperationOutcome {
        let message = || {
            step.error
                .clone()
                .unwrap_or_else(|| format!("scripted {:?} from '{}'", step.outcome, self.id))
        };

        match step.outcome {
            ScriptedOutcome::Continue => ContentOperationOutcome::Continue,
            ScriptedOutcome::Defer => ContentOperationOutcome::defer(
                ContentOperationError::connectivity(message()).for_operation(self.id.clone()),
            ),
            ScriptedOutcome::Fail => ContentOperationOutcome::fail(
                ContentOperationError::fatal(message()).for_operation(self.id.clone()),
            ),
            ScriptedOutcome::Stall => {
                debug!(operation = %self.id, "Stalling invocation");
                std::future::pending().await
            }
        }
    }
}

#[async_trait]
impl ContentOperation for ScriptedContentOperation {
    fn id(&self) -> &OperationId {
        &self.id
    }

    fn add_initial_content(&self, builder: &mut ViewModelBuilder) {
        self.lock_record().initial_content_count += 1;

        builder.set_header(self.initial_header.clone());

        for component in &self.initial_components {
            if builder.append_component(component.clone()).is_err() {
                debug!(
                    operation = %self.id,
                    component = %component.id,
                    "Initial component already present"
                );
            }
        }
    }

    async fn perform_with_connectivity(
        &self,
        connectivity: ConnectivityState,
        previous_error: Option<&ContentOperationError>,
        builder: &mut ViewModelBuilder,
    ) -> ContentOperationOutcome {
        let step = {
            let mut record = self.lock_record();
            record.perform_count += 1;
            record.connectivity_state = Some(connectivity);
            record.previous_error = previous_error.cloned();
            self.step_for(record.perform_count)
        };

        let Some(step) = step else {
            return ContentOperationOutcome::Continue;
        };

        if step.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
        }

        if let Err(e) = self.apply(&step, builder) {
            return ContentOperationOutcome::fail(
                ContentOperationError::fatal(e.to_string()).for_operation(self.id.clone()),
            );
        }

        self.outcome_for(&step).await
    }
}
