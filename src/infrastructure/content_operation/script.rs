//! Chain scripts - declarative descriptions of scripted chains
//!
//! A script lists the operations of a chain, the steps each one plays back,
//! and a connectivity timeline applied after the chain starts. Scripts are
//! read from TOML or JSON depending on the file extension.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ScriptedContentOperation, ScriptedStep};
use crate::domain::{
    ChainError, Component, ConnectivityState, ContentOperation, DomainError, Fields, OperationId,
};

/// Script for a single operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationScript {
    pub id: String,

    #[serde(default)]
    pub initial_header: Fields,

    #[serde(default)]
    pub initial_components: Vec<Component>,

    #[serde(default)]
    pub steps: Vec<ScriptedStep>,
}

impl OperationScript {
    pub fn build(&self) -> Result<ScriptedContentOperation, DomainError> {
        let id = OperationId::new(self.id.clone())?;

        let operation = self.initial_components.iter().cloned().fold(
            ScriptedContentOperation::new(id)
                .with_initial_header(self.initial_header.clone())
                .with_steps(self.steps.iter().cloned()),
            |op, component| op.with_initial_component(component),
        );

        Ok(operation)
    }
}

/// Connectivity change applied `after_ms` milliseconds after the chain starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityEvent {
    pub after_ms: u64,
    pub state: ConnectivityState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_connectivity: Option<ConnectivityState>,

    #[serde(default)]
    pub operations: Vec<OperationScript>,

    #[serde(default)]
    pub connectivity: Vec<ConnectivityEvent>,
}

impl ChainScript {
    /// Load a script, choosing the format from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("json") => Self::from_json(&contents),
            other => Err(DomainError::configuration(format!(
                "Unsupported script format '{}', expected .toml or .json",
                other.unwrap_or_default()
            ))),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, DomainError> {
        toml::from_str(contents)
            .map_err(|e| DomainError::configuration(format!("Invalid TOML script: {}", e)))
    }

    pub fn from_json(contents: &str) -> Result<Self, DomainError> {
        serde_json::from_str(contents)
            .map_err(|e| DomainError::configuration(format!("Invalid JSON script: {}", e)))
    }

    /// Build the scripted operations in declaration order
    pub fn build_operations(&self) -> Result<Vec<Arc<ScriptedContentOperation>>, DomainError> {
        let mut seen = HashSet::new();

        self.operations
            .iter()
            .map(|entry| {
                if !seen.insert(entry.id.as_str()) {
                    return Err(DomainError::from(ChainError::duplicate_operation(
                        entry.id.clone(),
                    )));
                }
                entry.build().map(Arc::new)
            })
            .collect()
    }

    /// Operations as trait objects, ready to hand to an executor
    pub fn content_operations(&self) -> Result<Vec<Arc<dyn ContentOperation>>, DomainError> {
        Ok(self
            .build_operations()?
            .into_iter()
            .map(|op| op as Arc<dyn ContentOperation>)
            .collect())
    }

    /// Connectivity timeline sorted by offset
    pub fn timeline(&self) -> Vec<ConnectivityEvent> {
        let mut events = self.connectivity.clone();
        events.sort_by_key(|e| e.after_ms);
        events
    }
}
