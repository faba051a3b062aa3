//! Content operation infrastructure implementations

mod script;
mod scripted;

pub use script::{ChainScript, ConnectivityEvent, OperationScript};
pub use scripted::{PerformRecord, ScriptedContentOperation, ScriptedOutcome, ScriptedStep};
