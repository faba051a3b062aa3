//! Content chain domain - ordered content operations and their execution state

mod error;
mod executor;
mod machine;
mod metrics;
mod outcome;
mod state;

pub use error::ChainError;
pub use executor::ChainExecutor;
pub use machine::{ChainDirective, ChainStateMachine, Invocation};
pub use self::metrics::{ChainMetrics, OperationMetrics};
pub use outcome::{ChainOutcome, ChainProgress};
pub use state::ChainState;
