pub mod chain;
pub mod connectivity;
pub mod content_operation;
pub mod error;
pub mod view_model;

pub use chain::{
    ChainDirective, ChainError, ChainExecutor, ChainMetrics, ChainOutcome, ChainProgress,
    ChainState, ChainStateMachine, Invocation, OperationMetrics,
};
pub use connectivity::{ConnectivityMonitor, ConnectivityObserver, ConnectivityState};
pub use content_operation::{
    ContentOperation, ContentOperationError, ContentOperationErrorKind, ContentOperationOutcome,
    OperationId, OperationIdError,
};
pub use error::DomainError;
pub use view_model::{
    Component, ComponentKind, Fields, ViewModel, ViewModelBuilder, ViewModelError, fields,
};
