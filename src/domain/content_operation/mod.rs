//! Content operation domain - the capability implemented by each chain stage

mod entity;
mod error;
mod operation;

pub use entity::{MAX_OPERATION_ID_LENGTH, OperationId, OperationIdError, validate_operation_id};
pub use error::{ContentOperationError, ContentOperationErrorKind};
pub use operation::{ContentOperation, ContentOperationOutcome};
