//! Content operation identity and validation

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length for operation IDs
pub const MAX_OPERATION_ID_LENGTH: usize = 64;

/// Regex pattern for valid operation IDs (alphanumeric with `-`, `_` and `.` separators)
static OPERATION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]$|^[a-zA-Z0-9][a-zA-Z0-9._-]*[a-zA-Z0-9]$").unwrap()
});

/// Operation ID validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum OperationIdError {
    /// Operation ID is empty
    EmptyId,
    /// Operation ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// Operation ID contains invalid characters
    InvalidIdFormat { id: String },
}

impl fmt::Display for OperationIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Operation ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Operation ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => write!(
                f,
                "Invalid operation ID format '{}': must be alphanumeric with '-', '_' or '.', cannot start or end with a separator",
                id
            ),
        }
    }
}

impl std::error::Error for OperationIdError {}

/// Validate an operation ID
pub fn validate_operation_id(id: &str) -> Result<(), OperationIdError> {
    if id.is_empty() {
        return Err(OperationIdError::EmptyId);
    }

    if id.len() > MAX_OPERATION_ID_LENGTH {
        return Err(OperationIdError::IdTooLong {
            length: id.len(),
            max: MAX_OPERATION_ID_LENGTH,
        });
    }

    if !OPERATION_ID_PATTERN.is_match(id) {
        return Err(OperationIdError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Identity of a content operation within a chain
///
/// Extension data contributed to a view model is keyed by this identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationId(String);

impl OperationId {
    /// Create a new OperationId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, OperationIdError> {
        let id = id.into();
        validate_operation_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OperationId {
    type Error = OperationIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OperationId> for String {
    fn from(id: OperationId) -> Self {
        id.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
