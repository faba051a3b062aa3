use thiserror::Error;

use super::chain::ChainError;
use super::content_operation::OperationIdError;
use super::view_model::ViewModelError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid operation ID: {0}")]
    InvalidOperationId(#[from] OperationIdError),

    #[error(transparent)]
    ViewModel(#[from] ViewModelError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("unknown script format 'yaml'");
        assert_eq!(
            error.to_string(),
            "Configuration error: unknown script format 'yaml'"
        );
    }

    #[test]
    fn test_from_operation_id_error() {
        let error: DomainError = OperationIdError::EmptyId.into();
        assert_eq!(
            error.to_string(),
            "Invalid operation ID: Operation ID cannot be empty"
        );
    }

    #[test]
    fn test_chain_error_is_transparent() {
        let error: DomainError = ChainError::duplicate_operation("feed").into();
        assert_eq!(error.to_string(), "Duplicate operation in chain: feed");
    }
}
