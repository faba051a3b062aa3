//! View model builder errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewModelError {
    #[error("Component already exists: {0}")]
    DuplicateComponent(String),

    #[error("Component ID cannot be empty")]
    EmptyComponentId,
}

impl ViewModelError {
    pub fn duplicate_component(id: impl Into<String>) -> Self {
        Self::DuplicateComponent(id.into())
    }
}
