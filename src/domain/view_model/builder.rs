//! Mutable view model accumulator shared by the operations of a chain

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::ViewModelError;
use super::{Component, Fields, ViewModel};
use crate::domain::content_operation::OperationId;

/// Accumulates header fields, components and extension data
///
/// Components are append-only: a later write to an existing component id
/// overwrites fields on that component but never removes it or changes its
/// position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewModelBuilder {
    view_identifier: Option<String>,
    navigation_title: Option<String>,
    header: Fields,
    components: Vec<Component>,
    extension_data: BTreeMap<OperationId, Value>,
}

impl ViewModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for the view with the given identifier
    pub fn for_view(view_identifier: impl Into<String>) -> Self {
        Self {
            view_identifier: Some(view_identifier.into()),
            ..Self::default()
        }
    }

    pub fn view_identifier(&self) -> Option<&str> {
        self.view_identifier.as_deref()
    }

    pub fn set_view_identifier(&mut self, view_identifier: impl Into<String>) {
        self.view_identifier = Some(view_identifier.into());
    }

    pub fn navigation_title(&self) -> Option<&str> {
        self.navigation_title.as_deref()
    }

    pub fn set_navigation_title(&mut self, title: impl Into<String>) {
        self.navigation_title = Some(title.into());
    }

    pub fn header(&self) -> &Fields {
        &self.header
    }

    /// Merge fields into the header, later writes win
    pub fn set_header(&mut self, fields: Fields) {
        for (key, value) in fields {
            self.header.insert(key, value);
        }
    }

    pub fn set_header_field(&mut self, key: impl Into<String>, value: Value) {
        self.header.insert(key.into(), value);
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn contains_component(&self, id: &str) -> bool {
        self.component(id).is_some()
    }

    /// Append a new component at the end
    pub fn append_component(&mut self, component: Component) -> Result<(), ViewModelError> {
        if component.id.is_empty() {
            return Err(ViewModelError::EmptyComponentId);
        }

        if self.contains_component(&component.id) {
            return Err(ViewModelError::duplicate_component(component.id));
        }

        self.components.push(component);
        Ok(())
    }

    /// Overwrite fields on the component with the given id
    ///
    /// A component that does not exist yet is appended as a body component.
    pub fn upsert_component(
        &mut self,
        id: impl Into<String>,
        fields: Fields,
    ) -> Result<(), ViewModelError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ViewModelError::EmptyComponentId);
        }

        match self.components.iter_mut().find(|c| c.id == id) {
            Some(existing) => existing.merge_fields(fields),
            None => self.components.push(Component::new(id).with_fields(fields)),
        }

        Ok(())
    }

    pub fn extension_data(&self, operation_id: &OperationId) -> Option<&Value> {
        self.extension_data.get(operation_id)
    }

    pub fn set_extension_data(&mut self, operation_id: OperationId, data: Value) {
        self.extension_data.insert(operation_id, data);
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
            && self.components.is_empty()
            && self.extension_data.is_empty()
            && self.navigation_title.is_none()
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> ViewModel {
        ViewModel {
            view_identifier: self.view_identifier.clone(),
            navigation_title: self.navigation_title.clone(),
            header: self.header.clone(),
            components: self.components.clone(),
            extension_data: self.extension_data.clone(),
        }
    }
}
