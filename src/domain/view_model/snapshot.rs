//! Immutable view model produced by a builder

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Component, ComponentKind, Fields};
use crate::domain::content_operation::OperationId;

/// Snapshot of everything the content operations of a chain contributed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_title: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub header: Fields,

    /// Components in contribution order
    #[serde(default)]
    pub components: Vec<Component>,

    /// Extension data keyed by the operation that contributed it
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extension_data: BTreeMap<OperationId, Value>,
}

impl ViewModel {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn component_ids(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn body_components(&self) -> impl Iterator<Item = &Component> {
        self.components_of_kind(ComponentKind::Body)
    }

    pub fn overlay_components(&self) -> impl Iterator<Item = &Component> {
        self.components_of_kind(ComponentKind::Overlay)
    }

    fn components_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
            && self.components.is_empty()
            && self.extension_data.is_empty()
            && self.navigation_title.is_none()
    }
}
