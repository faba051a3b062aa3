//! View model components

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form component or header fields, merged by key
pub type Fields = Map<String, Value>;

/// Build a field map from key/value pairs
pub fn fields<K, I>(entries: I) -> Fields
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Where a component is placed in the rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Part of the scrollable body
    #[default]
    Body,
    /// Rendered on top of the body
    Overlay,
}

/// A single UI component contributed by a content operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Identifier, unique within a view model
    pub id: String,

    #[serde(default)]
    pub kind: ComponentKind,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Fields,
}

impl Component {
    /// Create a body component with no fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ComponentKind::Body,
            fields: Fields::new(),
        }
    }

    /// Create an overlay component with no fields
    pub fn overlay(id: impl Into<String>) -> Self {
        Self::new(id).with_kind(ComponentKind::Overlay)
    }

    pub fn with_kind(mut self, kind: ComponentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.merge_fields(fields);
        self
    }

    /// Overwrite fields by key, keeping fields not present in `fields`
    pub fn merge_fields(&mut self, fields: Fields) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
