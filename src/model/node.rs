//! Node in the property graph.

use serde::{Deserialize, Serialize};
use super::{property_map, PropertyMap, Value};

/// Attribute name reserved for the node's own identifier. Never a feature.
pub const ID_ATTRIBUTE: &str = "id";

/// Opaque, globally unique node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self { NodeId(s.to_owned()) }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self { NodeId(s) }
}

/// A node in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyMap::new(),
        }
    }

    /// A node with all its attributes at once.
    pub fn with_properties<K, V>(id: impl Into<NodeId>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            id: id.into(),
            properties: property_map(pairs),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Attributes usable as walk features, sorted by name so enumeration is
    /// stable across calls. The reserved `id` attribute is excluded.
    pub fn feature_attributes(&self) -> Vec<(&str, &Value)> {
        let mut attrs: Vec<(&str, &Value)> = self
            .properties
            .iter()
            .filter(|(k, _)| k.as_str() != ID_ATTRIBUTE)
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        attrs
    }
}
