//! Typed directed edges, as seen from one endpoint.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Traversal direction relative to the node being enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One edge incident to a node: its relationship type and the node at the
/// other end (target for outgoing edges, source for incoming ones).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub rel_type: String,
    pub other: NodeId,
}

impl Edge {
    pub fn new(rel_type: impl Into<String>, other: impl Into<NodeId>) -> Self {
        Self {
            rel_type: rel_type.into(),
            other: other.into(),
        }
    }
}
