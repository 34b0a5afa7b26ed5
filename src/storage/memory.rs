//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No deduplication**: inserting the same (source, type, target) twice
//!   stores two edges, like a real store without uniqueness constraints.
//! - **Dangling edges allowed**: an edge may point at an id that was never
//!   inserted as a node. Walks that step there find no attributes.
//!
//! Use this store for:
//! - Testing the binning, walk and dataset layers
//! - Embedding the pipeline over graphs that fit in memory

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::model::*;
use crate::Result;
use super::GraphStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory property graph.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    /// node id → outgoing (type, target)
    outgoing: RwLock<HashMap<NodeId, Vec<Edge>>>,
    /// node id → incoming (type, source)
    incoming: RwLock<HashMap<NodeId, Vec<Edge>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, node: Node) {
        self.inner.nodes.write().insert(node.id.clone(), node);
    }

    /// Insert a directed edge `src -[rel_type]-> dst`.
    pub fn insert_edge(&self, src: impl Into<NodeId>, rel_type: &str, dst: impl Into<NodeId>) {
        let src = src.into();
        let dst = dst.into();
        self.inner
            .outgoing
            .write()
            .entry(src.clone())
            .or_default()
            .push(Edge::new(rel_type, dst.clone()));
        self.inner
            .incoming
            .write()
            .entry(dst)
            .or_default()
            .push(Edge::new(rel_type, src));
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.outgoing.read().values().map(Vec::len).sum()
    }

    /// All node ids, sorted.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.inner.nodes.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(id).cloned())
    }

    async fn outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>> {
        Ok(self.inner.outgoing.read().get(id).cloned().unwrap_or_default())
    }

    async fn incoming_edges(&self, id: &NodeId) -> Result<Vec<Edge>> {
        Ok(self.inner.incoming.read().get(id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================
