//! # Property Graph Store Trait
//!
//! This is THE contract between the feature pipeline and whatever holds the
//! graph. The core only reads: node lookup by id, attribute access, and
//! typed-edge enumeration in both directions. Ingestion (upserts, literal
//! coercion, URI cleanup) lives outside this crate.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |
//!
//! Remote adapters (Bolt, HTTP) implement the same trait; each call is one
//! round-trip and is awaited before the walk continues.

pub mod memory;

use async_trait::async_trait;
use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The read-only store contract.
///
/// Adapters report transient failures as `Error::StoreUnavailable`; callers
/// decide whether to skip the affected node. A node that does not exist is
/// `Ok(None)` from `get_node` and an empty edge list from the enumerations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Get a node by id. Returns None if not found.
    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>>;

    /// Outgoing edges as (relationship type, target id). Parallel edges of
    /// the same type are reported individually.
    async fn outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>>;

    /// Incoming edges as (relationship type, source id).
    async fn incoming_edges(&self, id: &NodeId) -> Result<Vec<Edge>>;

    /// Edges in one direction.
    async fn edges(&self, id: &NodeId, dir: Direction) -> Result<Vec<Edge>> {
        match dir {
            Direction::Outgoing => self.outgoing_edges(id).await,
            Direction::Incoming => self.incoming_edges(id).await,
        }
    }
}
