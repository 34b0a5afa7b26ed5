//! Per-call memo of step enumerations.
//!
//! Scoped to one seed's extraction: the sampler creates a fresh cache per
//! seed and shares it across every walk configuration for that seed, so
//! revisiting a node inside those walks never re-queries the store.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::binning::FeatureBins;
use crate::model::NodeId;
use crate::storage::GraphStore;
use crate::Result;
use super::{StepKind, StepOption};

/// (node, step kind) → enumerated options.
#[derive(Debug, Default)]
pub struct StepCache {
    entries: HashMap<(NodeId, StepKind), Vec<StepOption>>,
    misses: usize,
}

impl StepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for `kind` at `node`, enumerated through the store on first
    /// use only.
    pub async fn options<S: GraphStore>(
        &mut self,
        node: &NodeId,
        kind: StepKind,
        store: &S,
        bins: &FeatureBins,
    ) -> Result<&[StepOption]> {
        match self.entries.entry((node.clone(), kind)) {
            Entry::Occupied(e) => Ok(e.into_mut().as_slice()),
            Entry::Vacant(e) => {
                let options = kind.options(node, store, bins).await?;
                self.misses += 1;
                Ok(e.insert(options).as_slice())
            }
        }
    }

    /// Number of enumerations that went to the store.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
