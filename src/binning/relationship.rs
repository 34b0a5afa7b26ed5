//! Relationship load: decides which relationship types may be keyed by the
//! identity of the node they lead to.
//!
//! Load is unique-targets / total-edges per relationship type. Hub types
//! (every city is `type`-linked to the same class node) have a low load and
//! are rare enough in distinct targets to be discriminative per target;
//! everything else only contributes type-presence tokens.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::NodeId;

/// Per relationship-type fan-out statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationshipLoad {
    pub load: f64,
    pub unique_targets: usize,
    pub total: usize,
}

/// Pass 1 accumulator over (relationship type, target id) observations.
#[derive(Debug)]
pub struct RelationshipLoadChecker {
    threshold: f64,
    targets: HashMap<String, HashMap<NodeId, usize>>,
}

impl RelationshipLoadChecker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            targets: HashMap::new(),
        }
    }

    pub fn observe(&mut self, rel_type: &str, target: &NodeId) {
        let counts = self.targets.entry_ref(rel_type).or_default();
        *counts.entry(target.clone()).or_insert(0) += 1;
    }

    /// Compute loads and freeze. Target sets are dropped here.
    pub fn build(self) -> RelationshipBins {
        let mut loads = BTreeMap::new();
        let mut binnable = BTreeSet::new();

        for (rel_type, counts) in self.targets {
            let unique_targets = counts.len();
            let total: usize = counts.values().sum();
            let load = unique_targets as f64 / total as f64;

            if load < self.threshold {
                tracing::info!(
                    relationship = %rel_type,
                    load,
                    unique_targets,
                    "relationship keyed by target"
                );
                binnable.insert(rel_type.clone());
            }
            loads.insert(rel_type, RelationshipLoad { load, unique_targets, total });
        }

        RelationshipBins { loads, binnable }
    }
}

/// Frozen relationship loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipBins {
    loads: BTreeMap<String, RelationshipLoad>,
    binnable: BTreeSet<String>,
}

impl RelationshipBins {
    /// True when walks may emit target-keyed steps for this type.
    pub fn can_bin(&self, rel_type: &str) -> bool {
        self.binnable.contains(rel_type)
    }

    /// The target id when the type is target-keyed, otherwise `None`.
    pub fn get_bin<'a>(&self, rel_type: &str, target: &'a NodeId) -> Option<&'a NodeId> {
        self.can_bin(rel_type).then_some(target)
    }

    pub fn load(&self, rel_type: &str) -> Option<&RelationshipLoad> {
        self.loads.get(rel_type)
    }

    /// All observed types with their loads, by type name.
    pub fn loads(&self) -> impl Iterator<Item = (&str, &RelationshipLoad)> {
        self.loads.iter().map(|(t, l)| (t.as_str(), l))
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}
