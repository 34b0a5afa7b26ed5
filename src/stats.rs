//! Neighbourhood counts over a seed list.
//!
//! How many distinct `has_<attr>`, `hasRel_<type>` and `hasInRel_<type>`
//! facts an average seed carries. The reserved `id` attribute is not a
//! fact. Useful for sizing `max_lengths` and `numbers_of_walks` before a
//! full run.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::NodeId;
use crate::storage::GraphStore;

/// Sum and number of contributing seeds for one fact family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FactCount {
    /// Distinct facts summed over seeds.
    pub facts: usize,
    /// Seeds with at least one such fact.
    pub seeds: usize,
}

impl FactCount {
    fn add(&mut self, facts: usize) {
        self.facts += facts;
        if facts > 0 {
            self.seeds += 1;
        }
    }

    /// Average over contributing seeds; 0 when none contributed.
    pub fn average(&self) -> f64 {
        if self.seeds == 0 {
            0.0
        } else {
            self.facts as f64 / self.seeds as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NeighbourhoodCounts {
    /// Seeds found in the store.
    pub instances: usize,
    /// Seeds skipped because the store failed.
    pub unavailable: usize,
    pub attributes: FactCount,
    pub relationships: FactCount,
    pub incoming_relationships: FactCount,
    pub combined: FactCount,
}

impl NeighbourhoodCounts {
    /// One pass over `seeds`. Store failures skip the seed.
    pub async fn collect<S, I>(store: &S, seeds: I) -> Self
    where
        S: GraphStore,
        I: IntoIterator<Item = NodeId>,
    {
        let mut counts = Self::default();
        for seed in seeds {
            match Self::facts(store, &seed).await {
                Ok(Some((attrs, rels, in_rels))) => {
                    counts.instances += 1;
                    counts.attributes.add(attrs);
                    counts.relationships.add(rels);
                    counts.incoming_relationships.add(in_rels);
                    counts.combined.add(attrs + rels + in_rels);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(seed = %seed, error = %e, "skipping seed");
                    counts.unavailable += 1;
                }
            }
        }

        tracing::info!(
            instances = counts.instances,
            attributes = counts.attributes.average(),
            relationships = counts.relationships.average(),
            incoming = counts.incoming_relationships.average(),
            combined = counts.combined.average(),
            "neighbourhood counts"
        );
        counts
    }

    async fn facts<S: GraphStore>(store: &S, seed: &NodeId) -> crate::Result<Option<(usize, usize, usize)>> {
        let Some(node) = store.get_node(seed).await? else {
            return Ok(None);
        };
        let attrs = node.feature_attributes().len();
        let rels: BTreeSet<String> = store.outgoing_edges(seed).await?.into_iter().map(|e| e.rel_type).collect();
        let in_rels: BTreeSet<String> = store.incoming_edges(seed).await?.into_iter().map(|e| e.rel_type).collect();
        Ok(Some((attrs, rels.len(), in_rels.len())))
    }
}
