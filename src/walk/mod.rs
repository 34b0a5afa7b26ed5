//! # Walk Sampler
//!
//! Bounded stochastic traversals from a seed node. Each walk is a sequence
//! of step tokens joined into one string:
//!
//! ```text
//! has_country,capitalOf->hasRel_locatedIn,type->id=City
//! └─ stay ──┘ └─ move ──┘└──── stay ───┘ └ move ┘└ terminal ┘
//! ```
//!
//! Non-moving tokens are followed by the `,` separator; moving tokens end in
//! an arrow and are immediately followed by whatever the walk emits at the
//! node it moved to. A walk that ends on a move is closed with
//! `id=<node>` so it always names a concrete fact.

pub mod cache;
pub mod length;
pub mod sampler;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binning::FeatureBins;
use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

pub use cache::StepCache;
pub use length::LengthDistribution;
pub use sampler::WalkSampler;

/// Joins non-moving tokens inside a walk string.
pub const SEPARATOR: char = ',';

// ============================================================================
// StepKind
// ============================================================================

/// The fixed set of step kinds a walk may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// `has_<attr>`, stays on the node.
    HasAttribute,
    /// `<attr>=<bin>`, stays on the node; attributes without a bin are skipped.
    AttributeValue,
    /// `hasRel_<type>` for each distinct outgoing type, stays on the node.
    HasRelationship,
    /// `hasInRel_<type>` for each distinct incoming type, stays on the node.
    HasIncomingRelationship,
    /// `<type>->`, moves to the target. Target-keyed types only.
    RelationshipStep,
    /// `<type><-`, moves to the source. Target-keyed types only.
    IncomingRelationshipStep,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::HasAttribute,
        StepKind::AttributeValue,
        StepKind::HasRelationship,
        StepKind::HasIncomingRelationship,
        StepKind::RelationshipStep,
        StepKind::IncomingRelationshipStep,
    ];

    /// Whether taking this step changes the current node.
    pub fn is_moving(self) -> bool {
        matches!(self, StepKind::RelationshipStep | StepKind::IncomingRelationshipStep)
    }

    /// Enumerate the (token, next node) options this kind offers at `node`.
    ///
    /// A node missing from the store offers nothing. Relationship kinds
    /// report each distinct type (or distinct type/neighbour pair for
    /// moves) once, in sorted order.
    pub async fn options<S: GraphStore>(
        self,
        node: &NodeId,
        store: &S,
        bins: &FeatureBins,
    ) -> Result<Vec<StepOption>> {
        let options = match self {
            StepKind::HasAttribute => match store.get_node(node).await? {
                Some(n) => n
                    .feature_attributes()
                    .into_iter()
                    .map(|(attr, _)| StepOption::stay(format!("has_{attr}")))
                    .collect(),
                None => Vec::new(),
            },
            StepKind::AttributeValue => match store.get_node(node).await? {
                Some(n) => {
                    let mut tokens = Vec::new();
                    for (attr, value) in n.feature_attributes() {
                        for member in value.members() {
                            if let Some(bin) = bins.attributes.get_bin(attr, member) {
                                tokens.push(format!("{attr}={bin}"));
                            }
                        }
                    }
                    dedup_sorted(tokens).into_iter().map(StepOption::stay).collect()
                }
                None => Vec::new(),
            },
            StepKind::HasRelationship => {
                let types = store.outgoing_edges(node).await?.into_iter().map(|e| e.rel_type);
                dedup_sorted(types.map(|t| format!("hasRel_{t}")).collect())
                    .into_iter()
                    .map(StepOption::stay)
                    .collect()
            }
            StepKind::HasIncomingRelationship => {
                let types = store.incoming_edges(node).await?.into_iter().map(|e| e.rel_type);
                dedup_sorted(types.map(|t| format!("hasInRel_{t}")).collect())
                    .into_iter()
                    .map(StepOption::stay)
                    .collect()
            }
            StepKind::RelationshipStep => {
                moves(store.edges(node, Direction::Outgoing).await?, bins, "->")
            }
            StepKind::IncomingRelationshipStep => {
                moves(store.edges(node, Direction::Incoming).await?, bins, "<-")
            }
        };
        Ok(options)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::HasAttribute => "HAS_ATTRIBUTE",
            StepKind::AttributeValue => "ATTRIBUTE_VALUE",
            StepKind::HasRelationship => "HAS_RELATIONSHIP",
            StepKind::HasIncomingRelationship => "HAS_INCOMING_RELATIONSHIP",
            StepKind::RelationshipStep => "RELATIONSHIP_STEP",
            StepKind::IncomingRelationshipStep => "INCOMING_RELATIONSHIP_STEP",
        };
        f.write_str(name)
    }
}

fn dedup_sorted(mut tokens: Vec<String>) -> Vec<String> {
    tokens.sort();
    tokens.dedup();
    tokens
}

fn moves(edges: Vec<Edge>, bins: &FeatureBins, arrow: &str) -> Vec<StepOption> {
    let mut pairs: Vec<(String, NodeId)> = edges
        .into_iter()
        .filter(|e| bins.relationships.can_bin(&e.rel_type))
        .map(|e| (e.rel_type, e.other))
        .collect();
    pairs.sort();
    pairs.dedup();
    pairs
        .into_iter()
        .map(|(rel_type, other)| StepOption::goto(format!("{rel_type}{arrow}"), other))
        .collect()
}

// ============================================================================
// StepOption
// ============================================================================

/// One concrete step available at a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOption {
    pub token: String,
    /// Where the walk continues; `None` for steps that stay on the node.
    pub next: Option<NodeId>,
}

impl StepOption {
    pub fn stay(token: String) -> Self {
        Self { token, next: None }
    }

    pub fn goto(token: String, next: NodeId) -> Self {
        Self { token, next: Some(next) }
    }
}

// ============================================================================
// WalkConfig
// ============================================================================

/// One (max length, number of walks) pair. Each pair yields its own
/// independently keyed walk set and, downstream, its own dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WalkConfig {
    pub max_length: usize,
    pub number_of_walks: usize,
}

impl WalkConfig {
    pub fn new(max_length: usize, number_of_walks: usize) -> Self {
        Self { max_length, number_of_walks }
    }

    /// `"<maxLength>x<numberOfWalks>"`
    pub fn key(&self) -> String {
        format!("{}x{}", self.max_length, self.number_of_walks)
    }

    /// Every combination of the given lengths and walk counts.
    pub fn grid(max_lengths: &[usize], numbers_of_walks: &[usize]) -> Vec<WalkConfig> {
        max_lengths
            .iter()
            .flat_map(|&l| numbers_of_walks.iter().map(move |&n| WalkConfig::new(l, n)))
            .collect()
    }
}
