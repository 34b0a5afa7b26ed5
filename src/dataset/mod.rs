//! # Dataset Assembler
//!
//! Turns per-seed walk sets into sparse one-hot rows.
//!
//! Every walk configuration gets its own dataset: a token index (walk string
//! → dense id, first-seen order, starting at 1) and one sparse row per seed.
//! Rows and labels are written in batches by `DatasetWriter`.

pub mod labels;
pub mod writer;

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::walk::sampler::WalkSets;

pub use labels::LabelTable;
pub use writer::{AssemblyReport, DatasetSummary, DatasetWriter};

// ============================================================================
// TokenIndex
// ============================================================================

/// Dense walk id. Never zero, so `Option<TokenId>` marks an empty slot at no
/// extra cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(NonZeroUsize);

impl TokenId {
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Column name used in headers: `walk_<id>`.
    pub fn short_name(self) -> String {
        format!("walk_{}", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Walk string → id, assigned in first-seen order. Grows monotonically.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    ids: HashMap<String, TokenId>,
    tokens: Vec<String>,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of `token`, assigning the next one if unseen.
    pub fn intern(&mut self, token: &str) -> TokenId {
        if let Some(id) = self.ids.get(token) {
            return *id;
        }
        let id = TokenId(NonZeroUsize::MIN.saturating_add(self.tokens.len()));
        self.tokens.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        id
    }

    pub fn get(&self, token: &str) -> Option<TokenId> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id.get() - 1).map(String::as_str)
    }

    /// (id, walk string) in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (TokenId(NonZeroUsize::MIN.saturating_add(i)), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ============================================================================
// SparseRow
// ============================================================================

/// Fixed-length slot array sized to a seed's walk set when it was encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseRow {
    slots: Box<[Option<TokenId>]>,
}

impl SparseRow {
    pub fn with_len(len: usize) -> Self {
        Self { slots: vec![None; len].into_boxed_slice() }
    }

    pub fn set(&mut self, slot: usize, id: TokenId) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(id);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distinct filled ids, ascending.
    pub fn token_ids(&self) -> Vec<TokenId> {
        let mut ids: Vec<TokenId> = self.slots.iter().flatten().copied().collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

// ============================================================================
// DatasetAssembler
// ============================================================================

/// One configuration's token index and rows.
#[derive(Debug, Clone, Default)]
pub struct EncodedDataset {
    pub index: TokenIndex,
    rows: HashMap<NodeId, SparseRow>,
}

impl EncodedDataset {
    pub fn row(&self, node: &NodeId) -> Option<&SparseRow> {
        self.rows.get(node)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Accumulates encoded rows for every configuration key.
#[derive(Debug, Default)]
pub struct DatasetAssembler {
    datasets: BTreeMap<String, EncodedDataset>,
}

impl DatasetAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one seed's walk sets. Empty sets produce no row. Encoding the
    /// same seed again replaces its row.
    pub fn encode(&mut self, node: &NodeId, walk_sets: &WalkSets) {
        for (key, walks) in walk_sets {
            if walks.is_empty() {
                continue;
            }
            let dataset = self.datasets.entry(key.clone()).or_default();
            let mut row = SparseRow::with_len(walks.len());
            for (slot, walk) in walks.iter().enumerate() {
                row.set(slot, dataset.index.intern(walk));
            }
            tracing::trace!(node = %node, key = %key, walks = walks.len(), "encoded row");
            dataset.rows.insert(node.clone(), row);
        }
    }

    pub fn dataset(&self, key: &str) -> Option<&EncodedDataset> {
        self.datasets.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// Hand the owned tables back to the caller.
    pub fn into_datasets(self) -> BTreeMap<String, EncodedDataset> {
        self.datasets
    }
}
