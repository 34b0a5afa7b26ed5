//! # pgwalk — Random-Walk Features from Property Graphs
//!
//! Converts a labeled property graph into fixed-format machine-learning
//! datasets: sparse one-hot walk features plus a parallel label table.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the pipeline and storage
//! 2. **Clean DTOs**: `Node`, `Edge`, `Value` cross all boundaries
//! 3. **Frozen bins**: pass 1 fits, passes 2–3 only read
//! 4. **Injected randomness**: every sampler call takes the caller's `Rng`
//!
//! ## Passes
//!
//! | Pass | Method | Produces |
//! |------|--------|----------|
//! | 1 | `fit` | `FeatureBins` (+ `bins.csv`, `<attribute>.csv`, `relationship.csv`) |
//! | 2 | `sample` | `DatasetAssembler` with one token index per walk configuration |
//! | 3 | `write` | `headerX/Y.csv` and batched `datasetX/Y_<b>.csv` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pgwalk::{FeatureConfig, FeatureExtractor, LabelTable, MemoryStore, Node};
//! use rand::SeedableRng;
//!
//! # async fn example() -> pgwalk::Result<()> {
//! let store = MemoryStore::new();
//! store.insert_node(Node::new("Berlin").with_property("country", "Germany"));
//! store.insert_edge("Berlin", "capitalOf", "Germany");
//!
//! let config = FeatureConfig::default().with_output_dir("out");
//! let extractor = FeatureExtractor::new(store, config)?;
//! let labels = LabelTable::from_csv_path("labels.csv")?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let report = extractor.run(&labels, &mut rng).await?;
//! println!("{} datasets written", report.written.len());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod binning;
pub mod walk;
pub mod dataset;
pub mod config;
pub mod export;
pub mod stats;

use std::collections::BTreeMap;
use std::time::Instant;

use rand::Rng;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Node, NodeId, Edge, Direction, Value, PropertyMap};
pub use storage::{GraphStore, MemoryStore};
pub use binning::{
    AttributeBinner, AttributeBins, Bin, BinStrategy, BinningThresholds, FeatureBins,
    Observations, RelationshipBins, RelationshipLoadChecker,
};
pub use walk::{StepKind, WalkConfig, WalkSampler};
pub use dataset::{
    AssemblyReport, DatasetAssembler, DatasetWriter, EncodedDataset, LabelTable, TokenId, TokenIndex,
};
pub use config::FeatureConfig;
pub use stats::NeighbourhoodCounts;

// ============================================================================
// Top-level extractor handle
// ============================================================================

/// The primary entry point. Wraps a store and a run configuration and
/// drives the three passes.
pub struct FeatureExtractor<S: GraphStore> {
    store: S,
    config: FeatureConfig,
}

impl<S: GraphStore> FeatureExtractor<S> {
    /// Create an extractor; the configuration is validated here.
    pub fn new(store: S, config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Create an extractor with the default configuration.
    pub fn with_store(store: S) -> Self {
        Self { store, config: FeatureConfig::default() }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Pass 1: scan the seeds once, feed both binners, freeze the bins.
    ///
    /// Seeds the store fails on are logged and skipped. When an output
    /// directory is configured the discretizer artefacts are written; a
    /// failure there is logged and does not stop the run.
    pub async fn fit<I>(&self, seeds: I) -> Result<FeatureBins>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let thresholds = self.config.thresholds;
        let mut attributes = AttributeBinner::new(thresholds);
        let mut relationships = RelationshipLoadChecker::new(thresholds.relationship_load);

        let mut start = Instant::now();
        for (i, seed) in seeds.into_iter().enumerate() {
            match self.observe_seed(&seed).await {
                Ok(Some((node, edges))) => {
                    for (attr, value) in node.feature_attributes() {
                        attributes.observe(attr, value);
                    }
                    for edge in &edges {
                        relationships.observe(&edge.rel_type, &edge.other);
                    }
                }
                Ok(None) => tracing::debug!(seed = %seed, "seed not in store"),
                Err(e) => tracing::warn!(seed = %seed, error = %e, "skipping seed while binning"),
            }
            if (i + 1) % self.config.progress_every == 0 {
                tracing::info!(
                    seeds = i + 1,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "seeds scanned for bins"
                );
                start = Instant::now();
            }
        }

        let (attribute_bins, observations) = attributes.build();
        let bins = FeatureBins {
            attributes: attribute_bins,
            relationships: relationships.build(),
        };
        tracing::info!(
            attributes = bins.attributes.len(),
            relationships = bins.relationships.len(),
            "bins built"
        );

        match &self.config.output_dir {
            Some(dir) => {
                if let Err(e) = export::export_discretizer(dir, &bins, observations) {
                    tracing::error!(dir = %dir.display(), error = %e, "cannot write bins");
                }
            }
            None => drop(observations),
        }
        Ok(bins)
    }

    async fn observe_seed(&self, seed: &NodeId) -> Result<Option<(Node, Vec<Edge>)>> {
        let Some(node) = self.store.get_node(seed).await? else {
            return Ok(None);
        };
        let edges = self.store.outgoing_edges(seed).await?;
        Ok(Some((node, edges)))
    }

    /// Pass 2: sample every configured walk set per seed and encode it.
    pub async fn sample<I, R>(&self, bins: &FeatureBins, seeds: I, rng: &mut R) -> DatasetAssembler
    where
        I: IntoIterator<Item = NodeId>,
        R: Rng + ?Sized,
    {
        let sampler = WalkSampler::new(&self.store, bins);
        let configs = self.config.walk_configs();
        let mut assembler = DatasetAssembler::new();

        let mut start = Instant::now();
        for (i, seed) in seeds.into_iter().enumerate() {
            match sampler.walks(&seed, &self.config.allowed_steps, &configs, rng).await {
                Ok(sets) => assembler.encode(&seed, &sets),
                Err(e) => tracing::warn!(seed = %seed, error = %e, "skipping seed while walking"),
            }
            if (i + 1) % self.config.progress_every == 0 {
                tracing::info!(
                    seeds = i + 1,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "seeds walked"
                );
                start = Instant::now();
            }
        }
        assembler
    }

    /// Pass 3: write headers and batched rows for every dataset.
    pub fn write(
        &self,
        labels: &LabelTable,
        datasets: &BTreeMap<String, EncodedDataset>,
    ) -> Result<AssemblyReport> {
        let dir = self
            .config
            .output_dir
            .as_ref()
            .ok_or_else(|| Error::Config("output_dir is required to write datasets".into()))?;
        DatasetWriter::new(dir, &self.config.dataset_name, self.config.batch_size).write(labels, datasets)
    }

    /// All three passes over the label table's ids.
    pub async fn run<R: Rng + ?Sized>(&self, labels: &LabelTable, rng: &mut R) -> Result<AssemblyReport> {
        let bins = self.fit(labels.ids()).await?;
        let assembler = self.sample(&bins, labels.ids(), rng).await;
        self.write(labels, &assembler.into_datasets())
    }

    /// Neighbourhood counts over the given seeds.
    pub async fn neighbourhood_counts<I>(&self, seeds: I) -> NeighbourhoodCounts
    where
        I: IntoIterator<Item = NodeId>,
    {
        NeighbourhoodCounts::collect(&self.store, seeds).await
    }
}

/// In-memory store with the default configuration.
impl FeatureExtractor<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
