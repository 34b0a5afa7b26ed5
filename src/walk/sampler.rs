//! Random-walk sampling from a seed node.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use smallvec::SmallVec;

use crate::binning::FeatureBins;
use crate::model::NodeId;
use crate::storage::GraphStore;
use crate::Result;
use super::{LengthDistribution, StepCache, StepKind, WalkConfig, SEPARATOR};

/// Walk sets for one seed, keyed by `WalkConfig::key()`.
pub type WalkSets = BTreeMap<String, BTreeSet<String>>;

/// Samples walks against a store using frozen bins.
pub struct WalkSampler<'a, S: GraphStore> {
    store: &'a S,
    bins: &'a FeatureBins,
}

impl<'a, S: GraphStore> WalkSampler<'a, S> {
    pub fn new(store: &'a S, bins: &'a FeatureBins) -> Self {
        Self { store, bins }
    }

    /// Walk sets for every configuration, sharing one step cache.
    ///
    /// A seed missing from the store yields an empty map. Store failures
    /// are returned to the caller, which decides whether to skip the seed.
    pub async fn walks<R: Rng + ?Sized>(
        &self,
        seed: &NodeId,
        allowed: &[StepKind],
        configs: &[WalkConfig],
        rng: &mut R,
    ) -> Result<WalkSets> {
        let mut sets = WalkSets::new();
        if self.store.get_node(seed).await?.is_none() {
            tracing::debug!(seed = %seed, "seed not in store");
            return Ok(sets);
        }

        let mut cache = StepCache::new();
        for config in configs {
            let walks = self.walks_for(seed, allowed, *config, &mut cache, rng).await?;
            sets.insert(config.key(), walks);
        }
        tracing::debug!(seed = %seed, enumerations = cache.misses(), "sampled walks");
        Ok(sets)
    }

    /// Distinct non-empty walks for one configuration.
    pub async fn walks_for<R: Rng + ?Sized>(
        &self,
        seed: &NodeId,
        allowed: &[StepKind],
        config: WalkConfig,
        cache: &mut StepCache,
        rng: &mut R,
    ) -> Result<BTreeSet<String>> {
        let lengths = LengthDistribution::new(config.max_length);
        let mut walks = BTreeSet::new();

        for _ in 0..config.number_of_walks {
            let length = lengths.sample(rng);
            if let Some(walk) = self.walk_once(seed, allowed, length, cache, rng).await? {
                walks.insert(walk);
            }
        }
        Ok(walks)
    }

    /// One walk of at most `length` steps. Steps whose kind has no options
    /// at the current node are consumed without emitting anything.
    async fn walk_once<R: Rng + ?Sized>(
        &self,
        seed: &NodeId,
        allowed: &[StepKind],
        length: usize,
        cache: &mut StepCache,
        rng: &mut R,
    ) -> Result<Option<String>> {
        if allowed.is_empty() {
            return Ok(None);
        }

        let mut current = seed.clone();
        let mut buffer = WalkBuffer::default();

        for _ in 0..length {
            let kind = allowed[rng.gen_range(0..allowed.len())];
            let options = cache.options(&current, kind, self.store, self.bins).await?;
            if options.is_empty() {
                continue;
            }
            let option = &options[rng.gen_range(0..options.len())];
            buffer.push(option.token.clone(), option.next.is_some());
            if let Some(next) = &option.next {
                current = next.clone();
            }
        }

        Ok(buffer.finish(&current))
    }
}

/// Tokens of the walk in progress.
#[derive(Debug, Default)]
struct WalkBuffer {
    steps: SmallVec<[(String, bool); 8]>,
}

impl WalkBuffer {
    fn push(&mut self, token: String, moved: bool) {
        self.steps.push((token, moved));
    }

    /// Render the walk string. Moving tokens run straight into the next
    /// token; a walk that ends on a move gets `id=<end node>` appended.
    fn finish(self, end: &NodeId) -> Option<String> {
        let ends_on_move = self.steps.last().map(|(_, moved)| *moved)?;

        let mut walk = String::new();
        for (token, moved) in &self.steps {
            walk.push_str(token);
            if !moved {
                walk.push(SEPARATOR);
            }
        }
        if walk.ends_with(SEPARATOR) {
            walk.pop();
        }
        if ends_on_move {
            walk.push_str("id=");
            walk.push_str(end.as_str());
        }
        (!walk.is_empty()).then_some(walk)
    }
}
