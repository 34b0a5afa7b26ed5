//! Run configuration.
//!
//! Every field has a default matching the reference run, so a JSON file
//! only needs the fields it changes:
//!
//! ```json
//! { "dataset_name": "yago", "output_dir": "out", "max_lengths": [2, 5] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::binning::BinningThresholds;
use crate::walk::{StepKind, WalkConfig};
use crate::{Error, Result};

/// Configuration for a feature extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub thresholds: BinningThresholds,
    pub max_lengths: Vec<usize>,
    pub numbers_of_walks: Vec<usize>,
    pub allowed_steps: Vec<StepKind>,
    /// Input rows per output chunk.
    pub batch_size: usize,
    pub dataset_name: String,
    /// Where artefacts go. `None` keeps everything in memory.
    pub output_dir: Option<PathBuf>,
    /// Log progress every this many seeds.
    pub progress_every: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            thresholds: BinningThresholds::default(),
            max_lengths: vec![2],
            numbers_of_walks: vec![10, 25, 50],
            allowed_steps: vec![
                StepKind::HasAttribute,
                StepKind::HasRelationship,
                StepKind::HasIncomingRelationship,
                StepKind::RelationshipStep,
            ],
            batch_size: 5000,
            dataset_name: "dataset".to_string(),
            output_dir: None,
            progress_every: 1000,
        }
    }
}

impl FeatureConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Every (max length, number of walks) pair to sample.
    pub fn walk_configs(&self) -> Vec<WalkConfig> {
        WalkConfig::grid(&self.max_lengths, &self.numbers_of_walks)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, v) in [
            ("numeric_fraction", t.numeric_fraction),
            ("categorical_load", t.categorical_load),
            ("relationship_load", t.relationship_load),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(Error::Config(format!("{name} must be in (0, 1], got {v}")));
            }
        }
        if self.max_lengths.is_empty() || self.max_lengths.contains(&0) {
            return Err(Error::Config("max_lengths must be non-empty and positive".into()));
        }
        if self.numbers_of_walks.is_empty() || self.numbers_of_walks.contains(&0) {
            return Err(Error::Config("numbers_of_walks must be non-empty and positive".into()));
        }
        if self.allowed_steps.is_empty() {
            return Err(Error::Config("allowed_steps must not be empty".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if self.progress_every == 0 {
            return Err(Error::Config("progress_every must be positive".into()));
        }
        if self.dataset_name.is_empty() {
            return Err(Error::Config("dataset_name must not be empty".into()));
        }
        Ok(())
    }
}
