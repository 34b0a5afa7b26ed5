//! Walk-length distribution skewed toward short walks.
//!
//! Length `i` in `1..=max` is entered `max - i + 1` times, then one entry is
//! drawn uniformly. For `max = 3` the table is `[1, 1, 1, 2, 2, 3]`.

use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDistribution {
    lengths: Vec<usize>,
}

impl LengthDistribution {
    pub fn new(max_length: usize) -> Self {
        let mut lengths = Vec::with_capacity(max_length * (max_length + 1) / 2);
        for i in 1..=max_length {
            for _ in i..=max_length {
                lengths.push(i);
            }
        }
        Self { lengths }
    }

    /// Draw a length. An empty distribution (max 0) always yields 0.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.lengths.is_empty() {
            return 0;
        }
        self.lengths[rng.gen_range(0..self.lengths.len())]
    }

    /// How many table entries carry `length`.
    pub fn weight(&self, length: usize) -> usize {
        self.lengths.iter().filter(|&&l| l == length).count()
    }

    pub fn max_length(&self) -> usize {
        self.lengths.last().copied().unwrap_or(0)
    }
}
