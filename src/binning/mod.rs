//! # Discretizer
//!
//! Turns raw attribute values and relationship fan-out into small, stable
//! symbolic buckets that walk tokens can carry.
//!
//! ```text
//! pass 1: observe(attr, value) ... observe(attr, value)
//!         build() → AttributeBins (frozen) + Observations (report only)
//! pass 2: get_bin(attr, value) → bin_<k> | outlier_l | outlier_u | outlier_s | <category>
//! ```
//!
//! Per attribute, exactly one strategy is chosen at build time:
//!
//! | Strategy | Chosen when | `get_bin` yields |
//! |----------|-------------|------------------|
//! | `Numeric` | enough distinct values coerce to numbers | quantile-based buckets |
//! | `Categorical` | values repeat (low load) | the trimmed value itself |
//! | `Skip` | values are nearly all unique | `None` |

pub mod relationship;

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::Value;

pub use relationship::{RelationshipBins, RelationshipLoad, RelationshipLoadChecker};

// ============================================================================
// Thresholds
// ============================================================================

/// Empirical cut-offs for choosing a binning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningThresholds {
    /// Minimum share of distinct values that must be numeric for quantile binning.
    pub numeric_fraction: f64,
    /// Attributes with distinct/total below this are passed through as categories.
    pub categorical_load: f64,
    /// Relationship types with unique-targets/total below this may be keyed by target.
    pub relationship_load: f64,
}

impl Default for BinningThresholds {
    fn default() -> Self {
        Self {
            numeric_fraction: 0.95,
            categorical_load: 0.9,
            relationship_load: 0.2,
        }
    }
}

// ============================================================================
// Bin
// ============================================================================

/// The symbolic bucket a value falls into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bin {
    /// Ordinal numeric bucket `bin_<k>`.
    Index(usize),
    /// Below the first edge.
    OutlierLow,
    /// At or above the last edge.
    OutlierHigh,
    /// Not a number where a number was expected.
    OutlierString,
    /// Categorical pass-through (already trimmed).
    Category(String),
}

impl Bin {
    /// Token form used inside walks and reports.
    pub fn token(&self) -> String {
        match self {
            Bin::Index(k) => format!("bin_{k}"),
            Bin::OutlierLow => "outlier_l".to_string(),
            Bin::OutlierHigh => "outlier_u".to_string(),
            Bin::OutlierString => "outlier_s".to_string(),
            Bin::Category(value) => identifier(value),
        }
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ============================================================================
// Observed values
// ============================================================================

/// A distinct observed value. Strings that read as numbers are stored as
/// numbers, so `"100"` and `100` are the same observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservedValue {
    Number(f64),
    Text(String),
}

impl ObservedValue {
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        if let Some(n) = value.coerce_number() {
            // -0.0 and 0.0 are one observation
            return Some(ObservedValue::Number(if n == 0.0 { 0.0 } else { n }));
        }
        Some(ObservedValue::Text(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ObservedValue::Number(n) => Some(*n),
            ObservedValue::Text(_) => None,
        }
    }

    /// Back to a `Value` for re-binning.
    pub fn to_value(&self) -> Value {
        match self {
            ObservedValue::Number(n) => Value::Float(*n),
            ObservedValue::Text(s) => Value::String(s.clone()),
        }
    }
}

// Numbers are never NaN here (coerce_number filters non-finite values),
// so bitwise equality is a lawful Eq.
impl Eq for ObservedValue {}

impl Hash for ObservedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ObservedValue::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            ObservedValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Number(n) => write!(f, "{n}"),
            ObservedValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Occurrence counts per distinct value, per attribute.
///
/// Handed out by `AttributeBinner::build` only so the per-value report can
/// be written; drop it as soon as that is done.
#[derive(Debug, Default)]
pub struct Observations {
    values: BTreeMap<String, HashMap<ObservedValue, usize>>,
}

impl Observations {
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Distinct values of one attribute: numbers ascending, then texts
    /// lexicographically.
    pub fn values(&self, attribute: &str) -> Vec<&ObservedValue> {
        let mut vs: Vec<&ObservedValue> = self
            .values
            .get(attribute)
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        vs.sort_by(|a, b| match (a, b) {
            (ObservedValue::Number(x), ObservedValue::Number(y)) => x.total_cmp(y),
            (ObservedValue::Number(_), ObservedValue::Text(_)) => std::cmp::Ordering::Less,
            (ObservedValue::Text(_), ObservedValue::Number(_)) => std::cmp::Ordering::Greater,
            (ObservedValue::Text(x), ObservedValue::Text(y)) => x.cmp(y),
        });
        vs
    }

    pub fn count(&self, attribute: &str, value: &ObservedValue) -> usize {
        self.values
            .get(attribute)
            .and_then(|m| m.get(value))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// AttributeBinner (pass 1 accumulator)
// ============================================================================

/// Collects (attribute, value) observations and fits bins once.
#[derive(Debug, Default)]
pub struct AttributeBinner {
    thresholds: BinningThresholds,
    observed: Observations,
}

impl AttributeBinner {
    pub fn new(thresholds: BinningThresholds) -> Self {
        Self {
            thresholds,
            observed: Observations::default(),
        }
    }

    /// Record one attribute value. Lists are offered element-wise; nulls
    /// are ignored.
    pub fn observe(&mut self, attribute: &str, value: &Value) {
        for member in value.members() {
            let Some(key) = ObservedValue::from_value(member) else { continue };
            let counts = self.observed.values.entry(attribute.to_string()).or_default();
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    /// Fit every attribute's strategy. Consumes the binner: the raw
    /// observation sets are returned separately and are not retained by
    /// the frozen bins.
    pub fn build(self) -> (AttributeBins, Observations) {
        let mut strategies = BTreeMap::new();

        for (attribute, counts) in &self.observed.values {
            let distinct = counts.len();
            let mut numbers: Vec<f64> = counts.keys().filter_map(ObservedValue::as_number).collect();

            let strategy = if distinct > 0
                && numbers.len() as f64 / distinct as f64 >= self.thresholds.numeric_fraction
            {
                numbers.sort_by(f64::total_cmp);
                BinStrategy::Numeric(numeric_edges(&numbers))
            } else {
                let total: usize = counts.values().sum();
                let load = distinct as f64 / total as f64;
                if load < self.thresholds.categorical_load {
                    BinStrategy::Categorical
                } else {
                    BinStrategy::Skip
                }
            };
            tracing::debug!(attribute = %attribute, ?strategy, distinct, "fitted attribute");
            strategies.insert(attribute.clone(), strategy);
        }

        (AttributeBins { strategies }, self.observed)
    }
}

/// Quartile-based edges over sorted distinct numbers: IQR fences at 1.5·IQR
/// and a third of the Freedman–Diaconis width, at least one edge. Ranges
/// too wide for `f64` collapse to the single edge `[q1]`.
fn numeric_edges(sorted: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[n * 3 / 4];
    let iqr = q3 - q1;
    let low = q1 - 1.5 * iqr;
    let high = q3 + 1.5 * iqr;
    let width = (2.0 * iqr / (n as f64).cbrt()) / 3.0;
    if !(low.is_finite() && high.is_finite() && width.is_finite()) {
        return vec![q1];
    }

    let count = ((high - low) / width).ceil();
    let count = if count.is_finite() && count >= 1.0 { count as usize } else { 1 };

    let mut edges = Vec::with_capacity(count);
    edges.push(low);
    for i in 1..count {
        let next = edges[i - 1] + width;
        if !next.is_finite() {
            break;
        }
        edges.push(next);
    }
    edges
}

// ============================================================================
// AttributeBins (frozen)
// ============================================================================

/// How one attribute is discretized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinStrategy {
    /// Non-decreasing bin edges.
    Numeric(Vec<f64>),
    Categorical,
    Skip,
}

/// Frozen per-attribute strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeBins {
    strategies: BTreeMap<String, BinStrategy>,
}

impl AttributeBins {
    /// Resolve a value to its bin. `None` means the attribute is not a
    /// feature source (never observed, or too unique to bin).
    pub fn get_bin(&self, attribute: &str, value: &Value) -> Option<Bin> {
        match self.strategies.get(attribute)? {
            BinStrategy::Numeric(edges) => Some(match value.coerce_number() {
                Some(n) => numeric_bin(edges, n),
                None => Bin::OutlierString,
            }),
            BinStrategy::Categorical => {
                let text = match value {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string().trim().to_string(),
                };
                Some(Bin::Category(text))
            }
            BinStrategy::Skip => None,
        }
    }

    pub fn strategy(&self, attribute: &str) -> Option<&BinStrategy> {
        self.strategies.get(attribute)
    }

    pub fn edges(&self, attribute: &str) -> Option<&[f64]> {
        match self.strategies.get(attribute)? {
            BinStrategy::Numeric(edges) => Some(edges),
            _ => None,
        }
    }

    /// Numerically binned attributes with their edges, by attribute name.
    pub fn numeric(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.strategies.iter().filter_map(|(a, s)| match s {
            BinStrategy::Numeric(edges) => Some((a.as_str(), edges.as_slice())),
            _ => None,
        })
    }

    /// True when `get_bin` can return a bin for this attribute.
    pub fn is_binned(&self, attribute: &str) -> bool {
        matches!(
            self.strategies.get(attribute),
            Some(BinStrategy::Numeric(_) | BinStrategy::Categorical)
        )
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

fn numeric_bin(edges: &[f64], n: f64) -> Bin {
    let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
        return Bin::OutlierString;
    };
    if n < *first {
        return Bin::OutlierLow;
    }
    if n >= *last {
        return Bin::OutlierHigh;
    }
    // edges[i] <= n < edges[i + 1]
    Bin::Index(edges.partition_point(|e| *e <= n) - 1)
}

// ============================================================================
// FeatureBins
// ============================================================================

/// Everything pass 1 produces, frozen for the walk sampler.
#[derive(Debug, Clone, Default)]
pub struct FeatureBins {
    pub attributes: AttributeBins,
    pub relationships: RelationshipBins,
}
