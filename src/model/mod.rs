//! # Property Graph Model
//!
//! Clean DTOs for the labeled property graph the feature pipeline reads.
//! These types cross every boundary: store ↔ binning ↔ walk ↔ dataset.
//!
//! Design rule: this module is pure data. No I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId, ID_ATTRIBUTE};
pub use relationship::{Edge, Direction};
pub use value::Value;
pub use property_map::{PropertyMap, property_map};
