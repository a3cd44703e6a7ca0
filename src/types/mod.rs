//! Strongly-typed building blocks shared by every phase.
//!
//! - Index newtypes keep cell, node and face arrays apart
//! - `Vec2` and `Axis` carry the planar geometry and the sweep direction
//! - `Sides` names per-boundary values instead of array positions
//! - `MaterialArray` is the fixed-width per-material environment slot

mod indices;
mod sides;
mod vec2;

pub use indices::{CellIndex, FaceIndex, NodeIndex};
pub use sides::{Side, Sides};
pub use vec2::{Axis, Vec2};

/// Compile-time cap on the number of materials in a cell.
pub const MAX_MATERIALS: usize = 3;

/// Per-material values of one cell; unused slots stay zero.
pub type MaterialArray = [f64; MAX_MATERIALS];
