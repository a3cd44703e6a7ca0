//! Boundary conditions.
//!
//! - [`KinematicBc`]: per-side constraint on node velocities (symmetry,
//!   imposed velocity, free surface)
//! - [`FluxBoundary`]: per-side inflow vector added by the remap flux balance

mod flux;
mod kinematic;

pub use flux::FluxBoundary;
pub use kinematic::{apply_node_boundary_conditions, KinematicBc};
