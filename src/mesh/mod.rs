//! Mesh topology and moving-mesh geometry.

mod cartesian;
pub mod geometry;
mod topology;

pub use cartesian::CartesianMesh2D;
pub use topology::{MeshTopology, FACE_BOTTOM, FACE_LEFT, FACE_RIGHT, FACE_TOP};
