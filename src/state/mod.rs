//! Simulation state: double-buffered fields, masses and time bookkeeping.
//!
//! - [`Fields`]: cell, material and node arrays of one time level
//! - [`DoubleBuffer`]: `n` / `n+1` pair swapped at the end of a step
//! - [`LagrangianMasses`]: cell, material and node masses
//! - [`SimulationState`]: time, Δt, step counter, sweep order

mod buffer;
mod fields;
mod time;

pub use buffer::DoubleBuffer;
pub use fields::{CellFields, Fields, LagrangianMasses, MaterialFields, NodeFields};
pub use time::SimulationState;

use crate::mesh::MeshTopology;
use crate::types::Vec2;

/// All per-run arrays of the hydrodynamics solver.
#[derive(Clone, Debug)]
pub struct HydroState {
    pub nbmat: usize,
    pub fields: DoubleBuffer<Fields>,
    pub masses: LagrangianMasses,
    /// Eulerian node coordinates the remap projects onto
    pub reference_position: Vec<Vec2>,
}

impl HydroState {
    /// Allocate every array for `mesh`, nodes at `reference_position`.
    pub fn new<M: MeshTopology + ?Sized>(mesh: &M, nbmat: usize, reference_position: Vec<Vec2>) -> Self {
        let fields = Fields {
            cells: CellFields::new(mesh.n_cells()),
            nodes: NodeFields::new(reference_position.clone()),
        };
        Self {
            nbmat,
            fields: DoubleBuffer::new(fields),
            masses: LagrangianMasses::new(mesh.n_cells(), mesh.n_nodes()),
            reference_position,
        }
    }

    /// Level `n`.
    #[inline]
    pub fn current(&self) -> &Fields {
        self.fields.current()
    }

    /// Level `n+1`.
    #[inline]
    pub fn next(&self) -> &Fields {
        self.fields.next()
    }
}
