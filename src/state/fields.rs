//! Cell, material and node fields of one time level.

use crate::types::{MaterialArray, Vec2, MAX_MATERIALS};

/// Per-material environment arrays of every cell.
///
/// Slots past the configured material count stay zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialFields {
    pub fraction: Vec<MaterialArray>,
    pub mass_fraction: Vec<MaterialArray>,
    pub density: Vec<MaterialArray>,
    pub pressure: Vec<MaterialArray>,
    /// Specific internal energy
    pub energy: Vec<MaterialArray>,
    pub sound_speed: Vec<MaterialArray>,
    pub pseudo: Vec<MaterialArray>,
    /// ∂p/∂e of the last EOS call
    pub dpde: Vec<MaterialArray>,
}

impl MaterialFields {
    pub fn new(n_cells: usize) -> Self {
        let zero = vec![[0.0; MAX_MATERIALS]; n_cells];
        Self {
            fraction: zero.clone(),
            mass_fraction: zero.clone(),
            density: zero.clone(),
            pressure: zero.clone(),
            energy: zero.clone(),
            sound_speed: zero.clone(),
            pseudo: zero.clone(),
            dpde: zero,
        }
    }
}

/// Cell-centred fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellFields {
    pub density: Vec<f64>,
    pub pressure: Vec<f64>,
    /// Specific internal energy (mass-fraction weighted)
    pub energy: Vec<f64>,
    pub sound_speed: Vec<f64>,
    /// Artificial viscosity
    pub pseudo: Vec<f64>,
    /// Sum of the node sub-volumes
    pub volume: Vec<f64>,
    pub center: Vec<Vec2>,
    /// Corner vectors, one per node of the cell
    pub corner_normals: Vec<[Vec2; 4]>,
    pub env: MaterialFields,
}

impl CellFields {
    pub fn new(n_cells: usize) -> Self {
        Self {
            density: vec![0.0; n_cells],
            pressure: vec![0.0; n_cells],
            energy: vec![0.0; n_cells],
            sound_speed: vec![0.0; n_cells],
            pseudo: vec![0.0; n_cells],
            volume: vec![0.0; n_cells],
            center: vec![Vec2::ZERO; n_cells],
            corner_normals: vec![[Vec2::ZERO; 4]; n_cells],
            env: MaterialFields::new(n_cells),
        }
    }

    pub fn n_cells(&self) -> usize {
        self.density.len()
    }
}

/// Node-centred fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeFields {
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
}

impl NodeFields {
    pub fn new(position: Vec<Vec2>) -> Self {
        let n = position.len();
        Self {
            position,
            velocity: vec![Vec2::ZERO; n],
        }
    }
}

/// Everything that is double-buffered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    pub cells: CellFields,
    pub nodes: NodeFields,
}

/// Quantities constant through a Lagrangian step.
///
/// Masses only change in the remap; the reference coordinates are the
/// Eulerian mesh the remap projects back onto.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LagrangianMasses {
    pub cell: Vec<f64>,
    pub env: Vec<MaterialArray>,
    pub node: Vec<f64>,
}

impl LagrangianMasses {
    pub fn new(n_cells: usize, n_nodes: usize) -> Self {
        Self {
            cell: vec![0.0; n_cells],
            env: vec![[0.0; MAX_MATERIALS]; n_cells],
            node: vec![0.0; n_nodes],
        }
    }
}
