//! Remap of nodal quantities on the dual mesh.
//!
//! Velocity components and specific kinetic energy live on nodes. Each
//! directional sweep moves them across the dual faces of the nodes, whose
//! mass fluxes are recovered from the cell mass fluxes of the primal sweep
//! through a [`DualFluxProvider`].

use serde::{Deserialize, Serialize};

use super::limiters::{divide_or_zero, limit_classical, LimiterKind};
use super::phi::{PhiLayout, PhiVec};
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::types::{Axis, CellIndex, NodeIndex, Vec2};

/// Number of nodal remapped quantities: `vx`, `vy`, specific kinetic energy.
pub const DUAL_WIDTH: usize = 3;

/// Nodal quantity vector.
pub type DualVec = [f64; DUAL_WIDTH];

/// How dual-face mass fluxes are built from the primal sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualFluxMethod {
    /// Mean of the mass fluxes of the cell's two sweep faces
    #[default]
    Averaging,
    /// Cell density times the mean volume flux
    VolumeWeighted,
    /// Net bounded outflow of the plateau-pente reconstruction
    PenteBorne,
}

impl DualFluxMethod {
    /// Boxed provider implementing this method.
    pub fn provider(self) -> Box<dyn DualFluxProvider> {
        match self {
            DualFluxMethod::Averaging => Box::new(AveragedMassFlux),
            DualFluxMethod::VolumeWeighted => Box::new(VolumeWeightedMassFlux),
            DualFluxMethod::PenteBorne => Box::new(BoundedMassFlux),
        }
    }
}

/// Primal sweep fluxes of one cell, gathered for the dual remap.
#[derive(Clone, Copy, Debug)]
pub struct CellSweepFluxes<'a> {
    /// Signed flux through the back face, along `+axis`
    pub back: &'a PhiVec,
    /// Signed flux through the front face, along `+axis`
    pub front: &'a PhiVec,
    /// Net bounded outflow; zeros outside plateau-pente
    pub bounded: &'a PhiVec,
    /// Cell density at the end of the Lagrangian phase
    pub density: f64,
}

/// Mass flux a cell contributes to the dual faces it crosses.
pub trait DualFluxProvider: Send + Sync {
    /// Signed mass flux along `+axis` carried by one cell.
    fn cell_mass_flux(&self, layout: PhiLayout, fluxes: &CellSweepFluxes<'_>) -> f64;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Mean of the two face mass fluxes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AveragedMassFlux;

impl DualFluxProvider for AveragedMassFlux {
    fn cell_mass_flux(&self, layout: PhiLayout, fluxes: &CellSweepFluxes<'_>) -> f64 {
        0.5 * (layout.total_mass(fluxes.back) + layout.total_mass(fluxes.front))
    }

    fn name(&self) -> &'static str {
        "averaging"
    }
}

/// Cell density times the mean face volume flux.
#[derive(Clone, Copy, Debug, Default)]
pub struct VolumeWeightedMassFlux;

impl DualFluxProvider for VolumeWeightedMassFlux {
    fn cell_mass_flux(&self, layout: PhiLayout, fluxes: &CellSweepFluxes<'_>) -> f64 {
        fluxes.density * 0.5 * (layout.total_volume(fluxes.back) + layout.total_volume(fluxes.front))
    }

    fn name(&self) -> &'static str {
        "volume_weighted"
    }
}

/// Net bounded outflow of the plateau-pente reconstruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundedMassFlux;

impl DualFluxProvider for BoundedMassFlux {
    fn cell_mass_flux(&self, layout: PhiLayout, fluxes: &CellSweepFluxes<'_>) -> f64 {
        layout.total_mass(fluxes.bounded)
    }

    fn name(&self) -> &'static str {
        "pente_borne"
    }
}

/// Nodal masses and conserved nodal quantities carried through the sweeps.
#[derive(Clone, Debug, PartialEq)]
pub struct DualState {
    pub mass: Vec<f64>,
    /// `mass × (vx, vy, ke)`
    pub conserved: Vec<DualVec>,
}

impl DualState {
    /// Build from node masses and velocities.
    pub fn from_velocities(mass: &[f64], velocity: &[Vec2]) -> Self {
        let conserved = mass
            .iter()
            .zip(velocity)
            .map(|(m, v)| [m * v.x, m * v.y, m * 0.5 * v.dot(*v)])
            .collect();
        Self {
            mass: mass.to_vec(),
            conserved,
        }
    }

    /// Intensive nodal quantities; zero at massless nodes.
    pub fn intensive(&self) -> Vec<DualVec> {
        self.mass
            .iter()
            .zip(&self.conserved)
            .map(|(m, u)| {
                if *m > 0.0 {
                    [u[0] / m, u[1] / m, u[2] / m]
                } else {
                    [0.0; DUAL_WIDTH]
                }
            })
            .collect()
    }

    /// Node velocities after the remap.
    pub fn velocities(&self) -> Vec<Vec2> {
        self.intensive().into_iter().map(|q| Vec2::new(q[0], q[1])).collect()
    }
}

/// Inputs of one dual sweep.
#[derive(Clone, Copy, Debug)]
pub struct DualSweepInput<'a> {
    pub axis: Axis,
    /// Lagrangian node positions
    pub coords: &'a [Vec2],
    /// Node displacement velocity along the axis
    pub node_velocity: &'a [f64],
    /// Signed face fluxes of the primal sweep
    pub face_flux: &'a [PhiVec],
    /// Net bounded cell outflow of the primal sweep (may be empty)
    pub bounded_cell_flux: &'a [PhiVec],
    /// Cell densities at the end of the Lagrangian phase
    pub density: &'a [f64],
    pub dt: f64,
    pub order: u8,
    pub limiter: LimiterKind,
}

/// Mass flux of every cell along the sweep axis.
pub fn cell_mass_fluxes<M: MeshTopology + ?Sized>(
    mesh: &M,
    layout: PhiLayout,
    provider: &dyn DualFluxProvider,
    input: &DualSweepInput<'_>,
) -> Vec<f64> {
    let zero: PhiVec = [0.0; super::phi::MAX_PHI];
    parallel::map_collect(mesh.n_cells(), |c| {
        let cell = CellIndex::new(c);
        let fluxes = CellSweepFluxes {
            back: &input.face_flux[mesh.back_face(cell, input.axis)],
            front: &input.face_flux[mesh.front_face(cell, input.axis)],
            bounded: input.bounded_cell_flux.get(c).unwrap_or(&zero),
            density: input.density[c],
        };
        provider.cell_mass_flux(layout, &fluxes)
    })
}

/// Mass flux through a dual face: mean over the cells it crosses.
///
/// `None` when no cell exists there, i.e. the face lies outside the domain.
pub fn dual_face_flux(cells: [Option<CellIndex>; 2], cell_flux: &[f64]) -> Option<f64> {
    let (sum, count) = cells
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), c| (s + cell_flux[*c], n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Limited nodal gradients along the axis.
fn node_gradients<M: MeshTopology + ?Sized>(
    mesh: &M,
    axis: Axis,
    coords: &[Vec2],
    phi: &[DualVec],
    limiter: LimiterKind,
) -> Vec<DualVec> {
    parallel::map_collect(mesh.n_nodes(), |p| {
        let node = NodeIndex::new(p);
        let back = mesh.back_node(node, axis);
        let front = mesh.front_node(node, axis);
        let mut grad = [0.0; DUAL_WIDTH];
        for k in 0..DUAL_WIDTH {
            let minus = back
                .map(|b| divide_or_zero(phi[node][k] - phi[b][k], (coords[node] - coords[b]).along(axis)))
                .unwrap_or(0.0);
            let plus = front
                .map(|f| divide_or_zero(phi[f][k] - phi[node][k], (coords[f] - coords[node]).along(axis)))
                .unwrap_or(0.0);
            grad[k] = limit_classical(limiter, plus, minus);
        }
        grad
    })
}

/// Upwind value carried across the dual face between `node` and `other`.
///
/// `flux` is the signed mass flux along `+axis`; the donor is the node the
/// mass leaves. Second order adds the limited gradient at the centre of
/// the volume swept through the face.
#[allow(clippy::too_many_arguments)]
fn upwind_value(
    node: NodeIndex,
    other: NodeIndex,
    flux: f64,
    phi: &[DualVec],
    grad: &[DualVec],
    input: &DualSweepInput<'_>,
    second_order: f64,
) -> DualVec {
    let other_is_front = (input.coords[other] - input.coords[node]).along(input.axis) > 0.0;
    let donor = match (other_is_front, flux < 0.0) {
        (true, true) | (false, false) => other,
        _ => node,
    };
    let face_velocity = 0.5 * (input.node_velocity[node] + input.node_velocity[other]);
    let half_width = 0.5 * (input.coords[other] - input.coords[node]).along(input.axis).abs();
    let toward_face = if donor == node {
        if other_is_front { half_width } else { -half_width }
    } else if other_is_front {
        -half_width
    } else {
        half_width
    };
    let offset = toward_face - 0.5 * input.dt * face_velocity;
    let mut value = phi[donor];
    for k in 0..DUAL_WIDTH {
        value[k] += second_order * offset * grad[donor][k];
    }
    value
}

/// Run one dual sweep in place.
pub fn dual_sweep<M: MeshTopology + ?Sized>(
    mesh: &M,
    layout: PhiLayout,
    provider: &dyn DualFluxProvider,
    state: &mut DualState,
    input: &DualSweepInput<'_>,
) {
    let axis = input.axis;
    let cell_flux = cell_mass_fluxes(mesh, layout, provider, input);
    let phi = state.intensive();
    let grad = node_gradients(mesh, axis, input.coords, &phi, input.limiter);
    let second_order = if input.order >= 2 { 1.0 } else { 0.0 };

    let updated: Vec<(f64, DualVec)> = parallel::map_collect(mesh.n_nodes(), |p| {
        let node = NodeIndex::new(p);
        let mut mass = state.mass[p];
        let mut u = state.conserved[p];

        let front = mesh.front_node(node, axis);
        if let (Some(front), Some(flux)) = (front, dual_face_flux(mesh.cells_ahead_of_node(node, axis), &cell_flux)) {
            let value = upwind_value(node, front, flux, &phi, &grad, input, second_order);
            mass -= flux;
            for k in 0..DUAL_WIDTH {
                u[k] -= flux * value[k];
            }
        }
        let back = mesh.back_node(node, axis);
        if let (Some(back), Some(flux)) = (back, dual_face_flux(mesh.cells_behind_node(node, axis), &cell_flux)) {
            let value = upwind_value(node, back, flux, &phi, &grad, input, second_order);
            mass += flux;
            for k in 0..DUAL_WIDTH {
                u[k] += flux * value[k];
            }
        }
        (mass, u)
    });

    for (p, (mass, u)) in updated.into_iter().enumerate() {
        state.mass[p] = mass;
        state.conserved[p] = u;
    }
}
