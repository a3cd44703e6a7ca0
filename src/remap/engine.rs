//! Projection of the Lagrangian state back onto the Eulerian mesh.

use log::debug;

use super::dual::{dual_sweep, DualFluxProvider, DualState, DualSweepInput};
use super::limiters::LimiterKind;
use super::phi::PhiLayout;
use super::reassembly::{conserved_from_fields, reassemble, ReassemblyOptions};
use super::sweep::{directional_sweep, face_normal_velocities, pure_materials, SweepInput, SweepOptions};
use crate::boundary::FluxBoundary;
use crate::config::SolverConfig;
use crate::mesh::{geometry, MeshTopology};
use crate::parallel;
use crate::state::{HydroState, SimulationState};
use crate::types::{CellIndex, Vec2};

/// Totals before and after one projection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RemapReport {
    pub mass_before: f64,
    pub mass_after: f64,
    pub energy_before: f64,
    pub energy_after: f64,
    /// Kinetic energy moved into internal energy by the fix
    pub kinetic_energy_returned: f64,
}

/// Alternating-direction remap with nodal companion sweeps.
pub struct RemapEngine {
    sweep: SweepOptions,
    flux_boundary: FluxBoundary,
    provider: Box<dyn DualFluxProvider>,
    dual_limiter: LimiterKind,
    reassembly: ReassemblyOptions,
    threshold: f64,
}

impl std::fmt::Debug for RemapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemapEngine")
            .field("sweep", &self.sweep)
            .field("dual_flux", &self.provider.name())
            .field("dual_limiter", &self.dual_limiter)
            .finish()
    }
}

impl RemapEngine {
    pub fn new(config: &SolverConfig) -> Self {
        let nbmat = config.nb_materials();
        let layout = PhiLayout::new(nbmat);
        let projection = &config.projection;
        Self {
            sweep: SweepOptions::new(nbmat, projection),
            flux_boundary: FluxBoundary::new(&config.boundary.flux, layout.width()),
            provider: projection.dual_flux.provider(),
            dual_limiter: projection.dual_limiter,
            reassembly: ReassemblyOptions {
                layout,
                threshold: config.threshold,
                kinetic_energy_fix: projection.kinetic_energy_fix,
            },
            threshold: config.threshold,
        }
    }

    pub fn layout(&self) -> PhiLayout {
        self.sweep.layout
    }

    /// Remap level `n+1` of `state` onto the reference mesh.
    ///
    /// On return the `n+1` nodes sit at the reference positions and carry
    /// the remapped velocities; cell geometry and thermodynamics are left
    /// to the caller.
    pub fn remap<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        state: &mut HydroState,
        sim: &SimulationState,
    ) -> RemapReport {
        let layout = self.sweep.layout;
        let dt = sim.next_dt;
        let next = state.fields.next();
        let lagrangian = next.nodes.position.clone();
        let density = next.cells.density.clone();

        let mut conserved = conserved_from_fields(mesh, layout, next, &state.masses);
        let mut dual = DualState::from_velocities(&state.masses.node, &next.nodes.velocity);
        let mut report = RemapReport {
            mass_before: conserved.iter().map(|u| layout.total_mass(u)).sum(),
            energy_before: conserved.iter().map(|u| layout.total_energy(u)).sum(),
            ..RemapReport::default()
        };

        for axis in sim.sweep_order() {
            let pure = pure_materials(layout, &conserved, self.threshold);
            let face_velocity = face_normal_velocities(mesh, axis, &lagrangian, &state.reference_position, dt);
            let out = directional_sweep(
                mesh,
                &self.sweep,
                &self.flux_boundary,
                &SweepInput {
                    axis,
                    coords: &lagrangian,
                    face_velocity: &face_velocity,
                    conserved: &conserved,
                    pure_material: &pure,
                    dt,
                },
            );
            let node_velocity = node_displacement_velocity(&lagrangian, &state.reference_position, axis, dt);
            dual_sweep(
                mesh,
                layout,
                self.provider.as_ref(),
                &mut dual,
                &DualSweepInput {
                    axis,
                    coords: &lagrangian,
                    node_velocity: &node_velocity,
                    face_flux: &out.face_flux,
                    bounded_cell_flux: &out.bounded_cell_flux,
                    density: &density,
                    dt,
                    order: self.sweep.order,
                    limiter: self.dual_limiter,
                },
            );
            conserved = out.conserved;
            debug!(
                "remap sweep {:?}: mass {:.12e}",
                axis,
                conserved.iter().map(|u| layout.total_mass(u)).sum::<f64>()
            );
        }

        report.mass_after = conserved.iter().map(|u| layout.total_mass(u)).sum();
        report.energy_after = conserved.iter().map(|u| layout.total_energy(u)).sum();

        let volume = eulerian_volumes(mesh, &state.reference_position);
        let fields = state.fields.next_mut();
        report.kinetic_energy_returned = reassemble(
            mesh,
            &self.reassembly,
            &conserved,
            &dual,
            &volume,
            fields,
            &mut state.masses,
        );
        fields.nodes.position.clone_from(&state.reference_position);
        report
    }
}

/// Displacement velocity of every node along `axis`.
fn node_displacement_velocity(lagrangian: &[Vec2], reference: &[Vec2], axis: crate::types::Axis, dt: f64) -> Vec<f64> {
    lagrangian
        .iter()
        .zip(reference)
        .map(|(l, r)| if dt > 0.0 { (*l - *r).along(axis) / dt } else { 0.0 })
        .collect()
}

/// Cell areas of the reference mesh.
fn eulerian_volumes<M: MeshTopology + ?Sized>(mesh: &M, reference: &[Vec2]) -> Vec<f64> {
    parallel::map_collect(mesh.n_cells(), |c| {
        geometry::polygon_area(&geometry::cell_coordinates(mesh, CellIndex::new(c), reference))
    })
}
