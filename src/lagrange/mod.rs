//! Lagrangian phase: the mesh moves with the flow.
//!
//! One call to [`LagrangePhase::advance`] takes level `n` to level `n+1`:
//!
//! 1. nodal forces from corner vectors, velocity update, kinematic
//!    constraints, node motion
//! 2. new geometry, material densities from the constant masses
//! 3. velocity divergence and artificial viscosity
//! 4. per-material energy solve (VNR or corner-work)
//! 5. material closures and cell averages
//!
//! Submodules:
//! - [`geometry`]: cell shapes and masses
//! - [`momentum`]: forces and node motion
//! - [`viscosity`]: artificial viscosity
//! - [`energy`]: energy residuals and solvers
//! - [`thermo`]: closures and averaging
//! - [`timestep`]: CFL time step

pub mod energy;
pub mod geometry;
pub mod momentum;
pub mod thermo;
pub mod timestep;
pub mod viscosity;

use log::{debug, warn};

use crate::boundary::KinematicBc;
use crate::config::{EnergySolver, LagrangeScheme, NewtonFailurePolicy, SolverConfig};
use crate::eos::{EosKind, MaterialEos};
use crate::error::{HydroError, Result};
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::state::{CellFields, HydroState, LagrangianMasses, SimulationState};
use crate::types::{CellIndex, MaterialArray, Sides, Vec2, MAX_MATERIALS};

use energy::{
    solve_corner_work, solve_corner_work_perfect_gas, solve_vnr, solve_vnr_perfect_gas, viscous_work_pressure,
    CornerWorkInput, NewtonSettings, VnrEnergyInput,
};
use momentum::{accelerate, move_nodes, nodal_forces};
use timestep::TimeStepSettings;

/// Counters of one Lagrangian step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LagrangeReport {
    /// Material energy solves that hit the iteration cap
    pub newton_failures: usize,
    /// Largest iteration count of a converged solve
    pub max_newton_iterations: usize,
}

/// Energy solve result of one cell.
#[derive(Clone, Copy, Debug, Default)]
struct CellEnergy {
    energy: MaterialArray,
    iterations: usize,
    failures: usize,
}

/// Options and materials of the Lagrangian phase.
#[derive(Clone, Debug)]
pub struct LagrangePhase {
    materials: Vec<MaterialEos>,
    scheme: LagrangeScheme,
    energy_solver: EnergySolver,
    pseudo_centering: bool,
    threshold: f64,
    newton: NewtonSettings,
    newton_failure: NewtonFailurePolicy,
    kinematic: Sides<KinematicBc>,
    with_projection: bool,
    time_step: TimeStepSettings,
}

impl LagrangePhase {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            materials: config.materials.clone(),
            scheme: config.scheme,
            energy_solver: config.energy_solver,
            pseudo_centering: config.pseudo_centering,
            threshold: config.threshold,
            newton: NewtonSettings {
                tolerance: config.threshold,
                max_iterations: config.newton_max_iterations,
            },
            newton_failure: config.newton_failure,
            kinematic: config.boundary.kinematic,
            with_projection: config.projection.enabled,
            time_step: TimeStepSettings {
                cfl: config.effective_cfl(),
                include_flow_speed: config.projection.enabled,
                deltat_max: config.deltat_max,
            },
        }
    }

    pub fn materials(&self) -> &[MaterialEos] {
        &self.materials
    }

    pub fn nb_materials(&self) -> usize {
        self.materials.len()
    }

    /// Geometry, masses and closures of the initial level.
    ///
    /// Expects densities, fractions, mass fractions and energies set on
    /// the current level; fills in the rest and copies it to `n+1`.
    pub fn initialize<M: MeshTopology + ?Sized>(&self, mesh: &M, state: &mut HydroState) -> Result<()> {
        let nbmat = self.nb_materials();
        let fields = state.fields.current_mut();
        geometry::update_cell_geometry(mesh, &fields.nodes.position, &mut fields.cells);
        geometry::compute_cell_masses(&fields.cells, nbmat, &mut state.masses);
        geometry::compute_node_masses(mesh, &mut state.masses);
        thermo::update_material_eos(&self.materials, &mut fields.cells)?;
        thermo::average_cell_state(nbmat, &mut fields.cells);
        let snapshot = fields.clone();
        *state.fields.next_mut() = snapshot;
        Ok(())
    }

    /// Refresh geometry and closures of level `n+1` after the remap.
    pub fn refresh_after_remap<M: MeshTopology + ?Sized>(&self, mesh: &M, state: &mut HydroState) -> Result<()> {
        let fields = state.fields.next_mut();
        geometry::update_cell_geometry(mesh, &fields.nodes.position, &mut fields.cells);
        geometry::compute_node_masses(mesh, &mut state.masses);
        thermo::update_material_eos(&self.materials, &mut fields.cells)?;
        thermo::average_cell_state(self.nb_materials(), &mut fields.cells);
        Ok(())
    }

    /// First time step of a run.
    pub fn initial_time_step<M: MeshTopology + ?Sized>(&self, mesh: &M, state: &HydroState) -> f64 {
        timestep::initial_time_step(mesh, state.current(), self.time_step.deltat_max)
    }

    /// Time step of the coming step from level `n`.
    pub fn time_step<M: MeshTopology + ?Sized>(&self, mesh: &M, state: &HydroState, previous: f64) -> Result<f64> {
        timestep::next_time_step(mesh, state.current(), &self.time_step, previous)
    }

    /// Advance level `n` to level `n+1` over `sim.next_dt`.
    pub fn advance<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        state: &mut HydroState,
        sim: &SimulationState,
    ) -> Result<LagrangeReport> {
        let dt = sim.next_dt;
        let corner_work = self.scheme == LagrangeScheme::Csts;
        let staggered_to_integer = corner_work && self.with_projection;
        let masses = &state.masses;
        let (current, next) = state.fields.split();

        // momentum
        let force_n = nodal_forces(mesh, &current.cells);
        let base_velocity = if staggered_to_integer {
            accelerate(mesh, &current.nodes.velocity, &force_n, &masses.node, -0.5 * sim.dt, &self.kinematic)
        } else {
            current.nodes.velocity.clone()
        };
        next.nodes.velocity = accelerate(
            mesh,
            &base_velocity,
            &force_n,
            &masses.node,
            sim.half_step(),
            &self.kinematic,
        );
        next.nodes.position = move_nodes(&current.nodes.position, &next.nodes.velocity, dt);

        // geometry and densities
        geometry::update_cell_geometry(mesh, &next.nodes.position, &mut next.cells);
        self.update_densities(&current.cells, &mut next.cells, masses)?;

        // artificial viscosity
        self.update_viscosity(&current.cells, &mut next.cells, dt)?;

        // energy
        let solved: Vec<CellEnergy> = if corner_work {
            let work = corner_work_terms(mesh, &current.cells, &next.cells, &next.nodes.velocity, dt);
            let solved = self.solve_corner_work_energy(&current.cells, &next.cells, masses, &work)?;
            self.total_energy_corrections(
                mesh,
                &current.cells,
                &next.cells,
                masses,
                &base_velocity,
                &next.nodes.velocity,
                sim,
                solved,
            )
        } else {
            self.solve_vnr_energy(&current.cells, &next.cells)?
        };

        let mut report = LagrangeReport::default();
        for (c, s) in solved.iter().enumerate() {
            next.cells.env.energy[c] = s.energy;
            report.newton_failures += s.failures;
            report.max_newton_iterations = report.max_newton_iterations.max(s.iterations);
        }

        thermo::update_material_eos(&self.materials, &mut next.cells)?;
        thermo::average_cell_state(self.nb_materials(), &mut next.cells);

        if staggered_to_integer {
            let force_n1 = nodal_forces(mesh, &next.cells);
            next.nodes.velocity = accelerate(
                mesh,
                &next.nodes.velocity,
                &force_n1,
                &masses.node,
                0.5 * dt,
                &self.kinematic,
            );
        }

        if report.newton_failures > 0 {
            match self.newton_failure {
                NewtonFailurePolicy::Warn => warn!(
                    "step {}: energy solve did not converge in {} material cell(s)",
                    sim.step + 1,
                    report.newton_failures
                ),
                NewtonFailurePolicy::Abort => {
                    return Err(HydroError::NewtonDivergence {
                        cells: report.newton_failures,
                    })
                }
            }
        }
        debug!(
            "lagrange step {}: dt = {:.6e}, max newton iterations {}",
            sim.step + 1,
            dt,
            report.max_newton_iterations
        );
        Ok(report)
    }

    /// Material densities `m_k/(f_k·V)` on the moved mesh.
    fn update_densities(&self, current: &CellFields, next: &mut CellFields, masses: &LagrangianMasses) -> Result<()> {
        let nbmat = self.nb_materials();
        let volume = &next.volume;
        let threshold = self.threshold;
        let density: Vec<MaterialArray> = parallel::try_map_collect(current.n_cells(), |c| {
            let mut rho = [0.0; MAX_MATERIALS];
            for imat in 0..nbmat {
                let f = current.env.fraction[c][imat];
                if f > threshold {
                    rho[imat] = masses.env[c][imat] / (f * volume[c]);
                }
                if rho[imat] < 0.0 {
                    return Err(HydroError::NegativeDensity {
                        cell: CellIndex::new(c),
                        material: imat,
                        density: rho[imat],
                    });
                }
            }
            Ok(rho)
        })?;
        next.env.fraction.clone_from(&current.env.fraction);
        next.env.mass_fraction.clone_from(&current.env.mass_fraction);
        for (c, rho) in density.into_iter().enumerate() {
            next.env.density[c] = rho;
            next.density[c] = (0..nbmat).map(|k| next.env.fraction[c][k] * rho[k]).sum();
        }
        Ok(())
    }

    /// Cell and material artificial viscosity at `n+1`.
    fn update_viscosity(&self, current: &CellFields, next: &mut CellFields, dt: f64) -> Result<()> {
        let nbmat = self.nb_materials();
        let materials = &self.materials;
        let next_ref: &CellFields = next;
        let pseudo: Vec<f64> = parallel::try_map_collect(current.n_cells(), |c| {
            let rho_n = current.density[c];
            let rho_n1 = next_ref.density[c];
            if !(rho_n > 0.0 && rho_n1 > 0.0) {
                return Ok(0.0);
            }
            let tau = viscosity::mean_specific_volume(rho_n, rho_n1);
            let divu = viscosity::velocity_divergence(rho_n, rho_n1, dt);
            let gamma = thermo::mixture_gamma(materials, &next_ref.env.fraction[c][..nbmat]);
            let q = viscosity::artificial_viscosity(next_ref.volume[c], current.sound_speed[c], divu, tau, gamma);
            if q < 0.0 {
                return Err(HydroError::NegativePseudoViscosity {
                    cell: CellIndex::new(c),
                    value: q,
                });
            }
            Ok(q)
        })?;
        for (c, q) in pseudo.into_iter().enumerate() {
            next.pseudo[c] = q;
            for imat in 0..MAX_MATERIALS {
                next.env.pseudo[c][imat] = next.env.fraction[c][imat] * q;
            }
        }
        Ok(())
    }

    /// Solve one material, counting a failure when the cap was reached.
    fn finish(&self, solution: energy::EnergySolution, out: &mut CellEnergy) -> f64 {
        if solution.converged {
            out.iterations = out.iterations.max(solution.iterations);
        } else {
            out.failures += 1;
        }
        solution.energy
    }

    fn solve_vnr_energy(&self, current: &CellFields, next: &CellFields) -> Result<Vec<CellEnergy>> {
        let threshold = self.threshold;
        parallel::try_map_collect(current.n_cells(), |c| {
            let mut out = CellEnergy::default();
            for (imat, eos) in self.materials.iter().enumerate() {
                let rho_n = current.env.density[c][imat];
                let rho_n1 = next.env.density[c][imat];
                if !(rho_n > threshold && rho_n1 > threshold) {
                    continue;
                }
                let dtau = 1.0 / rho_n1 - 1.0 / rho_n;
                let input = VnrEnergyInput {
                    energy_n: current.env.energy[c][imat],
                    pressure_n: current.env.pressure[c][imat],
                    pseudo: viscous_work_pressure(
                        self.pseudo_centering,
                        current.env.pseudo[c][imat],
                        next.env.pseudo[c][imat],
                        dtau,
                    ),
                    density_n: rho_n,
                    density_n1: rho_n1,
                };
                out.energy[imat] = match (self.energy_solver, eos.kind) {
                    (EnergySolver::ClosedForm, EosKind::PerfectGas) => solve_vnr_perfect_gas(eos.gamma, &input),
                    _ => {
                        let solution = solve_vnr(eos, &input, self.newton)?;
                        self.finish(solution, &mut out)
                    }
                };
            }
            Ok(out)
        })
    }

    fn solve_corner_work_energy(
        &self,
        current: &CellFields,
        next: &CellFields,
        masses: &LagrangianMasses,
        work: &[CornerWork],
    ) -> Result<Vec<CellEnergy>> {
        let threshold = self.threshold;
        parallel::try_map_collect(current.n_cells(), |c| {
            let mut out = CellEnergy::default();
            for (imat, eos) in self.materials.iter().enumerate() {
                let rho_n1 = next.env.density[c][imat];
                let mass = masses.env[c][imat];
                if !(rho_n1 > threshold && mass > 0.0) {
                    continue;
                }
                let f = next.env.fraction[c][imat];
                let input = CornerWorkInput {
                    energy_n: current.env.energy[c][imat],
                    pressure_n: current.env.pressure[c][imat],
                    pseudo_n: current.env.pseudo[c][imat],
                    pseudo_n1: next.env.pseudo[c][imat],
                    density_n1: rho_n1,
                    work_n: f * work[c].at_n,
                    work_n1: f * work[c].at_n1,
                    mass,
                };
                out.energy[imat] = match (self.energy_solver, eos.kind) {
                    (EnergySolver::ClosedForm, EosKind::PerfectGas) => {
                        solve_corner_work_perfect_gas(eos.gamma, &input)
                    }
                    _ => {
                        let solution = solve_corner_work(eos, &input, self.newton)?;
                        self.finish(solution, &mut out)
                    }
                };
            }
            Ok(out)
        })
    }

    /// Internal energy corrections restoring total-energy consistency of
    /// the corner-work scheme; one correction per material.
    #[allow(clippy::too_many_arguments)]
    fn total_energy_corrections<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        current: &CellFields,
        next: &CellFields,
        masses: &LagrangianMasses,
        base_velocity: &[Vec2],
        velocity: &[Vec2],
        sim: &SimulationState,
        mut solved: Vec<CellEnergy>,
    ) -> Vec<CellEnergy> {
        let threshold = self.threshold;
        let nbmat = self.nb_materials();
        parallel::for_each_indexed(&mut solved, |c, out| {
            let cell = CellIndex::new(c);
            let nodes = mesh.nodes_of(cell);
            for imat in 0..nbmat {
                let mass = masses.env[c][imat];
                if !(next.env.density[c][imat] > threshold && mass > 0.0) {
                    continue;
                }
                let f = current.env.fraction[c][imat];
                let work_pressure = current.env.pressure[c][imat] + current.env.pseudo[c][imat];
                let dq = next.env.pseudo[c][imat] - current.env.pseudo[c][imat];
                let mut correction = 0.0;
                for (k, p) in nodes.iter().enumerate() {
                    let normal = current.corner_normals[c][k];
                    correction += 0.25 * f * work_pressure * normal.dot(velocity[*p] - base_velocity[*p])
                        * (sim.next_dt - sim.dt)
                        / mass;
                    correction += f * dq * normal.dot(base_velocity[*p]) * sim.dt / mass;
                }
                out.energy[imat] += correction;
            }
        });
        solved
    }
}

/// `Δt·Σ_p C_pc·v_p` of a cell with the corner vectors at `n` and `n+1`.
#[derive(Clone, Copy, Debug, Default)]
struct CornerWork {
    at_n: f64,
    at_n1: f64,
}

fn corner_work_terms<M: MeshTopology + ?Sized>(
    mesh: &M,
    current: &CellFields,
    next: &CellFields,
    velocity: &[Vec2],
    dt: f64,
) -> Vec<CornerWork> {
    parallel::map_collect(current.n_cells(), |c| {
        let nodes = mesh.nodes_of(CellIndex::new(c));
        let mut work = CornerWork::default();
        for (k, p) in nodes.iter().enumerate() {
            work.at_n += current.corner_normals[c][k].dot(velocity[*p]) * dt;
            work.at_n1 += next.corner_normals[c][k].dot(velocity[*p]) * dt;
        }
        work
    })
}
