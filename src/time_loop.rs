//! Time loop orchestration.
//!
//! Each step runs the same fixed sequence:
//!
//! 1. time step from level `n` (CFL rule, growth cap)
//! 2. global scalars before the Lagrangian phase
//! 3. Lagrangian phase `n → n+1`
//! 4. global scalars after it
//! 5. optional projection onto the reference mesh, then closures again
//! 6. global scalars after the projection
//! 7. buffer swap, time advance, sweep order flip
//!
//! A step never starts before the previous swap is done; the loop stops at
//! `final_time` or `max_iterations`.

use log::{debug, info};

use crate::config::SolverConfig;
use crate::diagnostics::{DiagnosticsTracker, DriftSummary, GlobalDiagnostics, Snapshot, SnapshotSink, StepDiagnostics};
use crate::error::Result;
use crate::lagrange::{LagrangePhase, LagrangeReport};
use crate::mesh::CartesianMesh2D;
use crate::remap::{RemapEngine, RemapReport};
use crate::scenario::Scenario;
use crate::state::{HydroState, SimulationState};

/// Outcome of one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub lagrange: LagrangeReport,
    pub remap: Option<RemapReport>,
    pub diagnostics: StepDiagnostics,
}

/// Outcome of a full run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub time: f64,
    pub newton_failures: usize,
    pub drift: Option<DriftSummary>,
}

/// A configured run: mesh, state, phases and diagnostics.
pub struct Simulation {
    config: SolverConfig,
    mesh: CartesianMesh2D,
    scenario: Scenario,
    state: HydroState,
    sim: SimulationState,
    lagrange: LagrangePhase,
    remap: Option<RemapEngine>,
    diagnostics: DiagnosticsTracker,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("scenario", &self.scenario)
            .field("cells", &(self.mesh.nx * self.mesh.ny))
            .field("sim", &self.sim)
            .field("remap", &self.remap)
            .finish()
    }
}

impl Simulation {
    /// Set up a run of `scenario` on `mesh`.
    ///
    /// Applies the scenario's boundary overrides, validates the
    /// configuration, checks every material closure and fills the
    /// initial state.
    ///
    /// # Errors
    /// Invalid configuration, unsupported closure or a scenario needing
    /// more materials than configured.
    pub fn new(mut config: SolverConfig, mesh: CartesianMesh2D, scenario: Scenario) -> Result<Self> {
        scenario.apply_boundary_conditions(&mut config);
        config.validate()?;
        for material in &config.materials {
            material.evaluate(1.0, 1.0)?;
        }

        let nbmat = config.nb_materials();
        let lagrange = LagrangePhase::new(&config);
        let mut state = HydroState::new(&mesh, nbmat, mesh.node_coordinates());
        scenario.initialize(&mesh, lagrange.materials(), &mut state)?;
        lagrange.initialize(&mesh, &mut state)?;

        let dt0 = match config.deltat_init {
            Some(dt) => dt,
            None => lagrange.initial_time_step(&mesh, &state),
        };
        let remap = config.projection.enabled.then(|| RemapEngine::new(&config));
        info!(
            "scenario {scenario}: {}x{} cells, {nbmat} material(s), projection {}, dt0 = {dt0:.6e}",
            mesh.nx,
            mesh.ny,
            if remap.is_some() { "on" } else { "off" },
        );

        Ok(Self {
            config,
            mesh,
            scenario,
            state,
            sim: SimulationState::starting_with(dt0),
            lagrange,
            remap,
            diagnostics: DiagnosticsTracker::new(),
            sink: None,
        })
    }

    /// Build the mesh and look up the scenario from the configuration.
    pub fn from_config(config: SolverConfig) -> Result<Self> {
        let scenario: Scenario = config.scenario.parse()?;
        let m = &config.mesh;
        let mesh = CartesianMesh2D::uniform_rectangle(m.x_min, m.x_max, m.y_min, m.y_max, m.nx, m.ny)?;
        Self::new(config, mesh, scenario)
    }

    /// Send snapshots to `sink` every `output_period` steps.
    pub fn with_sink(mut self, sink: Box<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn mesh(&self) -> &CartesianMesh2D {
        &self.mesh
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn state(&self) -> &HydroState {
        &self.state
    }

    pub fn sim(&self) -> &SimulationState {
        &self.sim
    }

    pub fn diagnostics(&self) -> &DiagnosticsTracker {
        &self.diagnostics
    }

    /// Conservation scalars of the current level.
    pub fn globals(&self) -> GlobalDiagnostics {
        GlobalDiagnostics::compute(&self.mesh, self.state.nbmat, self.state.current())
    }

    /// `true` once the time or step limit is reached.
    pub fn finished(&self) -> bool {
        self.sim.step >= self.config.max_iterations || self.sim.time >= self.config.final_time
    }

    /// Run one full step.
    pub fn step(&mut self) -> Result<StepReport> {
        let nbmat = self.state.nbmat;
        if self.sim.step > 0 {
            self.sim.next_dt = self.lagrange.time_step(&self.mesh, &self.state, self.sim.dt)?;
        }
        let remaining = self.config.final_time - self.sim.time;
        if remaining > 0.0 && self.sim.next_dt > remaining {
            self.sim.next_dt = remaining;
        }
        self.sim.next_time = self.sim.time + self.sim.next_dt;

        let before_lagrange = GlobalDiagnostics::compute(&self.mesh, nbmat, self.state.current());
        let lagrange = self.lagrange.advance(&self.mesh, &mut self.state, &self.sim)?;
        let after_lagrange = GlobalDiagnostics::compute(&self.mesh, nbmat, self.state.next());

        let (remap, after_projection) = match &self.remap {
            Some(engine) => {
                let report = engine.remap(&self.mesh, &mut self.state, &self.sim);
                self.lagrange.refresh_after_remap(&self.mesh, &mut self.state)?;
                debug!(
                    "projection: mass {:.12e} -> {:.12e}, kinetic energy returned {:.3e}",
                    report.mass_before, report.mass_after, report.kinetic_energy_returned
                );
                let globals = GlobalDiagnostics::compute(&self.mesh, nbmat, self.state.next());
                (Some(report), Some(globals))
            }
            None => (None, None),
        };

        let diagnostics = StepDiagnostics {
            step: self.sim.step + 1,
            time: self.sim.next_time,
            dt: self.sim.next_dt,
            before_lagrange,
            after_lagrange,
            after_projection,
        };
        let end = diagnostics.end_of_step();
        info!(
            "step {:6}  t = {:.6e}  dt = {:.6e}  mass = {:.12e}  energy = {:.12e}",
            diagnostics.step,
            diagnostics.time,
            diagnostics.dt,
            end.mass,
            end.total_energy()
        );
        self.diagnostics.record(diagnostics);

        self.state.fields.swap();
        self.sim.advance();

        let period = self.config.output_period;
        if period > 0 && self.sim.step % period == 0 {
            self.write_snapshot()?;
        }

        Ok(StepReport {
            lagrange,
            remap,
            diagnostics,
        })
    }

    /// Step until the time or step limit.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.sim.step == 0 && self.config.output_period > 0 {
            self.write_snapshot()?;
        }
        let mut newton_failures = 0;
        while !self.finished() {
            newton_failures += self.step()?.lagrange.newton_failures;
        }
        let summary = RunSummary {
            steps: self.sim.step,
            time: self.sim.time,
            newton_failures,
            drift: self.diagnostics.drift(),
        };
        if let Some(drift) = summary.drift {
            info!(
                "finished after {} steps at t = {:.6e}: mass drift {:.3e}, energy drift {:.3e}",
                summary.steps, summary.time, drift.mass, drift.total_energy
            );
        }
        Ok(summary)
    }

    fn write_snapshot(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.write(Snapshot::capture(self.sim.step, self.sim.time, self.state.current()))?;
        }
        Ok(())
    }
}
