//! Conservation scalars and snapshot output.
//!
//! [`GlobalDiagnostics`] integrates mass and energy over the mesh for one
//! time level. The time loop records three of them per step (before the
//! Lagrangian phase, after it, after the projection) in a
//! [`DiagnosticsTracker`], and hands [`Snapshot`]s to a [`SnapshotSink`]
//! every `output_period` steps.

use crate::error::Result;
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::state::Fields;
use crate::types::{CellIndex, MaterialArray, Vec2};

/// Mass and energy integrals of one time level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalDiagnostics {
    pub mass: f64,
    /// `Σ_c Σ_k f_k ρ_k V e_k`
    pub internal_energy: f64,
    /// `Σ_c m_c·¼Σ_p ½|v_p|²`
    pub kinetic_energy: f64,
}

impl GlobalDiagnostics {
    /// Integrate `fields` over `mesh`.
    pub fn compute<M: MeshTopology + ?Sized>(mesh: &M, nbmat: usize, fields: &Fields) -> Self {
        let cells = &fields.cells;
        let velocity = &fields.nodes.velocity;
        let mass = parallel::reduce_sum(mesh.n_cells(), |c| cells.density[c] * cells.volume[c]);
        let internal_energy = parallel::reduce_sum(mesh.n_cells(), |c| {
            let env = &cells.env;
            (0..nbmat)
                .map(|k| env.fraction[c][k] * env.density[c][k] * env.energy[c][k])
                .sum::<f64>()
                * cells.volume[c]
        });
        let kinetic_energy = parallel::reduce_sum(mesh.n_cells(), |c| {
            let ke = 0.25
                * mesh
                    .nodes_of(CellIndex::new(c))
                    .iter()
                    .map(|p| 0.5 * velocity[*p].dot(velocity[*p]))
                    .sum::<f64>();
            cells.density[c] * cells.volume[c] * ke
        });
        Self {
            mass,
            internal_energy,
            kinetic_energy,
        }
    }

    #[inline]
    pub fn total_energy(&self) -> f64 {
        self.internal_energy + self.kinetic_energy
    }
}

/// Diagnostics of one completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDiagnostics {
    pub step: usize,
    /// Time at the end of the step
    pub time: f64,
    pub dt: f64,
    pub before_lagrange: GlobalDiagnostics,
    pub after_lagrange: GlobalDiagnostics,
    /// `None` when the projection is off
    pub after_projection: Option<GlobalDiagnostics>,
}

impl StepDiagnostics {
    /// State at the end of the step.
    pub fn end_of_step(&self) -> GlobalDiagnostics {
        self.after_projection.unwrap_or(self.after_lagrange)
    }
}

/// Relative drift of the conserved scalars since the first step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriftSummary {
    pub steps: usize,
    pub mass: f64,
    pub total_energy: f64,
    /// Largest single-step relative mass change through the projection
    pub max_remap_mass_change: f64,
}

/// History of per-step diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticsTracker {
    history: Vec<StepDiagnostics>,
}

impl DiagnosticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: StepDiagnostics) {
        self.history.push(step);
    }

    pub fn history(&self) -> &[StepDiagnostics] {
        &self.history
    }

    pub fn last(&self) -> Option<&StepDiagnostics> {
        self.history.last()
    }

    /// Drift of the end-of-step scalars relative to the first recorded
    /// initial state; `None` before any step.
    pub fn drift(&self) -> Option<DriftSummary> {
        let first = self.history.first()?.before_lagrange;
        let last = self.history.last()?.end_of_step();
        let max_remap_mass_change = self
            .history
            .iter()
            .filter_map(|s| s.after_projection.map(|p| relative(p.mass, s.after_lagrange.mass).abs()))
            .fold(0.0, f64::max);
        Some(DriftSummary {
            steps: self.history.len(),
            mass: relative(last.mass, first.mass),
            total_energy: relative(last.total_energy(), first.total_energy()),
            max_remap_mass_change,
        })
    }
}

fn relative(value: f64, reference: f64) -> f64 {
    if reference != 0.0 {
        (value - reference) / reference.abs()
    } else {
        value - reference
    }
}

/// Per-cell and per-node output of one time level.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub time: f64,
    pub pressure: Vec<f64>,
    pub density: Vec<f64>,
    pub energy: Vec<f64>,
    pub fraction: Vec<MaterialArray>,
    pub velocity: Vec<Vec2>,
}

impl Snapshot {
    pub fn capture(step: usize, time: f64, fields: &Fields) -> Self {
        Self {
            step,
            time,
            pressure: fields.cells.pressure.clone(),
            density: fields.cells.density.clone(),
            energy: fields.cells.energy.clone(),
            fraction: fields.cells.env.fraction.clone(),
            velocity: fields.nodes.velocity.clone(),
        }
    }
}

/// Receiver of periodic snapshots.
pub trait SnapshotSink {
    fn write(&mut self, snapshot: Snapshot) -> Result<()>;
}

/// Keeps every snapshot in memory.
#[derive(Clone, Debug, Default)]
pub struct SnapshotRecorder {
    pub snapshots: Vec<Snapshot>,
}

impl SnapshotSink for SnapshotRecorder {
    fn write(&mut self, snapshot: Snapshot) -> Result<()> {
        self.snapshots.push(snapshot);
        Ok(())
    }
}
