//! CFL time step.

use crate::error::HydroError;
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::state::Fields;
use crate::types::CellIndex;

/// Growth cap of the time step between two steps.
pub const MAX_GROWTH: f64 = 1.05;

/// Time step options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStepSettings {
    /// CFL number, already halved when the remap is on
    pub cfl: f64,
    /// Add the mean node speed to the sound speed
    pub include_flow_speed: bool,
    pub deltat_max: f64,
}

/// Stable time step of one cell.
#[inline]
fn cell_time_step(volume: f64, sound_speed: f64, flow_speed: f64, cfl: f64) -> f64 {
    let speed = flow_speed + sound_speed;
    if speed > 0.0 {
        cfl * volume.max(0.0).sqrt() / speed
    } else {
        f64::INFINITY
    }
}

/// Time step of the next Lagrangian step.
///
/// `min_c cfl·√V/(u_c + c)`, capped by `1.05·previous` and `deltat_max`.
///
/// # Errors
/// `HydroError::InvalidTimeStep` when the result is zero or not finite.
pub fn next_time_step<M: MeshTopology + ?Sized>(
    mesh: &M,
    fields: &Fields,
    settings: &TimeStepSettings,
    previous: f64,
) -> Result<f64, HydroError> {
    let cells = &fields.cells;
    let velocity = &fields.nodes.velocity;
    let dt = parallel::reduce_min(mesh.n_cells(), |c| {
        let flow_speed = if settings.include_flow_speed {
            0.25 * mesh
                .nodes_of(CellIndex::new(c))
                .iter()
                .map(|p| velocity[*p].norm())
                .sum::<f64>()
        } else {
            0.0
        };
        cell_time_step(cells.volume[c], cells.sound_speed[c], flow_speed, settings.cfl)
    });
    let dt = dt.min(MAX_GROWTH * previous).min(settings.deltat_max);
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(HydroError::InvalidTimeStep(dt));
    }
    Ok(dt)
}

/// First time step: `1e-6·min_c 0.1·√V/c`, or `deltat_max` for a state
/// with no sound speed.
pub fn initial_time_step<M: MeshTopology + ?Sized>(mesh: &M, fields: &Fields, deltat_max: f64) -> f64 {
    let cells = &fields.cells;
    let dt = 1e-6
        * parallel::reduce_min(mesh.n_cells(), |c| {
            cell_time_step(cells.volume[c], cells.sound_speed[c], 0.0, 0.1)
        });
    if dt.is_finite() {
        dt.min(deltat_max)
    } else {
        deltat_max
    }
}
