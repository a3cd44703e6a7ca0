//! Time-level bookkeeping owned by the orchestrator.

use crate::types::Axis;

/// Current and next time, time steps, step counter and sweep order.
///
/// Passed by reference into every phase; only the orchestrator mutates it,
/// and only between phases or at the end-of-step swap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    /// t^n
    pub time: f64,
    /// t^{n+1}
    pub next_time: f64,
    /// Δt^n
    pub dt: f64,
    /// Δt^{n+1}
    pub next_dt: f64,
    /// Completed steps
    pub step: usize,
    /// Sweep order of the current step
    pub x_then_y: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            time: 0.0,
            next_time: 0.0,
            dt: 0.0,
            next_dt: 0.0,
            step: 0,
            x_then_y: true,
        }
    }
}

impl SimulationState {
    /// Start at `t = 0` with a first time step.
    pub fn starting_with(dt: f64) -> Self {
        Self {
            dt,
            next_dt: dt,
            ..Self::default()
        }
    }

    /// Centred time step used for the velocity update.
    #[inline]
    pub fn half_step(&self) -> f64 {
        0.5 * (self.dt + self.next_dt)
    }

    /// Sweep axes of this step, in order.
    #[inline]
    pub fn sweep_order(&self) -> [Axis; 2] {
        Axis::sweep_order(self.x_then_y)
    }

    /// Move to the next step and flip the sweep order.
    pub fn advance(&mut self) {
        self.time = self.next_time;
        self.dt = self.next_dt;
        self.step += 1;
        self.x_then_y = !self.x_then_y;
    }
}
