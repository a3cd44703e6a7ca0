//! Internal energy update of one material in one cell.
//!
//! The VNR residual
//!
//! ```text
//! f(e) = e − eⁿ + ½·(p(ρⁿ⁺¹, e) + pⁿ + 2q)·(1/ρⁿ⁺¹ − 1/ρⁿ)
//! ```
//!
//! and the corner-work residual
//!
//! ```text
//! f(e) = e − eⁿ + ½·(p(ρⁿ⁺¹, e) + qⁿ⁺¹)·Wⁿ⁺¹/m + ½·(pⁿ + qⁿ)·Wⁿ/m
//! ```
//!
//! are both solved by Newton iterations started from `eⁿ`, with a closed
//! form for the perfect gas.

use crate::eos::{EosState, MaterialEos};
use crate::error::EosError;

/// Viscous pressure entering the work term.
///
/// Centred: `(qⁿ⁺¹ + qⁿ)/2` when it does negative work on the volume
/// change; otherwise `qⁿ⁺¹` under the same test. Zero when the work would
/// be positive.
#[inline]
pub fn viscous_work_pressure(centered: bool, qn: f64, qn1: f64, dtau: f64) -> f64 {
    if centered {
        if (qn1 + qn) * dtau < 0.0 {
            0.5 * (qn1 + qn)
        } else {
            0.0
        }
    } else if qn1 * dtau < 0.0 {
        qn1
    } else {
        0.0
    }
}

/// Newton iteration limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Result of an energy solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergySolution {
    pub energy: f64,
    /// EOS at the returned energy
    pub eos: EosState,
    pub iterations: usize,
    pub converged: bool,
}

/// Newton iterations on `residual(e, eos(e))` with derivative
/// `derivative(eos(e))`.
fn newton<R, D>(
    eos: &MaterialEos,
    density: f64,
    start: f64,
    settings: NewtonSettings,
    residual: R,
    derivative: D,
) -> Result<EnergySolution, EosError>
where
    R: Fn(f64, &EosState) -> f64,
    D: Fn(&EosState) -> f64,
{
    let mut e = start;
    for iterations in 0..settings.max_iterations {
        let state = eos.evaluate(density, e)?;
        let f = residual(e, &state);
        if f.abs() < settings.tolerance {
            return Ok(EnergySolution {
                energy: e,
                eos: state,
                iterations,
                converged: true,
            });
        }
        let df = derivative(&state);
        if df == 0.0 || !df.is_finite() {
            break;
        }
        e -= f / df;
    }
    let state = eos.evaluate(density, e)?;
    Ok(EnergySolution {
        energy: e,
        eos: state,
        iterations: settings.max_iterations,
        converged: residual(e, &state).abs() < settings.tolerance,
    })
}

/// VNR inputs of one material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VnrEnergyInput {
    pub energy_n: f64,
    pub pressure_n: f64,
    /// Viscous pressure from [`viscous_work_pressure`]
    pub pseudo: f64,
    pub density_n: f64,
    pub density_n1: f64,
}

impl VnrEnergyInput {
    #[inline]
    fn dtau(&self) -> f64 {
        1.0 / self.density_n1 - 1.0 / self.density_n
    }

    /// Residual at energy `e` and pressure `p`.
    #[inline]
    pub fn residual(&self, e: f64, p: f64) -> f64 {
        e - self.energy_n + 0.5 * (p + self.pressure_n + 2.0 * self.pseudo) * self.dtau()
    }
}

/// Newton solve of the VNR residual.
pub fn solve_vnr(
    eos: &MaterialEos,
    input: &VnrEnergyInput,
    settings: NewtonSettings,
) -> Result<EnergySolution, EosError> {
    let dtau = input.dtau();
    newton(
        eos,
        input.density_n1,
        input.energy_n,
        settings,
        |e, s| input.residual(e, s.pressure),
        |s| 1.0 + 0.5 * s.dpde * dtau,
    )
}

/// Closed-form VNR energy of a perfect gas.
pub fn solve_vnr_perfect_gas(gamma: f64, input: &VnrEnergyInput) -> f64 {
    let dtau = input.dtau();
    let num = input.energy_n - (0.5 * input.pressure_n + input.pseudo) * dtau;
    let den = 1.0 + 0.5 * (gamma - 1.0) * input.density_n1 * dtau;
    num / den
}

/// Corner-work inputs of one material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerWorkInput {
    pub energy_n: f64,
    pub pressure_n: f64,
    pub pseudo_n: f64,
    pub pseudo_n1: f64,
    pub density_n1: f64,
    /// `Δt·Σ_p Cⁿ_pc·v_p`, scaled by the volume fraction
    pub work_n: f64,
    /// `Δt·Σ_p Cⁿ⁺¹_pc·v_p`, scaled by the volume fraction
    pub work_n1: f64,
    /// Material mass
    pub mass: f64,
}

impl CornerWorkInput {
    /// Residual at energy `e` and pressure `p`.
    #[inline]
    pub fn residual(&self, e: f64, p: f64) -> f64 {
        e - self.energy_n
            + 0.5 * (p + self.pseudo_n1) * self.work_n1 / self.mass
            + 0.5 * (self.pressure_n + self.pseudo_n) * self.work_n / self.mass
    }
}

/// Newton solve of the corner-work residual.
pub fn solve_corner_work(
    eos: &MaterialEos,
    input: &CornerWorkInput,
    settings: NewtonSettings,
) -> Result<EnergySolution, EosError> {
    let slope = 0.5 * input.work_n1 / input.mass;
    newton(
        eos,
        input.density_n1,
        input.energy_n,
        settings,
        |e, s| input.residual(e, s.pressure),
        |s| 1.0 + s.dpde * slope,
    )
}

/// Closed-form corner-work energy of a perfect gas.
pub fn solve_corner_work_perfect_gas(gamma: f64, input: &CornerWorkInput) -> f64 {
    let num = input.energy_n
        - 0.5 * input.pseudo_n1 * input.work_n1 / input.mass
        - 0.5 * (input.pressure_n + input.pseudo_n) * input.work_n / input.mass;
    let den = 1.0 + 0.5 * (gamma - 1.0) * input.density_n1 * input.work_n1 / input.mass;
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: NewtonSettings = NewtonSettings {
        tolerance: 1e-12,
        max_iterations: 50,
    };

    fn compression() -> VnrEnergyInput {
        VnrEnergyInput {
            energy_n: 2.5,
            pressure_n: 1.0,
            pseudo: 0.1,
            density_n: 1.0,
            density_n1: 1.1,
        }
    }

    #[test]
    fn test_newton_matches_closed_form_for_perfect_gas() {
        let eos = MaterialEos::perfect_gas(1.4);
        let input = compression();
        let newton = solve_vnr(&eos, &input, SETTINGS).unwrap();
        assert!(newton.converged);
        let exact = solve_vnr_perfect_gas(1.4, &input);
        assert!((newton.energy - exact).abs() < 1e-12);
        assert!(input.residual(newton.energy, newton.eos.pressure).abs() < 1e-12);
        // compression heats
        assert!(newton.energy > input.energy_n);
    }

    #[test]
    fn test_no_volume_change_keeps_energy() {
        let eos = MaterialEos::stiffened_gas(4.4, 0.6);
        let input = VnrEnergyInput {
            density_n1: 1.0,
            ..compression()
        };
        let s = solve_vnr(&eos, &input, SETTINGS).unwrap();
        assert!(s.converged);
        assert_eq!(s.iterations, 0);
        assert_eq!(s.energy, 2.5);
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let eos = MaterialEos::stiffened_gas(4.4, 0.6);
        let s = solve_vnr(
            &eos,
            &compression(),
            NewtonSettings {
                tolerance: 0.0,
                max_iterations: 1,
            },
        )
        .unwrap();
        assert!(!s.converged);
    }

    #[test]
    fn test_corner_work_newton_matches_closed_form() {
        let eos = MaterialEos::perfect_gas(1.4);
        let input = CornerWorkInput {
            energy_n: 2.5,
            pressure_n: 1.0,
            pseudo_n: 0.0,
            pseudo_n1: 0.05,
            density_n1: 1.05,
            work_n: -0.01,
            work_n1: -0.012,
            mass: 1.0,
        };
        let s = solve_corner_work(&eos, &input, SETTINGS).unwrap();
        assert!(s.converged);
        assert!((s.energy - solve_corner_work_perfect_gas(1.4, &input)).abs() < 1e-12);
    }

    #[test]
    fn test_viscous_work_pressure_selection() {
        // compression: dtau < 0
        assert_eq!(viscous_work_pressure(false, 0.2, 0.4, -0.1), 0.4);
        assert!((viscous_work_pressure(true, 0.2, 0.4, -0.1) - 0.3).abs() < 1e-15);
        assert_eq!(viscous_work_pressure(false, 0.2, 0.4, 0.1), 0.0);
        assert_eq!(viscous_work_pressure(true, 0.0, 0.0, -0.1), 0.0);
    }
}
