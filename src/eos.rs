//! Per-material equations of state.
//!
//! Each material carries an [`EosKind`] and its parameters. The closure is a
//! pure function of `(density, specific internal energy)` returning pressure,
//! sound speed and `∂p/∂e`, cheap enough for the per-cell, per-material
//! loops of the Lagrangian phase and the Newton energy solve.
//!
//! | Kind | Code | Pressure |
//! |------|------|----------|
//! | Void | 100 | 0 |
//! | PerfectGas | 101 | (γ-1) ρ e |
//! | StiffenedGas | 102 | (γ-1) ρ e - γ p∞ |
//! | Fictitious | 103 | constant |
//! | SolidLinear | 104 | not implemented |

use serde::{Deserialize, Serialize};

use crate::error::EosError;

/// Pressure returned by the fictitious material.
pub const FICTITIOUS_PRESSURE: f64 = 5.0;

/// Closed set of supported equations of state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EosKind {
    Void,
    PerfectGas,
    StiffenedGas,
    Fictitious,
    SolidLinear,
}

impl EosKind {
    /// Legacy integer code.
    pub fn code(self) -> u32 {
        match self {
            EosKind::Void => 100,
            EosKind::PerfectGas => 101,
            EosKind::StiffenedGas => 102,
            EosKind::Fictitious => 103,
            EosKind::SolidLinear => 104,
        }
    }
}

impl TryFrom<u32> for EosKind {
    type Error = EosError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            100 => Ok(EosKind::Void),
            101 => Ok(EosKind::PerfectGas),
            102 => Ok(EosKind::StiffenedGas),
            103 => Ok(EosKind::Fictitious),
            104 => Ok(EosKind::SolidLinear),
            other => Err(EosError::UnknownCode(other)),
        }
    }
}

/// Thermodynamic closure output for one material in one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EosState {
    pub pressure: f64,
    pub sound_speed: f64,
    /// ∂p/∂e at constant density
    pub dpde: f64,
}

/// Equation of state of one material with its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialEos {
    pub kind: EosKind,
    /// Adiabatic exponent γ
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Stiffening pressure p∞ of the stiffened gas
    #[serde(default = "default_tension_limit")]
    pub tension_limit: f64,
}

fn default_gamma() -> f64 {
    1.4
}

fn default_tension_limit() -> f64 {
    0.01
}

impl Default for MaterialEos {
    fn default() -> Self {
        Self::perfect_gas(default_gamma())
    }
}

impl MaterialEos {
    /// Perfect gas with the given γ.
    pub fn perfect_gas(gamma: f64) -> Self {
        Self {
            kind: EosKind::PerfectGas,
            gamma,
            tension_limit: default_tension_limit(),
        }
    }

    /// Stiffened gas with γ and p∞.
    pub fn stiffened_gas(gamma: f64, tension_limit: f64) -> Self {
        Self {
            kind: EosKind::StiffenedGas,
            gamma,
            tension_limit,
        }
    }

    /// Evaluate the closure at `(density, energy)`.
    #[inline]
    pub fn evaluate(&self, density: f64, energy: f64) -> Result<EosState, EosError> {
        compute_eos(self.kind, self.gamma, self.tension_limit, density, energy)
    }
}

/// Pressure, sound speed and `∂p/∂e` of a material.
///
/// # Arguments
/// * `kind` - Closure variant
/// * `gamma` - Adiabatic exponent
/// * `tension_limit` - Stiffening pressure (stiffened gas only)
/// * `density` - Material density
/// * `energy` - Specific internal energy
///
/// # Errors
/// `EosError::NotImplemented` for [`EosKind::SolidLinear`].
#[inline]
pub fn compute_eos(
    kind: EosKind,
    gamma: f64,
    tension_limit: f64,
    density: f64,
    energy: f64,
) -> Result<EosState, EosError> {
    match kind {
        EosKind::PerfectGas => Ok(EosState {
            pressure: (gamma - 1.0) * density * energy,
            sound_speed: (gamma * (gamma - 1.0) * energy).max(0.0).sqrt(),
            dpde: (gamma - 1.0) * density,
        }),
        EosKind::Void => Ok(EosState::default()),
        EosKind::StiffenedGas => {
            if density == 0.0 {
                return Ok(EosState::default());
            }
            let pressure = (gamma - 1.0) * density * energy - gamma * tension_limit;
            Ok(EosState {
                pressure,
                sound_speed: ((gamma / density) * (pressure + tension_limit)).max(0.0).sqrt(),
                dpde: (gamma - 1.0) * density,
            })
        }
        EosKind::Fictitious => Ok(EosState {
            pressure: FICTITIOUS_PRESSURE,
            sound_speed: (gamma * (gamma - 1.0) * energy).max(0.0).sqrt(),
            dpde: 0.0,
        }),
        EosKind::SolidLinear => Err(EosError::NotImplemented(kind)),
    }
}
