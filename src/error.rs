//! Error types for the hydrodynamics solver.

use thiserror::Error;

use crate::eos::EosKind;
use crate::types::CellIndex;

/// Equation-of-state failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EosError {
    /// Closure selected but not available.
    #[error("equation of state {0:?} is not implemented")]
    NotImplemented(EosKind),

    /// Integer code outside the supported set.
    #[error("unknown equation of state code {0}")]
    UnknownCode(u32),
}

/// Configuration rejected at setup, before the time loop starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum HydroError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Eos(#[from] EosError),

    /// Post-update material density below zero.
    #[error("negative density {density:e} for material {material} in cell {cell}")]
    NegativeDensity {
        cell: CellIndex,
        material: usize,
        density: f64,
    },

    /// Artificial viscosity below zero.
    #[error("negative pseudo-viscosity {value:e} in cell {cell}")]
    NegativePseudoViscosity { cell: CellIndex, value: f64 },

    /// Newton energy solve did not converge and the policy asks to abort.
    #[error("energy solve failed to converge in {cells} cell(s)")]
    NewtonDivergence { cells: usize },

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Mesh and state arrays disagree, or the mesh is degenerate.
    #[error("mesh mismatch: {0}")]
    MeshMismatch(String),

    /// Time step collapsed to zero or a non-finite value.
    #[error("invalid time step {0:e}")]
    InvalidTimeStep(f64),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HydroError>;
