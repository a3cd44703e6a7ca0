//! # ale-remap
//!
//! Two-dimensional multi-material ALE hydrodynamics on a structured
//! quadrilateral mesh.
//!
//! Each step runs a staggered Lagrangian phase (mesh moves with the flow)
//! followed by an optional projection back onto the reference mesh:
//! - Staggered Lagrangian scheme (VNR or corner-work CSTS) with artificial
//!   viscosity and a Newton energy closure
//! - Per-material equations of state (perfect gas, stiffened gas, ...)
//! - Alternating-direction remap with limited gradients, bounded
//!   plateau-pente fluxes and an optional third-order flux
//! - Nodal (dual mesh) remap of the velocity
//! - Scenario registry, conservation diagnostics and snapshot output
//!
//! ```no_run
//! use ale_remap::{Simulation, SolverConfig};
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     scenario = "sod_x"
//!     final_time = 0.2
//!     [mesh]
//!     nx = 100
//!     ny = 1
//!     x_min = 0.0
//!     x_max = 1.0
//!     y_min = 0.0
//!     y_max = 0.01
//! "#).unwrap();
//! let mut sim = Simulation::from_config(config).unwrap();
//! let summary = sim.run().unwrap();
//! println!("{} steps", summary.steps);
//! ```

pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod eos;
pub mod error;
pub mod lagrange;
pub mod mesh;
pub mod parallel;
pub mod remap;
pub mod scenario;
pub mod state;
pub mod time_loop;
pub mod types;

// Re-export main types for convenience
pub use boundary::{FluxBoundary, KinematicBc};
pub use config::{
    BoundaryConfig, EnergySolver, LagrangeScheme, MeshConfig, NewtonFailurePolicy, ProjectionConfig, SolverConfig,
};
pub use diagnostics::{
    DiagnosticsTracker, DriftSummary, GlobalDiagnostics, Snapshot, SnapshotRecorder, SnapshotSink, StepDiagnostics,
};
pub use eos::{compute_eos, EosKind, EosState, MaterialEos};
pub use error::{ConfigError, EosError, HydroError, Result};
pub use lagrange::{LagrangePhase, LagrangeReport};
pub use mesh::{CartesianMesh2D, MeshTopology};
pub use remap::{DualFluxMethod, LimiterKind, PhiLayout, RemapEngine, RemapReport};
pub use scenario::Scenario;
pub use state::{Fields, HydroState, SimulationState};
pub use time_loop::{RunSummary, Simulation, StepReport};
pub use types::{Axis, CellIndex, FaceIndex, NodeIndex, Side, Sides, Vec2};
