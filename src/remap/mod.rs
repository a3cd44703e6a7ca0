//! Remap (projection) of the Lagrangian state onto the fixed mesh.
//!
//! The projection is split into two directional sweeps whose order
//! alternates between steps. Each sweep transports the cell vector U
//! (volumes, masses, energies, momentum, kinetic energy, viscosity) across
//! faces and the nodal velocities across dual faces.
//!
//! - [`phi`]: layout of U and Φ
//! - [`limiters`]: classical and generalized slope limiters
//! - [`plateau_pente`]: bounded piecewise reconstruction and its fluxes
//! - [`order3`]: third-order face flux
//! - [`sweep`]: one directional sweep on cells
//! - [`dual`]: the companion sweep on nodes
//! - [`reassembly`]: conversion between fields and U

pub mod dual;
mod engine;
pub mod limiters;
pub mod order3;
pub mod phi;
pub mod plateau_pente;
pub mod reassembly;
pub mod sweep;

pub use dual::{DualFluxMethod, DualFluxProvider};
pub use engine::{RemapEngine, RemapReport};
pub use limiters::LimiterKind;
pub use phi::{phi_width, PhiLayout, PhiVec, MAX_PHI};
pub use sweep::{directional_sweep, SweepInput, SweepOptions, SweepOutput};
