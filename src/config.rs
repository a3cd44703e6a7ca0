//! Solver configuration.
//!
//! Read once at setup, validated, then shared read-only by every phase.
//! Every field has a default so a TOML file only lists what it changes:
//!
//! ```toml
//! scenario = "bi_sod_x"
//! final_time = 0.2
//!
//! [[materials]]
//! kind = "perfect_gas"
//! gamma = 1.4
//!
//! [[materials]]
//! kind = "perfect_gas"
//! gamma = 1.4
//!
//! [projection]
//! enabled = true
//! order = 2
//! plateau_pente = true
//! limiter = "superbee_g"
//! ```

use serde::{Deserialize, Serialize};

use crate::boundary::KinematicBc;
use crate::eos::MaterialEos;
use crate::error::ConfigError;
use crate::remap::{phi_width, DualFluxMethod, LimiterKind};
use crate::types::{Side, Sides, MAX_MATERIALS};

/// Lagrangian scheme variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagrangeScheme {
    /// Von Neumann-Richtmyer staggered scheme
    #[default]
    Vnr,
    /// Corner-vector work variant with total-energy correction
    Csts,
}

/// How the new internal energy is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySolver {
    /// Newton iterations on the energy residual, any EOS
    #[default]
    Newton,
    /// Closed form, perfect gas only
    ClosedForm,
}

/// What to do when the Newton energy solve hits its iteration cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewtonFailurePolicy {
    /// Keep the last iterate, count the cell and log a warning
    #[default]
    Warn,
    /// Abort the run
    Abort,
}

/// Reference mesh description used by [`crate::Simulation::from_config`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    pub nx: usize,
    pub ny: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            nx: 4,
            ny: 4,
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        }
    }
}

/// Remap (projection) options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub enabled: bool,
    /// 1, 2 or 3
    pub order: u8,
    /// Bounded plateau-pente fluxes (order 2 only)
    pub plateau_pente: bool,
    /// Switch to `pure_limiter` in single-material neighbourhoods
    pub mixed_cell_limiting: bool,
    pub limiter: LimiterKind,
    pub pure_limiter: LimiterKind,
    /// Limiter of the nodal velocity gradients
    pub dual_limiter: LimiterKind,
    pub dual_flux: DualFluxMethod,
    /// Return kinetic energy lost by the nodal remap to internal energy
    pub kinetic_energy_fix: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: 2,
            plateau_pente: false,
            mixed_cell_limiting: false,
            limiter: LimiterKind::Minmod,
            pure_limiter: LimiterKind::Minmod,
            dual_limiter: LimiterKind::Minmod,
            dual_flux: DualFluxMethod::Averaging,
            kinetic_energy_fix: false,
        }
    }
}

/// Boundary conditions per domain side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Constraint on node velocities
    pub kinematic: Sides<KinematicBc>,
    /// Inflow flux vector (per unit length and time) added by the remap
    pub flux: Sides<Option<Vec<f64>>>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            kinematic: Sides::uniform(KinematicBc::Symmetry),
            flux: Sides::default(),
        }
    }
}

/// Complete solver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Scenario registry key
    pub scenario: String,
    pub mesh: MeshConfig,
    pub materials: Vec<MaterialEos>,
    pub final_time: f64,
    pub max_iterations: usize,
    pub cfl: f64,
    /// Volume-fraction and density cut-off, also the Newton tolerance
    pub threshold: f64,
    /// Overrides the automatic first time step
    pub deltat_init: Option<f64>,
    pub deltat_max: f64,
    pub scheme: LagrangeScheme,
    /// Time-centred artificial viscosity in the energy equation
    pub pseudo_centering: bool,
    pub energy_solver: EnergySolver,
    pub newton_max_iterations: usize,
    pub newton_failure: NewtonFailurePolicy,
    pub projection: ProjectionConfig,
    pub boundary: BoundaryConfig,
    /// Steps between snapshots; 0 disables them
    pub output_period: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scenario: "unit".to_string(),
            mesh: MeshConfig::default(),
            materials: vec![MaterialEos::default()],
            final_time: 1.0,
            max_iterations: 1_000_000,
            cfl: 0.1,
            threshold: 1e-10,
            deltat_init: None,
            deltat_max: 1.0,
            scheme: LagrangeScheme::Vnr,
            pseudo_centering: false,
            energy_solver: EnergySolver::Newton,
            newton_max_iterations: 50,
            newton_failure: NewtonFailurePolicy::Warn,
            projection: ProjectionConfig::default(),
            boundary: BoundaryConfig::default(),
            output_period: 0,
        }
    }
}

impl SolverConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Number of materials.
    pub fn nb_materials(&self) -> usize {
        self.materials.len()
    }

    /// CFL number used by the time step: halved when the remap is on.
    pub fn effective_cfl(&self) -> f64 {
        if self.projection.enabled {
            0.5 * self.cfl
        } else {
            self.cfl
        }
    }

    /// Check every option once, before the time loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nbmat = self.materials.len();
        if nbmat == 0 || nbmat > MAX_MATERIALS {
            return Err(ConfigError::invalid(format!(
                "number of materials must be in 1..={MAX_MATERIALS}, got {nbmat}"
            )));
        }
        for (imat, m) in self.materials.iter().enumerate() {
            if !(m.gamma > 0.0) {
                return Err(ConfigError::invalid(format!(
                    "material {imat}: gamma must be positive, got {}",
                    m.gamma
                )));
            }
        }
        if !(self.cfl > 0.0) {
            return Err(ConfigError::invalid("cfl must be positive"));
        }
        if !(self.threshold > 0.0) {
            return Err(ConfigError::invalid("threshold must be positive"));
        }
        if !(self.deltat_max > 0.0) {
            return Err(ConfigError::invalid("deltat_max must be positive"));
        }
        if let Some(dt) = self.deltat_init {
            if !(dt > 0.0) {
                return Err(ConfigError::invalid("deltat_init must be positive"));
            }
        }
        if self.newton_max_iterations == 0 {
            return Err(ConfigError::invalid("newton_max_iterations must be at least 1"));
        }
        if self.mesh.nx == 0 || self.mesh.ny == 0 {
            return Err(ConfigError::invalid("mesh needs at least one cell per direction"));
        }

        let p = &self.projection;
        if !(1..=3).contains(&p.order) {
            return Err(ConfigError::invalid(format!(
                "projection order must be 1, 2 or 3, got {}",
                p.order
            )));
        }
        if p.plateau_pente && p.order != 2 {
            return Err(ConfigError::invalid("plateau-pente requires projection order 2"));
        }
        if p.dual_flux == DualFluxMethod::PenteBorne && !p.plateau_pente {
            return Err(ConfigError::invalid(
                "the pente-borne dual flux needs plateau-pente fluxes",
            ));
        }
        if p.dual_limiter.is_generalized() {
            return Err(ConfigError::invalid(
                "the nodal limiter must be a classical (ratio) limiter",
            ));
        }

        let width = phi_width(nbmat);
        for side in Side::ALL {
            if let Some(flux) = self.boundary.flux.get(side) {
                if flux.len() != width {
                    return Err(ConfigError::invalid(format!(
                        "flux boundary on {side:?} has {} components, expected {width}",
                        flux.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
