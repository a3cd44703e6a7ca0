//! Registry of initial conditions.
//!
//! Scenarios are looked up by name; an unknown name is an error at setup.
//! Positions passed to a scenario are normalised to the unit square so the
//! same scenario works on any rectangle.

use std::fmt;
use std::str::FromStr;

use crate::boundary::KinematicBc;
use crate::config::SolverConfig;
use crate::eos::MaterialEos;
use crate::error::HydroError;
use crate::mesh::{geometry, CartesianMesh2D, MeshTopology};
use crate::remap::PhiLayout;
use crate::state::HydroState;
use crate::types::{CellIndex, MaterialArray, Sides, Vec2, MAX_MATERIALS};

/// Sedov blast energy in the corner cell, per unit mass times volume.
const SEDOV_ENERGY: f64 = 0.244816;

/// Background specific energy of the Sedov scenario.
const SEDOV_BACKGROUND_ENERGY: f64 = 1e-6;

/// Translation speed of the advection scenarios.
const ADVECTION_SPEED: f64 = 1.0;

/// Named initial condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Uniform single material at rest, `ρ = 1`, `e = 2.5`
    Unit,
    /// Same state, two materials split at `x = 1/2`
    BiUnit,
    /// Sod shock tube along x
    SodX,
    /// Sod shock tube along y
    SodY,
    /// Two-material Sod along x
    BiSodX,
    /// Two-material Sod along y
    BiSodY,
    /// Density slab translated along x at constant pressure
    AdvectionX,
    /// Material slab translated along x at constant pressure
    BiAdvectionX,
    /// Point energy deposit in the lower-left cell
    Sedov,
}

impl Scenario {
    pub const ALL: [Scenario; 9] = [
        Scenario::Unit,
        Scenario::BiUnit,
        Scenario::SodX,
        Scenario::SodY,
        Scenario::BiSodX,
        Scenario::BiSodY,
        Scenario::AdvectionX,
        Scenario::BiAdvectionX,
        Scenario::Sedov,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Unit => "unit",
            Scenario::BiUnit => "bi_unit",
            Scenario::SodX => "sod_x",
            Scenario::SodY => "sod_y",
            Scenario::BiSodX => "bi_sod_x",
            Scenario::BiSodY => "bi_sod_y",
            Scenario::AdvectionX => "advection_x",
            Scenario::BiAdvectionX => "bi_advection_x",
            Scenario::Sedov => "sedov",
        }
    }

    /// Materials the scenario needs.
    pub fn required_materials(self) -> usize {
        match self {
            Scenario::BiUnit | Scenario::BiSodX | Scenario::BiSodY | Scenario::BiAdvectionX => 2,
            _ => 1,
        }
    }

    /// Initial velocity of every node.
    pub fn velocity(self) -> Vec2 {
        match self {
            Scenario::AdvectionX | Scenario::BiAdvectionX => Vec2::new(ADVECTION_SPEED, 0.0),
            _ => Vec2::ZERO,
        }
    }

    /// Material index, density and pressure at a normalised position.
    fn primitive(self, at: Vec2) -> (usize, f64, f64) {
        let left_x = at.x < 0.5;
        let left_y = at.y < 0.5;
        let slab = at.x > 0.25 && at.x < 0.5;
        match self {
            Scenario::Unit | Scenario::Sedov => (0, 1.0, 1.0),
            Scenario::BiUnit => (usize::from(!left_x), 1.0, 1.0),
            Scenario::SodX => sod(0, left_x),
            Scenario::SodY => sod(0, left_y),
            Scenario::BiSodX => sod(usize::from(!left_x), left_x),
            Scenario::BiSodY => sod(usize::from(!left_y), left_y),
            Scenario::AdvectionX => (0, if slab { 2.0 } else { 1.0 }, 1.0),
            Scenario::BiAdvectionX => {
                if slab {
                    (1, 2.0, 1.0)
                } else {
                    (0, 1.0, 1.0)
                }
            }
        }
    }

    /// Overwrite the boundary conditions the scenario depends on.
    ///
    /// The advection scenarios impose the translation velocity on the x
    /// sides and feed the left side with the upstream state.
    pub fn apply_boundary_conditions(self, config: &mut SolverConfig) {
        if !matches!(self, Scenario::AdvectionX | Scenario::BiAdvectionX) {
            return;
        }
        let imposed = KinematicBc::ImposedVelocity {
            vx: ADVECTION_SPEED,
            vy: 0.0,
        };
        config.boundary.kinematic = Sides::new(imposed, imposed, KinematicBc::Symmetry, KinematicBc::Symmetry);

        let layout = PhiLayout::new(config.nb_materials());
        let Some(material) = config.materials.first() else {
            return;
        };
        let (imat, density, pressure) = self.primitive(Vec2::new(0.0, 0.5));
        let energy = energy_from_pressure(material, density, pressure);
        let u = ADVECTION_SPEED;
        let mut inflow = vec![0.0; layout.width()];
        inflow[layout.volume(imat)] = u;
        inflow[layout.mass(imat)] = density * u;
        inflow[layout.energy(imat)] = density * energy * u;
        inflow[layout.momentum_x()] = density * u * u;
        inflow[layout.kinetic()] = density * 0.5 * u * u * u;
        config.boundary.flux = Sides {
            left: Some(inflow),
            ..Sides::default()
        };
    }

    /// Fill the current level of `state` with the initial condition.
    ///
    /// Sets fractions, mass fractions, material densities and energies,
    /// cell densities and node velocities; everything else is derived
    /// by the Lagrangian phase.
    pub fn initialize(
        self,
        mesh: &CartesianMesh2D,
        materials: &[MaterialEos],
        state: &mut HydroState,
    ) -> Result<(), HydroError> {
        if materials.len() < self.required_materials() {
            return Err(HydroError::Config(crate::error::ConfigError::invalid(format!(
                "scenario '{}' needs {} materials, got {}",
                self.name(),
                self.required_materials(),
                materials.len()
            ))));
        }
        let reference = state.reference_position.clone();
        let extent = Vec2::new(mesh.x1 - mesh.x0, mesh.y1 - mesh.y0);
        let origin = Vec2::new(mesh.x0, mesh.y0);
        let fields = state.fields.current_mut();
        let cells = &mut fields.cells;

        for cell in CellIndex::iter(mesh.n_cells()) {
            let nodes = geometry::cell_coordinates(mesh, cell, &reference);
            let center = geometry::cell_center(&nodes);
            let at = Vec2::new((center.x - origin.x) / extent.x, (center.y - origin.y) / extent.y);
            let (imat, density, pressure) = self.primitive(at);

            let mut energy = energy_from_pressure(&materials[imat], density, pressure);
            if self == Scenario::Sedov {
                let volume = geometry::polygon_area(&nodes);
                energy = if cell.get() == 0 {
                    SEDOV_ENERGY / (density * volume)
                } else {
                    SEDOV_BACKGROUND_ENERGY
                };
            }

            let mut fraction: MaterialArray = [0.0; MAX_MATERIALS];
            fraction[imat] = 1.0;
            let mut rho: MaterialArray = [0.0; MAX_MATERIALS];
            rho[imat] = density;
            let mut e: MaterialArray = [0.0; MAX_MATERIALS];
            e[imat] = energy;

            cells.env.fraction[cell] = fraction;
            cells.env.mass_fraction[cell] = fraction;
            cells.env.density[cell] = rho;
            cells.env.energy[cell] = e;
            cells.density[cell] = density;
            cells.energy[cell] = energy;
        }
        fields.nodes.velocity = vec![self.velocity(); mesh.n_nodes()];
        fields.nodes.position = reference;
        Ok(())
    }
}

/// Sod states: `(ρ, p) = (1, 1)` on the left, `(0.125, 0.1)` on the right.
fn sod(imat: usize, left: bool) -> (usize, f64, f64) {
    if left {
        (imat, 1.0, 1.0)
    } else {
        (imat, 0.125, 0.1)
    }
}

/// Specific energy giving pressure `p` at density `ρ` for a gas law.
fn energy_from_pressure(material: &MaterialEos, density: f64, pressure: f64) -> f64 {
    let gamma = material.gamma;
    if gamma <= 1.0 || density <= 0.0 {
        return 0.0;
    }
    match material.kind {
        crate::eos::EosKind::StiffenedGas => (pressure + gamma * material.tension_limit) / ((gamma - 1.0) * density),
        _ => pressure / ((gamma - 1.0) * density),
    }
}

impl FromStr for Scenario {
    type Err = HydroError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| HydroError::UnknownScenario(name.to_string()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        for s in Scenario::ALL {
            assert_eq!(s.name().parse::<Scenario>().unwrap(), s);
        }
        let err = "bogus".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, HydroError::UnknownScenario(ref n) if n == "bogus"));
    }

    #[test]
    fn test_sod_split() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 0.1, 10, 1).unwrap();
        let mut state = HydroState::new(&mesh, 2, mesh.node_coordinates());
        let materials = [MaterialEos::perfect_gas(1.4), MaterialEos::perfect_gas(1.4)];
        Scenario::BiSodX.initialize(&mesh, &materials, &mut state).unwrap();
        let env = &state.current().cells.env;
        assert_eq!(env.fraction[0], [1.0, 0.0, 0.0]);
        assert_eq!(env.fraction[9], [0.0, 1.0, 0.0]);
        assert!((env.energy[0][0] - 2.5).abs() < 1e-14);
        assert!((env.energy[9][1] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_two_material_scenario_needs_two_materials() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
        let mut state = HydroState::new(&mesh, 1, mesh.node_coordinates());
        let result = Scenario::BiUnit.initialize(&mesh, &[MaterialEos::default()], &mut state);
        assert!(matches!(result, Err(HydroError::Config(_))));
    }

    #[test]
    fn test_advection_boundaries() {
        let mut config = SolverConfig::default();
        Scenario::AdvectionX.apply_boundary_conditions(&mut config);
        let inflow = config.boundary.flux.left.as_ref().unwrap();
        assert_eq!(inflow.len(), 7);
        assert!((inflow[1] - 1.0).abs() < 1e-14);
        assert!(config.boundary.flux.right.is_none());
        assert!(config.validate().is_ok());
    }
}
