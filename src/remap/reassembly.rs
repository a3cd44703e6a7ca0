//! Conversion between the Lagrangian state and the remapped vector U.

use super::dual::DualState;
use super::phi::{PhiLayout, PhiVec, MAX_PHI};
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::state::{Fields, LagrangianMasses};
use crate::types::{CellIndex, Vec2, MAX_MATERIALS};

/// Specific kinetic energy of a cell seen from its four nodes.
pub fn nodal_kinetic_energy<M: MeshTopology + ?Sized>(mesh: &M, cell: CellIndex, velocity: &[Vec2]) -> f64 {
    0.25 * mesh
        .nodes_of(cell)
        .iter()
        .map(|p| 0.5 * velocity[*p].dot(velocity[*p]))
        .sum::<f64>()
}

/// U of every cell from the end-of-Lagrange fields.
pub fn conserved_from_fields<M: MeshTopology + ?Sized>(
    mesh: &M,
    layout: PhiLayout,
    fields: &Fields,
    masses: &LagrangianMasses,
) -> Vec<PhiVec> {
    let cells = &fields.cells;
    let velocity = &fields.nodes.velocity;
    parallel::map_collect(mesh.n_cells(), |c| {
        let cell = CellIndex::new(c);
        let volume = cells.volume[c];
        let mut u = [0.0; MAX_PHI];
        let mut mass = 0.0;
        for imat in 0..layout.nbmat {
            let m = masses.env[c][imat];
            u[layout.volume(imat)] = cells.env.fraction[c][imat] * volume;
            u[layout.mass(imat)] = m;
            u[layout.energy(imat)] = m * cells.env.energy[c][imat];
            mass += m;
        }
        let nodes = mesh.nodes_of(cell);
        let v_cell = nodes.iter().fold(Vec2::ZERO, |acc, p| acc + velocity[*p]) * 0.25;
        u[layout.momentum_x()] = mass * v_cell.x;
        u[layout.momentum_y()] = mass * v_cell.y;
        u[layout.kinetic()] = mass * nodal_kinetic_energy(mesh, cell, velocity);
        u[layout.pseudo()] = volume * cells.pseudo[c];
        u
    })
}

/// Options of [`reassemble`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReassemblyOptions {
    pub layout: PhiLayout,
    /// Volume fractions below this are removed
    pub threshold: f64,
    pub kinetic_energy_fix: bool,
}

/// Cell-level result of the reassembly, before it is written back.
#[derive(Clone, Copy, Debug, Default)]
struct CellRemap {
    fraction: [f64; MAX_MATERIALS],
    mass_fraction: [f64; MAX_MATERIALS],
    density: [f64; MAX_MATERIALS],
    energy: [f64; MAX_MATERIALS],
    mass: [f64; MAX_MATERIALS],
    pseudo: f64,
    kinetic_deficit: f64,
}

/// Write the remapped U and nodal state back into `fields` and `masses`.
///
/// `volume` is the Eulerian cell volume. Fractions under the threshold are
/// dropped with their mass and the rest renormalised. Returns the kinetic
/// energy returned to internal energy, summed over cells.
pub fn reassemble<M: MeshTopology + ?Sized>(
    mesh: &M,
    options: &ReassemblyOptions,
    conserved: &[PhiVec],
    dual: &DualState,
    volume: &[f64],
    fields: &mut Fields,
    masses: &mut LagrangianMasses,
) -> f64 {
    let layout = options.layout;
    let nbmat = layout.nbmat;
    let velocity = dual.velocities();

    let remapped: Vec<CellRemap> = parallel::map_collect(mesh.n_cells(), |c| {
        let cell = CellIndex::new(c);
        let u = &conserved[c];
        let mut out = CellRemap::default();

        let total_volume: f64 = (0..nbmat).map(|m| u[layout.volume(m)].max(0.0)).sum();
        if total_volume <= 0.0 {
            return out;
        }
        let mut kept = 0.0;
        for imat in 0..nbmat {
            let f = u[layout.volume(imat)].max(0.0) / total_volume;
            if f >= options.threshold && u[layout.mass(imat)] > 0.0 {
                out.fraction[imat] = f;
                kept += f;
            }
        }
        if kept <= 0.0 {
            return out;
        }

        let mut cell_mass = 0.0;
        for imat in 0..nbmat {
            if out.fraction[imat] == 0.0 {
                continue;
            }
            let m = u[layout.mass(imat)];
            out.mass[imat] = m;
            out.density[imat] = m / u[layout.volume(imat)];
            out.fraction[imat] /= kept;
            out.energy[imat] = u[layout.energy(imat)] / m;
            cell_mass += m;
        }
        for imat in 0..nbmat {
            out.mass_fraction[imat] = out.mass[imat] / cell_mass;
        }
        out.pseudo = u[layout.pseudo()] / total_volume;

        if options.kinetic_energy_fix {
            let deficit = u[layout.kinetic()] - cell_mass * nodal_kinetic_energy(mesh, cell, &velocity);
            if deficit > 0.0 {
                out.kinetic_deficit = deficit;
                for imat in 0..nbmat {
                    if out.mass[imat] > 0.0 {
                        out.energy[imat] += deficit / cell_mass;
                    }
                }
            }
        }
        out
    });

    let cells = &mut fields.cells;
    let mut returned = 0.0;
    for (c, r) in remapped.iter().enumerate() {
        let mass: f64 = r.mass.iter().sum();
        cells.env.fraction[c] = r.fraction;
        cells.env.mass_fraction[c] = r.mass_fraction;
        cells.env.density[c] = r.density;
        cells.env.energy[c] = r.energy;
        for imat in 0..MAX_MATERIALS {
            cells.env.pseudo[c][imat] = r.fraction[imat] * r.pseudo;
        }
        cells.density[c] = if volume[c] > 0.0 { mass / volume[c] } else { 0.0 };
        cells.energy[c] = (0..nbmat).map(|m| r.mass_fraction[m] * r.energy[m]).sum();
        cells.pseudo[c] = r.pseudo;
        masses.cell[c] = mass;
        masses.env[c] = r.mass;
        returned += r.kinetic_deficit;
    }
    fields.nodes.velocity = velocity;
    returned
}
