//! Material closures and cell averages.

use crate::eos::{EosState, MaterialEos};
use crate::error::EosError;
use crate::parallel;
use crate::state::CellFields;
use crate::types::MAX_MATERIALS;

/// Evaluate every material closure of every cell.
///
/// Materials with no density get a zero state.
pub fn update_material_eos(materials: &[MaterialEos], cells: &mut CellFields) -> Result<(), EosError> {
    let env = &cells.env;
    let states: Vec<[EosState; MAX_MATERIALS]> = parallel::try_map_collect(cells.n_cells(), |c| {
        let mut out = [EosState::default(); MAX_MATERIALS];
        for (imat, eos) in materials.iter().enumerate() {
            let density = env.density[c][imat];
            if density > 0.0 {
                out[imat] = eos.evaluate(density, env.energy[c][imat])?;
            }
        }
        Ok(out)
    })?;
    for (c, s) in states.iter().enumerate() {
        for imat in 0..materials.len() {
            cells.env.pressure[c][imat] = s[imat].pressure;
            cells.env.sound_speed[c][imat] = s[imat].sound_speed;
            cells.env.dpde[c][imat] = s[imat].dpde;
        }
    }
    Ok(())
}

/// Cell pressure `Σ f_k p_k`, sound speed `max c_k`, density `Σ f_k ρ_k`
/// and energy `Σ x_k e_k`.
pub fn average_cell_state(nbmat: usize, cells: &mut CellFields) {
    for c in 0..cells.n_cells() {
        let env = &cells.env;
        let mut pressure = 0.0;
        let mut sound_speed: f64 = 0.0;
        let mut density = 0.0;
        let mut energy = 0.0;
        for imat in 0..nbmat {
            let f = env.fraction[c][imat];
            pressure += f * env.pressure[c][imat];
            density += f * env.density[c][imat];
            energy += env.mass_fraction[c][imat] * env.energy[c][imat];
            sound_speed = sound_speed.max(env.sound_speed[c][imat]);
        }
        cells.pressure[c] = pressure;
        cells.sound_speed[c] = sound_speed;
        cells.density[c] = density;
        cells.energy[c] = energy;
    }
}

/// Volume-fraction weighted γ of a cell.
#[inline]
pub fn mixture_gamma(materials: &[MaterialEos], fraction: &[f64]) -> f64 {
    materials.iter().zip(fraction).map(|(m, f)| m.gamma * f).sum()
}
