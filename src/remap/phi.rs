//! Layout of the transported vector Φ and its conserved counterpart U.
//!
//! Φ has `3·nbmat + 4` components per cell:
//!
//! | slots | intensive Φ | conserved U |
//! |-------|-------------|-------------|
//! | `[0, nbmat)` | volume fraction | material volume |
//! | `[nbmat, 2·nbmat)` | material density | material mass |
//! | `[2·nbmat, 3·nbmat)` | specific internal energy | material internal energy |
//! | `3·nbmat`, `3·nbmat+1` | cell velocity | momentum |
//! | `3·nbmat+2` | specific kinetic energy | kinetic energy |
//! | `3·nbmat+3` | pseudo-viscosity | volume × pseudo-viscosity |
//!
//! The plateau-pente fluxes integrate intensive profiles, so with it
//! enabled Φ is the intensive column above. Otherwise every slot is simply
//! `U / V`.

use crate::types::MAX_MATERIALS;

/// Width of Φ for `nbmat` materials.
#[inline]
pub const fn phi_width(nbmat: usize) -> usize {
    3 * nbmat + 4
}

/// Largest possible Φ width; lets per-cell vectors live on the stack.
pub const MAX_PHI: usize = phi_width(MAX_MATERIALS);

/// Fixed-capacity Φ/U/flux vector; only the first `width` slots are used.
pub type PhiVec = [f64; MAX_PHI];

/// Slot offsets of Φ for a given material count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhiLayout {
    pub nbmat: usize,
}

impl PhiLayout {
    pub const fn new(nbmat: usize) -> Self {
        Self { nbmat }
    }

    #[inline]
    pub const fn width(self) -> usize {
        phi_width(self.nbmat)
    }

    #[inline]
    pub const fn volume(self, imat: usize) -> usize {
        imat
    }

    #[inline]
    pub const fn mass(self, imat: usize) -> usize {
        self.nbmat + imat
    }

    #[inline]
    pub const fn energy(self, imat: usize) -> usize {
        2 * self.nbmat + imat
    }

    #[inline]
    pub const fn momentum_x(self) -> usize {
        3 * self.nbmat
    }

    #[inline]
    pub const fn momentum_y(self) -> usize {
        3 * self.nbmat + 1
    }

    #[inline]
    pub const fn kinetic(self) -> usize {
        3 * self.nbmat + 2
    }

    #[inline]
    pub const fn pseudo(self) -> usize {
        3 * self.nbmat + 3
    }

    /// Total mass held in a conserved vector.
    pub fn total_mass(self, u: &PhiVec) -> f64 {
        (0..self.nbmat).map(|m| u[self.mass(m)]).sum()
    }

    /// Total volume held in a conserved vector.
    pub fn total_volume(self, u: &PhiVec) -> f64 {
        (0..self.nbmat).map(|m| u[self.volume(m)]).sum()
    }

    /// Internal plus kinetic energy held in a conserved vector.
    pub fn total_energy(self, u: &PhiVec) -> f64 {
        (0..self.nbmat).map(|m| u[self.energy(m)]).sum::<f64>() + u[self.kinetic()]
    }

    /// Φ from U over a cell of volume `volume`.
    ///
    /// `intensive` selects the plateau-pente form.
    pub fn phi_from_conserved(self, u: &PhiVec, volume: f64, intensive: bool) -> PhiVec {
        let mut phi = [0.0; MAX_PHI];
        if volume <= 0.0 {
            return phi;
        }
        if !intensive {
            for k in 0..self.width() {
                phi[k] = u[k] / volume;
            }
            return phi;
        }

        let mut mass = 0.0;
        for imat in 0..self.nbmat {
            let vol = u[self.volume(imat)];
            let m = u[self.mass(imat)];
            phi[self.volume(imat)] = vol / volume;
            if vol != 0.0 {
                phi[self.mass(imat)] = m / vol;
            }
            if m != 0.0 {
                phi[self.energy(imat)] = u[self.energy(imat)] / m;
            }
            mass += m;
        }
        if mass != 0.0 {
            phi[self.momentum_x()] = u[self.momentum_x()] / mass;
            phi[self.momentum_y()] = u[self.momentum_y()] / mass;
            phi[self.kinetic()] = u[self.kinetic()] / mass;
        }
        phi[self.pseudo()] = u[self.pseudo()] / volume;
        phi
    }
}

/// Add `b` to `a` over the first `width` slots.
#[inline]
pub fn add_assign(a: &mut PhiVec, b: &PhiVec, width: usize) {
    for k in 0..width {
        a[k] += b[k];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let l = PhiLayout::new(2);
        assert_eq!(l.width(), 10);
        assert_eq!(l.mass(1), 3);
        assert_eq!(l.energy(0), 4);
        assert_eq!(l.momentum_x(), 6);
        assert_eq!(l.pseudo(), 9);
        assert_eq!(MAX_PHI, 13);
    }

    #[test]
    fn test_intensive_conversion() {
        let l = PhiLayout::new(2);
        let mut u = [0.0; MAX_PHI];
        // material 0: volume 1.5, mass 3, energy 6; material 1: volume 0.5, mass 0.25, energy 1
        u[0] = 1.5;
        u[1] = 0.5;
        u[2] = 3.0;
        u[3] = 0.25;
        u[4] = 6.0;
        u[5] = 1.0;
        u[l.momentum_x()] = 3.25;
        u[l.kinetic()] = 6.5;
        u[l.pseudo()] = 0.2;
        let phi = l.phi_from_conserved(&u, 2.0, true);
        assert!((phi[0] - 0.75).abs() < 1e-14);
        assert!((phi[2] - 2.0).abs() < 1e-14);
        assert!((phi[3] - 0.5).abs() < 1e-14);
        assert!((phi[4] - 2.0).abs() < 1e-14);
        assert!((phi[l.momentum_x()] - 1.0).abs() < 1e-14);
        assert!((phi[l.kinetic()] - 2.0).abs() < 1e-14);
        assert!((phi[l.pseudo()] - 0.1).abs() < 1e-14);
    }

    #[test]
    fn test_extensive_conversion_and_totals() {
        let l = PhiLayout::new(1);
        let mut u = [0.0; MAX_PHI];
        u[0] = 2.0;
        u[1] = 4.0;
        u[2] = 8.0;
        u[l.kinetic()] = 1.0;
        let phi = l.phi_from_conserved(&u, 2.0, false);
        assert_eq!(&phi[..3], &[1.0, 2.0, 4.0]);
        assert_eq!(l.total_mass(&u), 4.0);
        assert_eq!(l.total_energy(&u), 9.0);
        assert_eq!(l.total_volume(&u), 2.0);
    }
}
