//! Von Neumann-Richtmyer artificial viscosity.

/// Mean specific volume `τ = (1/ρ^{n+1} + 1/ρ^n) / 2`.
#[inline]
pub fn mean_specific_volume(rho_n: f64, rho_n1: f64) -> f64 {
    0.5 * (1.0 / rho_n1 + 1.0 / rho_n)
}

/// Velocity divergence from the change in specific volume over `dt`.
#[inline]
pub fn velocity_divergence(rho_n: f64, rho_n1: f64, dt: f64) -> f64 {
    let tau = mean_specific_volume(rho_n, rho_n1);
    (1.0 / rho_n1 - 1.0 / rho_n) / (dt * tau)
}

/// Cell artificial viscosity.
///
/// Linear plus quadratic term in compression, zero in expansion:
///
/// ```text
/// q = (1/τ)·(−½·√V·c·divu + (γ+1)/2·V·divu²)   if divu < 0
/// ```
///
/// # Arguments
/// * `volume` - Cell volume at `n+1`
/// * `sound_speed` - Cell sound speed at `n`
/// * `divu` - Velocity divergence
/// * `tau` - Mean specific volume
/// * `gamma` - Volume-fraction weighted adiabatic exponent
#[inline]
pub fn artificial_viscosity(volume: f64, sound_speed: f64, divu: f64, tau: f64, gamma: f64) -> f64 {
    if divu >= 0.0 {
        return 0.0;
    }
    (1.0 / tau) * (-0.5 * volume.sqrt() * sound_speed * divu + 0.5 * (gamma + 1.0) * volume * divu * divu)
}
