//! Third-order upwind flux on a six-cell stencil.
//!
//! The stencil around a face is `[b3, b2, b1 | f1, f2, f3]`: three cells
//! behind and three ahead along the sweep axis, repeated at the domain
//! boundary. In each donor cell the profile is the unique parabola whose
//! averages match the cell and its two neighbours; it is integrated through
//! the primitive function, interpolated by a cubic over the four
//! bracketing interfaces. The swept distance may reach into the second
//! donor cell, which is why three cells are needed on each side.
//!
//! The result is the signed amount crossing the face along `+axis` per unit
//! face length, already multiplied by `u·Δt`.

use super::phi::{PhiVec, MAX_PHI};

/// Cubic Lagrange interpolation through four points.
fn lagrange_cubic(xs: &[f64; 4], ws: &[f64; 4], x: f64) -> f64 {
    let mut value = 0.0;
    for i in 0..4 {
        let mut basis = 1.0;
        for j in 0..4 {
            if i != j {
                basis *= (x - xs[j]) / (xs[i] - xs[j]);
            }
        }
        value += ws[i] * basis;
    }
    value
}

/// Integral over the last `d` of the middle cell of `(left, mid, right)`.
///
/// # Arguments
/// * `h` - Widths `[left, mid, right]`
/// * `phi` - Averages `[left, mid, right]`
/// * `d` - Length of the window ending at the right edge of `mid`
pub fn tail_integral(h: [f64; 3], phi: [f64; 3], d: f64) -> f64 {
    let d = d.min(h[1]);
    if d <= 0.0 {
        return 0.0;
    }
    if h.iter().any(|w| *w <= 0.0) {
        return phi[1] * d;
    }
    let xs = [0.0, h[0], h[0] + h[1], h[0] + h[1] + h[2]];
    let ws = [
        0.0,
        phi[0] * h[0],
        phi[0] * h[0] + phi[1] * h[1],
        phi[0] * h[0] + phi[1] * h[1] + phi[2] * h[2],
    ];
    ws[2] - lagrange_cubic(&xs, &ws, xs[2] - d)
}

/// Integral over the first `d` of the middle cell of `(left, mid, right)`.
#[inline]
pub fn head_integral(h: [f64; 3], phi: [f64; 3], d: f64) -> f64 {
    tail_integral([h[2], h[1], h[0]], [phi[2], phi[1], phi[0]], d)
}

/// Signed third-order flux of one component.
///
/// # Arguments
/// * `h` - Widths of `[b3, b2, b1, f1, f2, f3]`
/// * `phi` - Values on the same cells
/// * `swept` - `faceNormalVelocity · Δt`, positive towards `f1`
pub fn third_order_flux(h: &[f64; 6], phi: &[f64; 6], swept: f64) -> f64 {
    if swept > 0.0 {
        let first = swept.min(h[2]);
        let mut flux = tail_integral([h[1], h[2], h[3]], [phi[1], phi[2], phi[3]], first);
        let rest = swept - first;
        if rest > 0.0 {
            flux += tail_integral([h[0], h[1], h[2]], [phi[0], phi[1], phi[2]], rest);
        }
        flux
    } else if swept < 0.0 {
        let distance = -swept;
        let first = distance.min(h[3]);
        let mut flux = head_integral([h[2], h[3], h[4]], [phi[2], phi[3], phi[4]], first);
        let rest = distance - first;
        if rest > 0.0 {
            flux += head_integral([h[3], h[4], h[5]], [phi[3], phi[4], phi[5]], rest);
        }
        -flux
    } else {
        0.0
    }
}

/// Componentwise third-order flux of a Φ vector.
pub fn third_order_flux_vec(width: usize, h: &[f64; 6], phi: [&PhiVec; 6], swept: f64) -> PhiVec {
    let mut flux = [0.0; MAX_PHI];
    for k in 0..width {
        let values = phi.map(|p| p[k]);
        flux[k] = third_order_flux(h, &values, swept);
    }
    flux
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    /// Cell averages of x² on unit cells [-3, 3].
    fn quadratic_averages() -> [f64; 6] {
        let mut phi = [0.0; 6];
        for (k, a) in (-3..3).enumerate() {
            let (a, b) = (a as f64, a as f64 + 1.0);
            phi[k] = (b * b * b - a * a * a) / 3.0;
        }
        phi
    }

    #[test]
    fn test_constant_field_gives_upwind_flux() {
        let h = [0.5, 1.0, 2.0, 1.0, 0.7, 1.3];
        let phi = [3.0; 6];
        assert!((third_order_flux(&h, &phi, 0.4) - 1.2).abs() < TOL);
        assert!((third_order_flux(&h, &phi, -0.4) + 1.2).abs() < TOL);
    }

    #[test]
    fn test_quadratic_profile_is_exact() {
        let h = [1.0; 6];
        let phi = quadratic_averages();
        // ∫_{-0.5}^{0} x² dx
        assert!((third_order_flux(&h, &phi, 0.5) - 0.125 / 3.0).abs() < TOL);
        // ∫_{-1.5}^{0} x² dx reaches into the second donor cell
        assert!((third_order_flux(&h, &phi, 1.5) - 1.125).abs() < TOL);
        // -∫_{0}^{0.5} x² dx
        assert!((third_order_flux(&h, &phi, -0.5) + 0.125 / 3.0).abs() < TOL);
    }

    #[test]
    fn test_zero_velocity_no_flux() {
        let h = [1.0; 6];
        assert_eq!(third_order_flux(&h, &quadratic_averages(), 0.0), 0.0);
    }

    #[test]
    fn test_nonuniform_linear_is_exact() {
        // φ(x) = 2x + 1 on cells of varying width ending at the face x = 0
        let h = [0.3, 0.6, 0.4, 0.5, 0.2, 0.8];
        let mut edges = [0.0; 7];
        edges[3] = 0.0;
        for k in (0..3).rev() {
            edges[k] = edges[k + 1] - h[k];
        }
        for k in 3..6 {
            edges[k + 1] = edges[k] + h[k];
        }
        let mut phi = [0.0; 6];
        for k in 0..6 {
            phi[k] = edges[k] + edges[k + 1] + 1.0;
        }
        let swept = 0.25;
        // ∫_{-s}^{0} (2x + 1) dx
        let exact = swept - swept * swept;
        assert!((third_order_flux(&h, &phi, swept) - exact).abs() < TOL);
    }
}
