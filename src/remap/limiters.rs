//! Slope limiters for the remap gradients.
//!
//! Two families, selected by [`LimiterKind`]:
//!
//! - **Classical** (`Minmod`, `Superbee`, `VanLeer`): flux-limiter functions
//!   ψ(r) of the slope ratio. The cell gradient is the symmetric average
//!   `(ψ(g₊/g₋)·g₋ + ψ(g₋/g₊)·g₊) / 2`. A zero denominator yields a zero
//!   ratio.
//! - **Generalized** (`MinmodG`, `SuperbeeG`, `VanLeerG`): the gradient is
//!   bounded directly by the neighbour values and the cell widths so that the
//!   linear profile stays between the three cell values. This is the family
//!   used for volume fractions under plateau-pente.
//!
//! All limiters satisfy ψ(r) = 0 for r ≤ 0 and ψ(1) = 1.

use serde::{Deserialize, Serialize};

/// Limiter identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterKind {
    /// Zero gradient
    FirstOrder,
    Minmod,
    Superbee,
    VanLeer,
    MinmodG,
    SuperbeeG,
    VanLeerG,
}

/// Shape of a limiter shared by its classical and generalized forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimiterFamily {
    FirstOrder,
    Minmod,
    Superbee,
    VanLeer,
}

impl LimiterKind {
    /// `true` for the neighbour-bounded family.
    #[inline]
    pub fn is_generalized(self) -> bool {
        matches!(
            self,
            LimiterKind::MinmodG | LimiterKind::SuperbeeG | LimiterKind::VanLeerG
        )
    }

    #[inline]
    pub fn family(self) -> LimiterFamily {
        match self {
            LimiterKind::FirstOrder => LimiterFamily::FirstOrder,
            LimiterKind::Minmod | LimiterKind::MinmodG => LimiterFamily::Minmod,
            LimiterKind::Superbee | LimiterKind::SuperbeeG => LimiterFamily::Superbee,
            LimiterKind::VanLeer | LimiterKind::VanLeerG => LimiterFamily::VanLeer,
        }
    }

    /// Human-readable name for logging.
    pub fn name(self) -> &'static str {
        match self {
            LimiterKind::FirstOrder => "first_order",
            LimiterKind::Minmod => "minmod",
            LimiterKind::Superbee => "superbee",
            LimiterKind::VanLeer => "van_leer",
            LimiterKind::MinmodG => "minmod_g",
            LimiterKind::SuperbeeG => "superbee_g",
            LimiterKind::VanLeerG => "van_leer_g",
        }
    }

    /// Flux-limiter function ψ(r) of the classical family.
    #[inline]
    pub fn psi(self, r: f64) -> f64 {
        match self.family() {
            LimiterFamily::FirstOrder => 0.0,
            LimiterFamily::Minmod => r.min(1.0).max(0.0),
            LimiterFamily::Superbee => (2.0 * r).min(1.0).max(r.min(2.0)).max(0.0),
            LimiterFamily::VanLeer => (r + r.abs()) / (1.0 + r.abs()),
        }
    }
}

/// `a / b`, or 0 when `b` is zero.
#[inline]
pub fn divide_or_zero(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}

/// Values and widths of the three-cell stencil around a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimiterStencil {
    pub phi: f64,
    pub phi_plus: f64,
    pub phi_minus: f64,
    /// Width of the cell
    pub h0: f64,
    pub h_plus: f64,
    pub h_minus: f64,
}

/// Classical limited gradient from the two face slopes.
///
/// # Arguments
/// * `grad_plus` - Slope across the front face
/// * `grad_minus` - Slope across the back face
#[inline]
pub fn limit_classical(kind: LimiterKind, grad_plus: f64, grad_minus: f64) -> f64 {
    0.5 * (kind.psi(divide_or_zero(grad_plus, grad_minus)) * grad_minus
        + kind.psi(divide_or_zero(grad_minus, grad_plus)) * grad_plus)
}

/// Neighbour-bounded gradient of the generalized family.
///
/// Zero at a local extremum. Otherwise the family's combination of the face
/// slopes, clipped so that `φ ± g·h0/2` stays between `φ₋` and `φ₊`.
pub fn limit_bounded(kind: LimiterKind, grad_plus: f64, grad_minus: f64, s: &LimiterStencil) -> f64 {
    let dp = s.phi_plus - s.phi;
    let dm = s.phi - s.phi_minus;
    if dp * dm <= 0.0 || s.h0 <= 0.0 {
        return 0.0;
    }
    let (ap, am) = (grad_plus.abs(), grad_minus.abs());
    let raw = match kind.family() {
        LimiterFamily::FirstOrder => 0.0,
        LimiterFamily::Minmod => ap.min(am),
        LimiterFamily::Superbee => (2.0 * ap).min(am).max(ap.min(2.0 * am)),
        LimiterFamily::VanLeer => divide_or_zero(2.0 * ap * am, ap + am),
    };
    let bound = 2.0 * dp.abs().min(dm.abs()) / s.h0;
    dp.signum() * raw.min(bound)
}

/// Limited cell gradient for either family.
#[inline]
pub fn limited_gradient(
    kind: LimiterKind,
    grad_plus: f64,
    grad_minus: f64,
    stencil: &LimiterStencil,
) -> f64 {
    if kind.is_generalized() {
        limit_bounded(kind, grad_plus, grad_minus, stencil)
    } else {
        limit_classical(kind, grad_plus, grad_minus)
    }
}
