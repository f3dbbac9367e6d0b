// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized numerical guards and validation tolerances.
//!
//! Every threshold used by the solvers, the tests and the validation binary
//! is defined here with its origin. No ad-hoc magic numbers.
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Machine precision | IEEE 754 f64 | 1e-12 for exact arithmetic |
//! | Numerical method | Solver convergence | 1e-8 unitarizer residual |
//! | Physical model | Lattice artifacts | E_L / B_L within a factor 2 |

// ═══════════════════════════════════════════════════════════════════
// Numerical guards
// ═══════════════════════════════════════════════════════════════════

/// Smallest squared magnitude treated as nonzero in norms and pivots.
pub const DIVISION_GUARD: f64 = 1e-30;

/// Relative pivot size below which a matrix is reported singular.
///
/// Gauss-Jordan elimination on an N ≤ 3 matrix loses about `N·ε` relative
/// accuracy per step; a pivot at 1e-13 of the largest entry means the
/// inverse carries no significant digits.
pub const SINGULAR_PIVOT: f64 = 1e-13;

// ═══════════════════════════════════════════════════════════════════
// Group algebra
// ═══════════════════════════════════════════════════════════════════

/// Exact arithmetic: results that should agree to round-off.
pub const EXACT_F64: f64 = 1e-12;

/// Unitarity defect ‖U†U − I‖² of a freshly exponentiated group element.
///
/// The Taylor remainder after scaling is below 1e-16; squaring accumulates
/// a few ulps per multiplication.
pub const GROUP_UNITARITY_ABS: f64 = 1e-20;

/// |det U − 1| of a freshly exponentiated group element.
pub const GROUP_DET_ABS: f64 = 1e-10;

// ═══════════════════════════════════════════════════════════════════
// Link unitarizer
// ═══════════════════════════════════════════════════════════════════

/// Residual bound ‖ah(A (I + B)†)‖² for convergence of every strategy.
pub const UNITARIZE_RESIDUAL_BOUND: f64 = 1e-8;

/// Unitarity defect bound ‖B†B − I‖² for the damped fixed point and for
/// accepting the closed form on SU(3).
pub const UNITARIZE_UNITARITY_BOUND: f64 = 1e-8;

/// Re-feeding a converged link may move it by at most this much
/// (squared Frobenius distance).
pub const FIXED_POINT_DRIFT: f64 = 1e-20;

// ═══════════════════════════════════════════════════════════════════
// Physics regression bounds
// ═══════════════════════════════════════════════════════════════════

/// Lower bound on E_L / B_L for a smooth MV configuration.
///
/// In the continuum the boost-invariant initial state has equal
/// longitudinal electric and magnetic energy. On the lattice the two
/// discretizations differ at O(a²); with a strong IR mass and the UV cutoff
/// well inside the Brillouin zone the ratio stays within a factor of two.
pub const ENERGY_BALANCE_RATIO_MIN: f64 = 0.5;

/// Upper bound on E_L / B_L, see [`ENERGY_BALANCE_RATIO_MIN`].
pub const ENERGY_BALANCE_RATIO_MAX: f64 = 2.0;

/// Fractional sheet charge variance tolerance for the Gaussian draws.
///
/// With `n² · (N²−1)` draws per sheet, the sample variance of a 16×16
/// SU(2) lattice deviates by about `√(2/768) ≈ 5%` at one sigma.
pub const CHARGE_VARIANCE_REL: f64 = 0.2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_consistent() {
        assert!(DIVISION_GUARD < SINGULAR_PIVOT);
        assert!(FIXED_POINT_DRIFT < UNITARIZE_RESIDUAL_BOUND);
        assert!(ENERGY_BALANCE_RATIO_MIN < 1.0 && 1.0 < ENERGY_BALANCE_RATIO_MAX);
    }
}
