// SPDX-License-Identifier: AGPL-3.0-only

//! N×N complex color matrices for SU(N) lattice gauge fields.
//!
//! A transverse gauge link `U_i(x)` is an SU(N) matrix, the parallel
//! transporter from `x` to `x + î`. Mid-solve estimates and sums of links are
//! general complex matrices, so the type itself carries no unitarity
//! guarantee; [`ColorMatrix::unitarity_defect`] measures the distance from
//! the group.
//!
//! Storage: row-major, `N²` [`Complex64`] values.
//!
//! # References
//!
//! - Gattringer & Lang, "QCD on the Lattice" (2010), Ch. 2
//! - Golub & Van Loan, "Matrix Computations" (2013), §3.4 (pivoted LU)

use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use crate::tolerances::{DIVISION_GUARD, SINGULAR_PIVOT};

/// SU(2) link variable.
pub type Su2 = ColorMatrix<2>;
/// SU(3) link variable.
pub type Su3 = ColorMatrix<3>;

pub(crate) const C_ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const C_ONE: Complex64 = Complex64::new(1.0, 0.0);

/// N×N complex matrix.
///
/// Row-major storage: `m[row][col]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct ColorMatrix<const N: usize> {
    /// Matrix elements m[row][col].
    pub m: [[Complex64; N]; N],
}

impl<const N: usize> Mul for ColorMatrix<N> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..N {
            for j in 0..N {
                let mut s = C_ZERO;
                for k in 0..N {
                    s += self.m[i][k] * rhs.m[k][j];
                }
                r.m[i][j] = s;
            }
        }
        r
    }
}

impl<const N: usize> Add for ColorMatrix<N> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut r = self;
        for i in 0..N {
            for j in 0..N {
                r.m[i][j] += rhs.m[i][j];
            }
        }
        r
    }
}

impl<const N: usize> Sub for ColorMatrix<N> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let mut r = self;
        for i in 0..N {
            for j in 0..N {
                r.m[i][j] -= rhs.m[i][j];
            }
        }
        r
    }
}

impl<const N: usize> Neg for ColorMatrix<N> {
    type Output = Self;
    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl<const N: usize> ColorMatrix<N> {
    /// Zero matrix (all elements 0).
    pub const ZERO: Self = Self {
        m: [[C_ZERO; N]; N],
    };

    /// N×N identity matrix.
    pub const IDENTITY: Self = {
        let mut m = [[C_ZERO; N]; N];
        let mut i = 0;
        while i < N {
            m[i][i] = C_ONE;
            i += 1;
        }
        Self { m }
    };

    /// Conjugate transpose (adjoint / dagger).
    pub fn adjoint(self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..N {
            for j in 0..N {
                r.m[i][j] = self.m[j][i].conj();
            }
        }
        r
    }

    /// Trace: Tr(U) = sum\_i `U_ii`
    #[must_use]
    pub fn trace(self) -> Complex64 {
        (0..N).fold(C_ZERO, |acc, i| acc + self.m[i][i])
    }

    /// Real part of trace.
    #[must_use]
    pub fn re_trace(self) -> f64 {
        (0..N).map(|i| self.m[i][i].re).sum()
    }

    /// Scale by a real number.
    pub fn scale(self, s: f64) -> Self {
        let mut r = self;
        for row in &mut r.m {
            for cell in row.iter_mut() {
                *cell = cell.scale(s);
            }
        }
        r
    }

    /// Scale by a complex number.
    pub fn scale_complex(self, s: Complex64) -> Self {
        let mut r = self;
        for row in &mut r.m {
            for cell in row.iter_mut() {
                *cell *= s;
            }
        }
        r
    }

    /// Frobenius norm squared: sum |`m_ij`|²
    #[must_use]
    pub fn norm_sq(self) -> f64 {
        self.m
            .iter()
            .flat_map(|row| row.iter())
            .map(|c| c.norm_sqr())
            .sum()
    }

    /// Determinant via LU decomposition with partial pivoting.
    #[must_use]
    pub fn det(self) -> Complex64 {
        let mut a = self.m;
        let mut det = C_ONE;
        for col in 0..N {
            let pivot = pivot_row(&a, col);
            if a[pivot][col].norm_sqr() < DIVISION_GUARD {
                return C_ZERO;
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            let p = a[col][col];
            det *= p;
            for row in col + 1..N {
                let f = a[row][col] / p;
                for k in col..N {
                    let v = a[col][k];
                    a[row][k] -= f * v;
                }
            }
        }
        det
    }

    /// Matrix inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `None` when a pivot falls below [`SINGULAR_PIVOT`] relative
    /// to the largest entry.
    #[must_use]
    pub fn inverse(self) -> Option<Self> {
        let scale = self
            .m
            .iter()
            .flat_map(|row| row.iter())
            .map(|c| c.norm())
            .fold(0.0_f64, f64::max);
        if scale < DIVISION_GUARD {
            return None;
        }
        let mut a = self.m;
        let mut inv = Self::IDENTITY.m;
        for col in 0..N {
            let pivot = pivot_row(&a, col);
            if a[pivot][col].norm() < SINGULAR_PIVOT * scale {
                return None;
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);
            let p = a[col][col].inv();
            for k in 0..N {
                a[col][k] *= p;
                inv[col][k] *= p;
            }
            for row in 0..N {
                if row == col {
                    continue;
                }
                let f = a[row][col];
                if f == C_ZERO {
                    continue;
                }
                for k in 0..N {
                    let (ak, ik) = (a[col][k], inv[col][k]);
                    a[row][k] -= f * ak;
                    inv[row][k] -= f * ik;
                }
            }
        }
        Some(Self { m: inv })
    }

    /// Traceless anti-hermitian projection:
    /// `ah(M) = (M − M†)/2 − Tr((M − M†)/2)/N · I`.
    pub fn ah(self) -> Self {
        let mut r = (self - self.adjoint()).scale(0.5);
        let shift = r.trace() / N as f64;
        for i in 0..N {
            r.m[i][i] -= shift;
        }
        r
    }

    /// Distance from the unitary group: ‖M†M − I‖² (squared Frobenius norm).
    #[must_use]
    pub fn unitarity_defect(self) -> f64 {
        (self.adjoint() * self - Self::IDENTITY).norm_sq()
    }

    /// Project back onto SU(N) via modified Gram-Schmidt on the rows.
    ///
    /// The last row is rephased so that det = 1. Coordinate descent uses it
    /// as the retraction after each additive step.
    pub fn reunitarize(self) -> Self {
        let mut u = self;
        for r in 0..N {
            for p in 0..r {
                let dot = row_dot(&u, p, r);
                for j in 0..N {
                    let v = u.m[p][j];
                    u.m[r][j] -= v * dot;
                }
            }
            let norm = row_dot(&u, r, r).re.sqrt();
            if norm > DIVISION_GUARD {
                let inv = 1.0 / norm;
                for j in 0..N {
                    u.m[r][j] = u.m[r][j].scale(inv);
                }
            }
        }
        let phase = u.det();
        if phase.norm_sqr() > DIVISION_GUARD {
            let fix = (phase / phase.norm()).conj();
            for j in 0..N {
                u.m[N - 1][j] *= fix;
            }
        }
        u
    }
}

fn pivot_row<const N: usize>(a: &[[Complex64; N]; N], col: usize) -> usize {
    let mut best = col;
    for row in col + 1..N {
        if a[row][col].norm_sqr() > a[best][col].norm_sqr() {
            best = row;
        }
    }
    best
}

/// ⟨row r1, row r2⟩ = Σ\_j conj(u[r1][j]) u[r2][j]
fn row_dot<const N: usize>(u: &ColorMatrix<N>, r1: usize, r2: usize) -> Complex64 {
    (0..N).fold(C_ZERO, |acc, j| acc + u.m[r1][j].conj() * u.m[r2][j])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample3() -> Su3 {
        let c = Complex64::new;
        Su3 {
            m: [
                [c(1.0, 0.5), c(0.2, -0.1), c(0.0, 0.3)],
                [c(-0.4, 0.0), c(0.9, 0.2), c(0.1, 0.1)],
                [c(0.3, -0.2), c(0.0, 0.0), c(1.2, -0.7)],
            ],
        }
    }

    #[test]
    fn identity_properties() {
        let i = Su3::IDENTITY;
        assert!((i.det().re - 1.0).abs() < 1e-14);
        assert!(i.det().im.abs() < 1e-14);
        assert!((i.re_trace() - 3.0).abs() < 1e-14);
        assert!((Su2::IDENTITY.re_trace() - 2.0).abs() < 1e-14);
        assert!(Su2::IDENTITY.unitarity_defect() < 1e-30);
    }

    #[test]
    fn det_matches_cofactor_expansion() {
        let a = sample3();
        let m = &a.m;
        let cof = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        assert!((a.det() - cof).norm() < 1e-12, "LU det {} vs {}", a.det(), cof);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = sample3();
        let inv = a.inverse().expect("sample matrix is regular");
        let defect = (a * inv - Su3::IDENTITY).norm_sq();
        assert!(defect < 1e-24, "A A⁻¹ − I = {defect:.3e}");
    }

    #[test]
    fn singular_inverse_is_none() {
        let mut a = sample3();
        a.m[2] = a.m[0];
        assert!(a.inverse().is_none());
        assert!(Su2::ZERO.inverse().is_none());
    }

    #[test]
    fn ah_is_traceless_antihermitian() {
        let x = sample3().ah();
        assert!(x.trace().norm() < 1e-14);
        assert!((x + x.adjoint()).norm_sq() < 1e-28);
    }

    #[test]
    fn ah_of_unitary_identity_vanishes() {
        assert!(Su3::IDENTITY.ah().norm_sq() < 1e-30);
    }

    #[test]
    fn reunitarize_fixes_drift() {
        let fixed = sample3().reunitarize();
        assert!(
            fixed.unitarity_defect() < 1e-20,
            "reunitarized defect {:.3e}",
            fixed.unitarity_defect()
        );
        let d = fixed.det();
        assert!((d.re - 1.0).abs() < 1e-12 && d.im.abs() < 1e-12, "det = {d}");
    }

    #[test]
    fn norm_sq_sums_moduli() {
        let a = Su2::IDENTITY.scale_complex(Complex64::new(0.0, 2.0));
        assert!((a.norm_sq() - 8.0).abs() < 1e-14);
        assert!((-a + a).norm_sq() < 1e-30);
    }
}
