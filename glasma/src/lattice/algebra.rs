// SPDX-License-Identifier: AGPL-3.0-only

//! su(N) Lie algebra: generator basis, coordinates and the exponential map.
//!
//! Generators are `T_a = i λ_a / 2` with λ the generalized Gell-Mann
//! matrices (Pauli for N = 2), normalized so that `Tr(T_a T_b) = −δ_ab / 2`.
//! An algebra element is written `X = Σ_a c_a T_a` and the coordinates are
//! recovered as `c_a = −2 Re Tr(T_a X)`.
//!
//! Ordering: for each `k = 1..N`, the symmetric and antisymmetric
//! off-diagonal pairs `(j, k)` for `j < k`, then the k-th diagonal
//! generator. For N = 3 this is the standard λ₁ … λ₈ order, and the first
//! three generators span the SU(2) subgroup acting on colors 0 and 1.
//!
//! The exponential is closed form for SU(2) and a scaled Taylor series
//! followed by repeated squaring for SU(3).

use std::fmt;

use num_complex::Complex64;

use super::color::{ColorMatrix, Su2, Su3};

/// Largest Frobenius norm at which the Taylor series is evaluated before
/// squaring back up.
const EXP_SCALED_NORM: f64 = 0.5;

/// Taylor order of the scaled exponential. At ‖X‖ ≤ 0.5 the remainder
/// 0.5¹⁵/15! is below 1e-16.
const EXP_TAYLOR_ORDER: usize = 14;

/// Below this θ² the SU(2) `sin θ / θ` uses its Taylor expansion.
const SINC_SERIES_THRESHOLD: f64 = 1e-8;

/// A compact SU(N) group with an exponential map on its algebra.
///
/// Implemented for [`Su2`] and [`Su3`]. Generic code is written over
/// `ColorMatrix<N>` with the bound `ColorMatrix<N>: GaugeGroup`.
pub trait GaugeGroup: Copy + Send + Sync + fmt::Debug + 'static {
    /// Number of colors N.
    const N_COLORS: usize;
    /// Number of algebra generators, N² − 1.
    const N_GENERATORS: usize;
    /// Fixed-size real coordinate vector of an algebra element.
    type Coords: Copy + Default + AsRef<[f64]> + AsMut<[f64]> + Send + Sync + fmt::Debug;

    /// `exp(X)` for a traceless anti-hermitian `X`.
    fn exp_algebra(self) -> Self;

    /// Coordinates `c_a` of `self` in the generator basis.
    fn algebra_coords(&self) -> Self::Coords;
}

impl GaugeGroup for Su2 {
    const N_COLORS: usize = 2;
    const N_GENERATORS: usize = 3;
    type Coords = [f64; 3];

    /// `exp(X) = cos θ I + (sin θ / θ) X` with `θ² = det X`.
    ///
    /// For traceless anti-hermitian 2×2 `X`, `X² = −det(X) I`, so the series
    /// resums exactly.
    fn exp_algebra(self) -> Self {
        let m = &self.m;
        let theta_sq = (m[0][0] * m[1][1] - m[0][1] * m[1][0]).re.max(0.0);
        let (cos, sinc) = if theta_sq < SINC_SERIES_THRESHOLD {
            (
                1.0 - theta_sq / 2.0 + theta_sq * theta_sq / 24.0,
                1.0 - theta_sq / 6.0 + theta_sq * theta_sq / 120.0,
            )
        } else {
            let theta = theta_sq.sqrt();
            (theta.cos(), theta.sin() / theta)
        };
        let mut r = self.scale(sinc);
        r.m[0][0].re += cos;
        r.m[1][1].re += cos;
        r
    }

    fn algebra_coords(&self) -> [f64; 3] {
        let mut c = [0.0; 3];
        self.write_algebra_coords(&mut c);
        c
    }
}

impl GaugeGroup for Su3 {
    const N_COLORS: usize = 3;
    const N_GENERATORS: usize = 8;
    type Coords = [f64; 8];

    fn exp_algebra(self) -> Self {
        self.exp_scaled_taylor()
    }

    fn algebra_coords(&self) -> [f64; 8] {
        let mut c = [0.0; 8];
        self.write_algebra_coords(&mut c);
        c
    }
}

/// Position of a generator in the generalized Gell-Mann basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Basis {
    /// λ with 1 at (j, k) and (k, j).
    Sym(usize, usize),
    /// λ with −i at (j, k) and +i at (k, j).
    Antisym(usize, usize),
    /// √(2/(k(k+1))) · diag(1, …, 1, −k, 0, …) with k ones.
    Diag(usize),
}

impl Basis {
    /// Decode generator index `a`. Block `k` starts at `k² − 1` and holds
    /// `2k + 1` generators.
    const fn of(a: usize) -> Self {
        let mut k = 1;
        while (k + 1) * (k + 1) - 1 <= a {
            k += 1;
        }
        let r = a - (k * k - 1);
        if r == 2 * k {
            Self::Diag(k)
        } else if r % 2 == 0 {
            Self::Sym(r / 2, k)
        } else {
            Self::Antisym(r / 2, k)
        }
    }
}

fn diag_norm(k: usize) -> f64 {
    (2.0 / (k * (k + 1)) as f64).sqrt()
}

impl<const N: usize> ColorMatrix<N> {
    /// Generator `T_a = i λ_a / 2`, `a ∈ [0, N² − 1)`.
    pub fn generator(a: usize) -> Self {
        let mut r = Self::ZERO;
        r.add_generator(a, 1.0);
        r
    }

    /// `X = Σ_a c_a T_a`. Extra coordinates beyond N² − 1 are ignored; missing
    /// ones count as zero.
    pub fn from_algebra_coords(coords: &[f64]) -> Self {
        let mut r = Self::ZERO;
        for (a, &c) in coords.iter().enumerate().take(N * N - 1) {
            if c != 0.0 {
                r.add_generator(a, c);
            }
        }
        r
    }

    /// Write `c_a = −2 Re Tr(T_a X)` into `out` (up to N² − 1 entries).
    ///
    /// For a traceless anti-hermitian `X` this inverts
    /// [`from_algebra_coords`](Self::from_algebra_coords).
    pub fn write_algebra_coords(&self, out: &mut [f64]) {
        for (a, c) in out.iter_mut().enumerate().take(N * N - 1) {
            *c = match Basis::of(a) {
                Basis::Sym(j, k) => (self.m[j][k] + self.m[k][j]).im,
                Basis::Antisym(j, k) => (self.m[j][k] - self.m[k][j]).re,
                Basis::Diag(k) => {
                    let s: f64 = (0..k).map(|l| self.m[l][l].im).sum();
                    diag_norm(k) * (s - k as f64 * self.m[k][k].im)
                }
            };
        }
    }

    fn add_generator(&mut self, a: usize, c: f64) {
        let half = 0.5 * c;
        match Basis::of(a) {
            Basis::Sym(j, k) => {
                self.m[j][k].im += half;
                self.m[k][j].im += half;
            }
            Basis::Antisym(j, k) => {
                self.m[j][k].re += half;
                self.m[k][j].re -= half;
            }
            Basis::Diag(k) => {
                let s = half * diag_norm(k);
                for l in 0..k {
                    self.m[l][l].im += s;
                }
                self.m[k][k].im -= s * k as f64;
            }
        }
    }

    /// `exp(X)` by scaling and squaring: `exp(X) = exp(X / 2ˢ)^(2ˢ)` with the
    /// scaled exponential from a truncated Taylor series.
    pub fn exp_scaled_taylor(self) -> Self {
        let norm = self.norm_sq().sqrt();
        let mut squarings = 0;
        let mut scaled_norm = norm;
        while scaled_norm > EXP_SCALED_NORM {
            scaled_norm *= 0.5;
            squarings += 1;
        }
        let x = self.scale(0.5_f64.powi(squarings));

        // Horner: I + X(I + X/2(I + X/3(…)))
        let mut r = Self::IDENTITY;
        for k in (1..=EXP_TAYLOR_ORDER).rev() {
            r = Self::IDENTITY + (x * r).scale(1.0 / k as f64);
        }
        for _ in 0..squarings {
            r = r * r;
        }
        r
    }
}

/// Embed an SU(2) algebra element into the upper-left block of su(3).
///
/// The first three su(3) generators are the embedded Pauli generators, so
/// this agrees with `Su3::from_algebra_coords(&x.algebra_coords())`.
pub fn embed_su2(x: Su2) -> Su3 {
    let mut r = Su3::ZERO;
    for i in 0..2 {
        for j in 0..2 {
            r.m[i][j] = x.m[i][j];
        }
    }
    r
}

/// `Re Tr(A B†)`, the real inner product on matrices.
#[must_use]
pub fn re_tr_mul_adj<const N: usize>(a: &ColorMatrix<N>, b: &ColorMatrix<N>) -> f64 {
    let mut s = 0.0;
    for i in 0..N {
        for j in 0..N {
            s += (a.m[i][j] * b.m[i][j].conj()).re;
        }
    }
    s
}

/// `U F U†`, the adjoint action of a link on an algebra element.
pub fn act<const N: usize>(u: ColorMatrix<N>, f: ColorMatrix<N>) -> ColorMatrix<N> {
    u * f * u.adjoint()
}

/// Unit imaginary scaling `i X`, which maps anti-hermitian directions to
/// hermitian ones.
pub fn times_i<const N: usize>(x: ColorMatrix<N>) -> ColorMatrix<N> {
    x.scale_complex(Complex64::new(0.0, 1.0))
}
