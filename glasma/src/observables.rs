// SPDX-License-Identifier: AGPL-3.0-only

//! Longitudinal field strengths and their transverse correlators.
//!
//! `E_z` is the time average of the longitudinal momenta around τ = 0 and
//! `B_z` the clover average of the four plaquettes touching a site. Both are
//! accurate to second order in the lattice spacing.
//!
//! The correlator at distance `r` compares `F(x)` with `F(x + r ê_i)`
//! parallel-transported back to `x` along the lattice axis:
//!
//!   `C(r) = 1/(2 n²) Σ_x Σ_{i=x,y} Re Tr(F(x) (W_i F(x + r ê_i) W_i†)†)`
//!
//! with `W_i = U_i(x) U_i(x + ê_i) ⋯ U_i(x + (r−1) ê_i)`. `C(0)` is the mean
//! of `‖F‖²` over sites.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::lattice::algebra::{act, re_tr_mul_adj};
use crate::lattice::color::ColorMatrix;
use crate::lattice::fields::{plaq, GlasmaFields};
use crate::lattice::index::Grid2d;

/// Longitudinal field component.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum FieldComponent {
    /// Longitudinal chromo-electric field.
    Ez,
    /// Longitudinal chromo-magnetic field.
    Bz,
}

/// `E_z(x) = (peta1(x) + peta0(x)) / 2`.
#[must_use]
pub fn ez<const N: usize>(fields: &GlasmaFields<N>, site: usize) -> ColorMatrix<N> {
    (fields.peta1[site] + fields.peta0[site]).scale(0.5)
}

/// Clover-averaged `B_z(x)` from the τ = 0 links.
#[must_use]
pub fn bz<const N: usize>(grid: &Grid2d, u0: &[ColorMatrix<N>], site: usize) -> ColorMatrix<N> {
    let leaf = |i, j, oi, oj| plaq(grid, u0, site, i, j, oi, oj).ah();
    (leaf(0, 1, 1, -1) - leaf(0, 1, 1, 1) + leaf(1, 0, -1, -1) - leaf(1, 0, 1, -1)).scale(0.25)
}

/// `component` evaluated on every site.
#[must_use]
pub fn field_map<const N: usize>(
    fields: &GlasmaFields<N>,
    component: FieldComponent,
) -> Vec<ColorMatrix<N>> {
    (0..fields.grid.volume())
        .into_par_iter()
        .map(|site| match component {
            FieldComponent::Ez => ez(fields, site),
            FieldComponent::Bz => bz(&fields.grid, &fields.u0, site),
        })
        .collect()
}

/// Mean of `‖F(x)‖²` over sites.
#[must_use]
pub fn mean_square<const N: usize>(fields: &GlasmaFields<N>, component: FieldComponent) -> f64 {
    let map = field_map(fields, component);
    map.par_iter().map(|f| f.norm_sq()).sum::<f64>() / map.len() as f64
}

/// Gauge-covariant correlator `C(r)` for `r ∈ [0, n/2)`.
#[must_use]
pub fn transverse_correlator<const N: usize>(
    fields: &GlasmaFields<N>,
    component: FieldComponent,
) -> Vec<f64> {
    let grid = fields.grid;
    let n = grid.n();
    let half = n / 2;
    let map = field_map(fields, component);
    let u0 = &fields.u0;

    let mut corr = (0..grid.volume())
        .into_par_iter()
        .fold(
            || vec![0.0; half],
            |mut acc, site| {
                let f = map[site];
                let mut wx = ColorMatrix::<N>::IDENTITY;
                let mut wy = ColorMatrix::<N>::IDENTITY;
                for (r, slot) in acc.iter_mut().enumerate() {
                    let xs = grid.shift(site, 0, r as isize);
                    let ys = grid.shift(site, 1, r as isize);
                    *slot += re_tr_mul_adj(&f, &act(wx, map[xs]));
                    *slot += re_tr_mul_adj(&f, &act(wy, map[ys]));
                    wx = wx * u0[grid.link_index(xs, 0)];
                    wy = wy * u0[grid.link_index(ys, 1)];
                }
                acc
            },
        )
        .reduce(
            || vec![0.0; half],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    let norm = 2.0 * (n * n) as f64;
    for c in &mut corr {
        *c /= norm;
    }
    corr
}
