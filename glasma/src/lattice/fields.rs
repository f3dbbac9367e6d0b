// SPDX-License-Identifier: AGPL-3.0-only

//! Boost-invariant Glasma field state on the transverse lattice.
//!
//! Transverse links are stored as `links[site * 2 + d]`; longitudinal
//! fields carry one algebra element per site. Two time slices are kept, the
//! τ = 0 links `u0` and the half-step advanced links `u1`, with the matching
//! transverse momenta `pt`, longitudinal momentum `peta` and longitudinal
//! potential `aeta`.
//!
//! Plaquettes follow the oriented convention
//!
//!   `P_ij`(x; ±, ±) = `U_{±i}`(x) `U_{±j}`(x ± î) `U_{∓i}`(x ± î ± ĵ) `U_{∓j}`(x ± ĵ)
//!
//! where a negative-direction link is the dagger of the link arriving from
//! the shifted site.

use super::color::ColorMatrix;
use super::index::{Grid2d, TRANSVERSE_DIMS};
use crate::error::{check_len, GlasmaError};

/// Field arrays written by the initial-condition builder.
#[derive(Clone, Debug)]
pub struct GlasmaFields<const N: usize> {
    /// Transverse lattice geometry.
    pub grid: Grid2d,
    /// Time step in lattice units.
    pub dt: f64,
    /// Transverse links at τ = 0: `u0[site * 2 + d]`.
    pub u0: Vec<ColorMatrix<N>>,
    /// Transverse links advanced by one step.
    pub u1: Vec<ColorMatrix<N>>,
    /// Transverse momenta at τ = −dt/2.
    pub pt0: Vec<ColorMatrix<N>>,
    /// Transverse momenta at τ = +dt/2.
    pub pt1: Vec<ColorMatrix<N>>,
    /// Longitudinal momentum (electric field) at τ = −dt/2.
    pub peta0: Vec<ColorMatrix<N>>,
    /// Longitudinal momentum at τ = +dt/2.
    pub peta1: Vec<ColorMatrix<N>>,
    /// Longitudinal gauge potential at τ = 0.
    pub aeta0: Vec<ColorMatrix<N>>,
    /// Longitudinal gauge potential advanced by one step.
    pub aeta1: Vec<ColorMatrix<N>>,
}

impl<const N: usize> GlasmaFields<N> {
    /// Vacuum state: unit links, vanishing momenta and potentials.
    #[must_use]
    pub fn vacuum(grid: Grid2d, dt: f64) -> Self {
        let links = vec![ColorMatrix::IDENTITY; grid.link_count()];
        let link_zero = vec![ColorMatrix::ZERO; grid.link_count()];
        let site_zero = vec![ColorMatrix::ZERO; grid.volume()];
        Self {
            grid,
            dt,
            u0: links.clone(),
            u1: links,
            pt0: link_zero.clone(),
            pt1: link_zero,
            peta0: site_zero.clone(),
            peta1: site_zero.clone(),
            aeta0: site_zero.clone(),
            aeta1: site_zero,
        }
    }

    /// Check that every array matches the lattice.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::FieldSize`] naming the first mismatched array.
    pub fn validate(&self) -> Result<(), GlasmaError> {
        let links = self.grid.link_count();
        let sites = self.grid.volume();
        check_len("u0", links, self.u0.len())?;
        check_len("u1", links, self.u1.len())?;
        check_len("pt0", links, self.pt0.len())?;
        check_len("pt1", links, self.pt1.len())?;
        check_len("peta0", sites, self.peta0.len())?;
        check_len("peta1", sites, self.peta1.len())?;
        check_len("aeta0", sites, self.aeta0.len())?;
        check_len("aeta1", sites, self.aeta1.len())
    }
}

/// Link leaving `site` along `±i`: `U_i(x)` for a positive offset, else
/// `U_i(x − î)†`.
pub fn get_link<const N: usize>(
    grid: &Grid2d,
    u: &[ColorMatrix<N>],
    site: usize,
    i: usize,
    oi: isize,
) -> ColorMatrix<N> {
    if oi > 0 {
        u[grid.link_index(site, i)]
    } else {
        let xs = grid.shift(site, i, oi);
        u[grid.link_index(xs, i)].adjoint()
    }
}

/// Oriented plaquette starting at `site` in the `(i, j)` plane with
/// orientations `oi, oj ∈ {+1, −1}`.
pub fn plaq<const N: usize>(
    grid: &Grid2d,
    u: &[ColorMatrix<N>],
    site: usize,
    i: usize,
    j: usize,
    oi: isize,
    oj: isize,
) -> ColorMatrix<N> {
    let x1 = grid.shift(site, i, oi);
    let x2 = grid.shift(x1, j, oj);
    let x3 = grid.shift(x2, i, -oi);

    let u1 = get_link(grid, u, site, i, oi);
    let u2 = get_link(grid, u, x1, j, oj);
    let u3 = get_link(grid, u, x2, i, -oi);
    let u4 = get_link(grid, u, x3, j, -oj);

    u1 * u2 * u3 * u4
}

/// `ah(Σ_{j≠d} P_dj(+,+) + P_dj(+,−))`, the transverse force on `U_d(x)`.
pub fn plaquettes<const N: usize>(
    grid: &Grid2d,
    u: &[ColorMatrix<N>],
    site: usize,
    d: usize,
) -> ColorMatrix<N> {
    let mut res = ColorMatrix::ZERO;
    for j in (0..TRANSVERSE_DIMS).filter(|&j| j != d) {
        res = res + plaq(grid, u, site, d, j, 1, 1) + plaq(grid, u, site, d, j, 1, -1);
    }
    res.ah()
}
