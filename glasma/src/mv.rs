// SPDX-License-Identifier: AGPL-3.0-only

//! McLerran-Venugopalan Wilson lines from stacked random color sheets.
//!
//! Each nucleus is modeled as `ns` independent sheets of Gaussian color
//! charge ρ with variance `(g²μ)² / ns`. For every sheet the covariant-gauge
//! potential solves the screened lattice Poisson equation
//!
//!   (−∇²_latt + m²) A = ρ
//!
//! in frequency space with the kernel `K(k) = 1/(k² + m²)`, where
//! `k² = 4 (sin²(π kx/n) + sin²(π ky/n))`. The zero mode and modes with
//! `k² > uv²` are removed. The Wilson line is the path-ordered product
//! `V = Π_s exp(A_s)` with later sheets multiplied from the left.
//!
//! # Randomness
//!
//! Sheet `s` draws from `ChaCha8Rng::seed_from_u64(seed)` on stream `s`,
//! generator planes in order, sites in index order within a plane. The
//! output is therefore a pure function of the seed, independent of the
//! rayon thread count.
//!
//! # References
//!
//! - McLerran & Venugopalan, PRD 49, 2233 (1994)
//! - Krasnitz & Venugopalan, NPB 557, 237 (1999)
//! - Lappi, EPJ C 55, 285 (2008): sheet discretization

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::config::{ColorMode, MvParams, SimulationParams};
use crate::error::GlasmaError;
use crate::initial::InitEvent;
use crate::lattice::algebra::GaugeGroup;
use crate::lattice::color::ColorMatrix;
use crate::lattice::fft::Fft2d;
use crate::lattice::index::Grid2d;

/// Generators spanning the SU(2) subgroup in the Gell-Mann ordering.
const SU2_SUBGROUP_GENERATORS: usize = 3;

/// Squared lattice momentum `4 (sin²(π kx/n) + sin²(π ky/n))`.
#[must_use]
pub fn lattice_momentum_sq(kx: usize, ky: usize, n: usize) -> f64 {
    // Fold onto `min(k, n − k)` so K(k) and K(−k) are bitwise equal.
    let s = |k: usize| {
        let k = k % n;
        let k = k.min(n - k);
        (std::f64::consts::PI * k as f64 / n as f64).sin().powi(2)
    };
    4.0 * (s(kx) + s(ky))
}

/// Screened, UV-truncated lattice Poisson kernel in frequency space.
#[derive(Clone, Debug)]
pub struct PoissonKernel {
    n: usize,
    values: Vec<f64>,
    support: usize,
}

impl PoissonKernel {
    /// Tabulate `K(kx, ky)` on the full `n × n` frequency plane.
    ///
    /// A non-positive `uv` keeps no mode at all.
    #[must_use]
    pub fn new(n: usize, m: f64, uv: f64) -> Self {
        let uv_sq = if uv > 0.0 { uv * uv } else { -1.0 };
        let m_sq = m * m;
        let values: Vec<f64> = (0..n * n)
            .into_par_iter()
            .map(|idx| {
                let (kx, ky) = (idx / n, idx % n);
                let k2 = lattice_momentum_sq(kx, ky, n);
                if (kx > 0 || ky > 0) && k2 <= uv_sq {
                    1.0 / (k2 + m_sq)
                } else {
                    0.0
                }
            })
            .collect();
        let support = values.iter().filter(|&&v| v != 0.0).count();
        Self { n, values, support }
    }

    /// `K(kx, ky)`; zero at the origin and outside the UV cutoff.
    #[must_use]
    pub fn value(&self, kx: usize, ky: usize) -> f64 {
        self.values[kx * self.n + ky]
    }

    /// Kernel in plane layout.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of modes passing both masks.
    #[must_use]
    pub const fn support(&self) -> usize {
        self.support
    }

    /// True when no mode survives, so every sheet is pure gauge.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.support == 0
    }
}

/// Wilson-line field of one nucleus.
#[derive(Clone, Debug)]
pub struct WilsonLines<const N: usize> {
    /// `V(x)` per site.
    pub lines: Vec<ColorMatrix<N>>,
    /// Non-fatal diagnostics raised while generating.
    pub events: Vec<InitEvent>,
}

/// Generator of MV Wilson lines for a fixed lattice and parameter set.
#[derive(Debug)]
pub struct WilsonLineGenerator<const N: usize> {
    grid: Grid2d,
    params: MvParams,
    charge_std: f64,
    kernel: PoissonKernel,
    fft: Fft2d,
}

impl<const N: usize> WilsonLineGenerator<N>
where
    ColorMatrix<N>: GaugeGroup,
{
    /// Plan the kernel and FFT for `sim.n` with source parameters `mv`.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] when either parameter set fails
    /// validation.
    pub fn new(sim: &SimulationParams, mv: &MvParams) -> Result<Self, GlasmaError> {
        sim.validate()?;
        mv.validate()?;
        let charge_std = sim.g * sim.g * mv.mu / (mv.num_sheets as f64).sqrt();
        Ok(Self {
            grid: Grid2d::new(sim.n),
            params: *mv,
            charge_std,
            kernel: PoissonKernel::new(sim.n, mv.m, mv.uv),
            fft: Fft2d::new(sim.n),
        })
    }

    /// Screening kernel in use.
    #[must_use]
    pub const fn kernel(&self) -> &PoissonKernel {
        &self.kernel
    }

    /// Standard deviation `g²μ/√ns` of a single sheet charge.
    #[must_use]
    pub const fn charge_std(&self) -> f64 {
        self.charge_std
    }

    /// Number of generators that receive charge.
    #[must_use]
    pub fn charged_generators(&self) -> usize {
        match self.params.color_mode {
            ColorMode::Full => <ColorMatrix<N> as GaugeGroup>::N_GENERATORS,
            ColorMode::Su2Subgroup => {
                SU2_SUBGROUP_GENERATORS.min(<ColorMatrix<N> as GaugeGroup>::N_GENERATORS)
            }
        }
    }

    /// Gaussian charges of one sheet, `[generator][site]`.
    #[must_use]
    pub fn sheet_charges(&self, seed: u64, sheet: usize) -> Vec<Vec<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(sheet as u64);
        let volume = self.grid.volume();
        (0..self.charged_generators())
            .map(|_| {
                (0..volume)
                    .map(|_| self.charge_std * rng.sample::<f64, _>(StandardNormal))
                    .collect()
            })
            .collect()
    }

    /// Screened potential of one sheet, `[generator][site]`.
    #[must_use]
    pub fn sheet_potential(&self, seed: u64, sheet: usize) -> Vec<Vec<f64>> {
        let charges = self.sheet_charges(seed, sheet);
        charges
            .par_iter()
            .map(|plane| self.fft.convolve_real(plane, self.kernel.values()))
            .collect()
    }

    /// Path-ordered Wilson line `V = exp(A_ns) ⋯ exp(A_1)` for `seed`.
    ///
    /// A degenerate kernel yields unit Wilson lines together with an
    /// [`InitEvent::DegenerateKernel`].
    pub fn generate(&self, seed: u64) -> WilsonLines<N> {
        let mut lines = vec![ColorMatrix::<N>::IDENTITY; self.grid.volume()];
        if self.kernel.is_degenerate() {
            tracing::info!(
                n = self.grid.n(),
                m = self.params.m,
                uv = self.params.uv,
                "Poisson kernel has no support; Wilson lines are unit matrices"
            );
            return WilsonLines {
                lines,
                events: vec![InitEvent::DegenerateKernel],
            };
        }

        let num_sheets = self.params.num_sheets;
        for sheet in 0..num_sheets {
            let potential = self.sheet_potential(seed, sheet);
            lines.par_iter_mut().enumerate().for_each(|(site, v)| {
                let mut coords = <ColorMatrix<N> as GaugeGroup>::Coords::default();
                for (c, plane) in coords.as_mut().iter_mut().zip(&potential) {
                    *c = plane[site];
                }
                *v = ColorMatrix::from_algebra_coords(coords.as_ref()).exp_algebra() * *v;
            });
            tracing::debug!(sheet = sheet + 1, num_sheets, "Wilson line sheet done");
        }

        WilsonLines {
            lines,
            events: Vec::new(),
        }
    }
}
