// SPDX-License-Identifier: AGPL-3.0-only

//! 2D complex FFT on the periodic `n × n` transverse plane.
//!
//! Built from two passes of 1D rustfft plans: rows, transpose, rows again,
//! transpose back. Planes are stored with the same `x·n + y` layout as
//! [`Grid2d`](super::index::Grid2d), so a row is a fixed `x`.
//!
//! The inverse transform is normalized by `1/n²`, so
//! `inverse(forward(f)) = f` up to round-off.

use std::sync::Arc;

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

/// Forward and inverse plans for one lattice size.
#[derive(Clone)]
pub struct Fft2d {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for Fft2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft2d").field("n", &self.n).finish()
    }
}

impl Fft2d {
    /// Plan transforms for an `n × n` plane.
    #[must_use]
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            n,
            forward: planner.plan_fft_forward(n),
            inverse: planner.plan_fft_inverse(n),
        }
    }

    /// Sites per direction.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// In-place forward transform of one plane (unnormalized).
    pub fn forward(&self, plane: &mut [Complex64]) {
        self.pass(plane, &self.forward);
    }

    /// In-place inverse transform of one plane, normalized by `1/n²`.
    pub fn inverse(&self, plane: &mut [Complex64]) {
        self.pass(plane, &self.inverse);
        let norm = 1.0 / (self.n * self.n) as f64;
        plane.par_iter_mut().for_each(|v| *v *= norm);
    }

    /// Circular convolution of a real plane with a kernel given in
    /// frequency space: `F⁻¹[K · F[f]]`, returning the real part.
    ///
    /// `kernel` uses the plane layout with `kx` along rows.
    #[must_use]
    pub fn convolve_real(&self, plane: &[f64], kernel: &[f64]) -> Vec<f64> {
        let mut buf: Vec<Complex64> = plane.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward(&mut buf);
        buf.par_iter_mut()
            .zip(kernel.par_iter())
            .for_each(|(v, &k)| *v *= k);
        self.inverse(&mut buf);
        buf.into_iter().map(|v| v.re).collect()
    }

    fn pass(&self, plane: &mut [Complex64], plan: &Arc<dyn Fft<f64>>) {
        let n = self.n;
        debug_assert_eq!(plane.len(), n * n, "plane must hold n² entries");
        plane.par_chunks_mut(n).for_each(|row| plan.process(row));
        transpose_square(plane, n);
        plane.par_chunks_mut(n).for_each(|row| plan.process(row));
        transpose_square(plane, n);
    }
}

fn transpose_square(plane: &mut [Complex64], n: usize) {
    for i in 0..n {
        for j in i + 1..n {
            plane.swap(i * n + j, j * n + i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_restores_plane() {
        let n = 8;
        let fft = Fft2d::new(n);
        let original: Vec<Complex64> = (0..n * n)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let mut buf = original.clone();
        fft.forward(&mut buf);
        fft.inverse(&mut buf);
        for (a, b) in original.iter().zip(&buf) {
            assert!((a - b).norm() < 1e-12, "round trip drift {}", (a - b).norm());
        }
    }

    #[test]
    fn delta_has_flat_spectrum() {
        let n = 6;
        let fft = Fft2d::new(n);
        let mut buf = vec![Complex64::new(0.0, 0.0); n * n];
        buf[0] = Complex64::new(1.0, 0.0);
        fft.forward(&mut buf);
        for v in &buf {
            assert!((v.re - 1.0).abs() < 1e-14 && v.im.abs() < 1e-14);
        }
    }

    #[test]
    fn plane_wave_lands_on_one_mode() {
        let n = 8;
        let fft = Fft2d::new(n);
        let (kx, ky) = (3usize, 5usize);
        let mut buf: Vec<Complex64> = (0..n * n)
            .map(|i| {
                let (x, y) = (i / n, i % n);
                let phase = 2.0 * std::f64::consts::PI * (kx * x + ky * y) as f64 / n as f64;
                Complex64::from_polar(1.0, phase)
            })
            .collect();
        fft.forward(&mut buf);
        for (i, v) in buf.iter().enumerate() {
            let expected = if i == kx * n + ky { (n * n) as f64 } else { 0.0 };
            assert!((v.norm() - expected).abs() < 1e-10, "mode {i}: {}", v.norm());
        }
    }

    #[test]
    fn constant_kernel_scales() {
        let n = 4;
        let fft = Fft2d::new(n);
        let plane: Vec<f64> = (0..n * n).map(|i| i as f64).collect();
        let out = fft.convolve_real(&plane, &vec![2.0; n * n]);
        for (a, b) in plane.iter().zip(&out) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
    }
}
