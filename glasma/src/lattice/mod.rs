// SPDX-License-Identifier: AGPL-3.0-only

//! Transverse lattice: geometry, SU(N) matrices, algebra and fields.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `index` | Periodic `n × n` site and link indexing |
//! | `color` | Fixed-size complex N×N matrices (`Su2`, `Su3`) |
//! | `algebra` | su(N) generators, coordinates and the exponential map |
//! | `fft` | 2D complex FFT for the Poisson solve |
//! | `fields` | Glasma field state and oriented plaquettes |
//!
//! # References
//!
//! - Gattringer & Lang, "Quantum Chromodynamics on the Lattice" (2010)
//! - Georgi, "Lie Algebras in Particle Physics" (1999): generalized Gell-Mann basis

/// su(N) generators, coordinates and the exponential map.
pub mod algebra;
/// Fixed-size complex color matrices.
pub mod color;
/// 2D FFT built from rustfft plans.
pub mod fft;
/// Glasma field arrays and plaquettes.
pub mod fields;
/// Periodic transverse lattice indexing.
pub mod index;
