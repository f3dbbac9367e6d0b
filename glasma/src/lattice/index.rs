// SPDX-License-Identifier: AGPL-3.0-only

//! Periodic 2D transverse lattice indexing.
//!
//! Sites of the `n × n` transverse plane are stored row-major with y fastest:
//! `idx = x·n + y`. Shifts wrap modulo `n` in both directions, so the lattice
//! is a torus.

use serde::{Deserialize, Serialize};

/// Number of transverse directions (x = 0, y = 1).
pub const TRANSVERSE_DIMS: usize = 2;

/// Periodic `n × n` lattice geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Grid2d {
    n: usize,
}

impl Grid2d {
    /// Lattice with `n` sites per direction. `n` must be positive; callers
    /// validate it through [`SimulationParams`](crate::config::SimulationParams).
    pub const fn new(n: usize) -> Self {
        Self { n }
    }

    /// Sites per direction.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Total number of sites, `n²`.
    #[must_use]
    pub const fn volume(&self) -> usize {
        self.n * self.n
    }

    /// Number of transverse links, two per site.
    #[must_use]
    pub const fn link_count(&self) -> usize {
        self.volume() * TRANSVERSE_DIMS
    }

    /// Linear index of `(x, y)`, both in `[0, n)`.
    #[must_use]
    pub const fn to_index(&self, x: usize, y: usize) -> usize {
        x * self.n + y
    }

    /// Coordinates `(x, y)` of a linear index.
    #[must_use]
    pub const fn point_of(&self, idx: usize) -> (usize, usize) {
        (idx / self.n, idx % self.n)
    }

    /// Site reached from `idx` by moving `offset` steps along `direction`.
    ///
    /// Any signed offset is accepted; the result wraps periodically.
    #[must_use]
    pub fn shift(&self, idx: usize, direction: usize, offset: isize) -> usize {
        let (x, y) = self.point_of(idx);
        let n = self.n as isize;
        let step = |c: usize| -> usize { (c as isize + offset).rem_euclid(n) as usize };
        if direction == 0 {
            self.to_index(step(x), y)
        } else {
            self.to_index(x, step(y))
        }
    }

    /// Index into a per-link array, `links[site * 2 + direction]`.
    #[must_use]
    pub const fn link_index(&self, site: usize, direction: usize) -> usize {
        site * TRANSVERSE_DIMS + direction
    }
}
