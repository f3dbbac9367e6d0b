// SPDX-License-Identifier: AGPL-3.0-only

//! `B = A (A†)⁻¹`.
//!
//! `A (I + B)† = A + A†` is hermitian for this `B`, so the residual vanishes
//! identically. Unitarity holds when `A` is a real multiple of a unitary
//! matrix, which is always the case for SU(2).

use super::Solve;
use crate::lattice::color::ColorMatrix;

pub(super) fn solve<const N: usize>(a: &ColorMatrix<N>) -> Solve<N> {
    match a.adjoint().inverse() {
        Some(inv) => Solve {
            link: *a * inv,
            iterations: 0,
            converged: false,
            singular: false,
        },
        None => Solve::singular(),
    }
}
