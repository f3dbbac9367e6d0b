// SPDX-License-Identifier: AGPL-3.0-only

//! Additive descent on the matrix entries.
//!
//! `B` is perturbed along the `2(N² − 1)` directions `T_a` and `i T_a`.
//! The gradient comes from forward differences with a fixed probe step;
//! the step size is decoupled from the probe because the forward-difference
//! bias scales with the probe, not with the rate.
//!
//! The additive step leaves the group, so every candidate is projected back
//! with [`ColorMatrix::reunitarize`] before its loss is compared. Convergence
//! needs both the loss bound and the unitarity bound.

use super::{loss, DescentParams, Solve};
use crate::lattice::algebra::times_i;
use crate::lattice::color::ColorMatrix;

/// Result of one descent step: the winning candidate and whether it moved.
pub(super) struct Step<T> {
    pub(super) point: T,
    pub(super) loss: f64,
    pub(super) full_step_won: bool,
    pub(super) improved: bool,
}

/// Pick the smallest-loss candidate among no-move, quarter, half and full
/// steps. Ties keep the more conservative choice.
pub(super) fn pick<T: Copy>(
    current: (T, f64),
    quarter: (T, f64),
    half: (T, f64),
    full: (T, f64),
) -> Step<T> {
    let mut step = Step {
        point: current.0,
        loss: current.1,
        full_step_won: false,
        improved: false,
    };
    for (i, (point, l)) in [quarter, half, full].into_iter().enumerate() {
        if l < step.loss {
            step = Step {
                point,
                loss: l,
                full_step_won: i == 2,
                improved: true,
            };
        }
    }
    step
}

/// Adapt the learning rate after a step at iteration `i`.
pub(super) fn adapt_rate<T>(rate: f64, step: &Step<T>, i: usize, grow_every: usize) -> f64 {
    if !step.improved {
        rate * 0.5
    } else if step.full_step_won && i % grow_every == 0 {
        rate * 2.0
    } else {
        rate
    }
}

pub(super) fn solve<const N: usize>(
    a: &ColorMatrix<N>,
    start: Option<ColorMatrix<N>>,
    params: &DescentParams,
    unitarity_bound: f64,
) -> Solve<N> {
    let directions: Vec<ColorMatrix<N>> = (0..N * N - 1)
        .flat_map(|g| {
            let t = ColorMatrix::<N>::generator(g);
            [t, times_i(t)]
        })
        .collect();

    let mut b = start.map_or(ColorMatrix::IDENTITY, ColorMatrix::reunitarize);
    let mut current = loss(a, &b);
    let mut rate = params.initial_rate;
    let h = params.probe_step;
    let done = |b: &ColorMatrix<N>, l: f64| {
        l < params.loss_bound && b.unitarity_defect() < unitarity_bound
    };

    for i in 0..params.max_iterations {
        if done(&b, current) {
            return Solve {
                link: b,
                iterations: i,
                converged: true,
                singular: false,
            };
        }

        let mut descent = ColorMatrix::ZERO;
        for d in &directions {
            let slope = (loss(a, &(b + d.scale(h))) - current) / h;
            descent = descent - d.scale(slope);
        }

        let candidate = |f: f64| {
            let p = (b + descent.scale(rate * f)).reunitarize();
            (p, loss(a, &p))
        };
        let step = pick((b, current), candidate(0.25), candidate(0.5), candidate(1.0));
        rate = adapt_rate(rate, &step, i, params.grow_every);
        b = step.point;
        current = step.loss;
    }

    Solve {
        link: b,
        iterations: params.max_iterations,
        converged: done(&b, current),
        singular: false,
    }
}
