// SPDX-License-Identifier: AGPL-3.0-only

//! Damped alternating projection.
//!
//! Each iteration applies two pulls to the estimate `B`:
//!
//! 1. unitarity: `B ← (1−f1) B + f1 (B†)⁻¹`, whose fixed points are unitary;
//! 2. residual: with `X = A (I + B)†`, `B ← (1−f2) B + f2 ((X − ah X)(A†)⁻¹ − I)`,
//!    whose fixed points solve the matching condition.
//!
//! A pull that increases its own measure is undone and its factor halved.
//! When the combined measure grew over the iteration both factors are
//! halved. The best estimate seen is returned.

use super::{loss, FixedPointParams, Solve};
use crate::lattice::color::ColorMatrix;

#[derive(Clone, Copy)]
struct Measured<const N: usize> {
    b: ColorMatrix<N>,
    residual: f64,
    defect: f64,
}

impl<const N: usize> Measured<N> {
    fn new(a: &ColorMatrix<N>, b: ColorMatrix<N>) -> Self {
        Self {
            b,
            residual: loss(a, &b),
            defect: b.unitarity_defect(),
        }
    }

    fn combined(&self) -> f64 {
        self.residual + self.defect
    }
}

pub(super) fn solve<const N: usize>(
    a: &ColorMatrix<N>,
    start: Option<ColorMatrix<N>>,
    params: &FixedPointParams,
) -> Solve<N> {
    let Some(a_dag_inv) = a.adjoint().inverse() else {
        return Solve::singular();
    };
    let unit = ColorMatrix::<N>::IDENTITY;
    let mut current = Measured::new(a, start.unwrap_or(*a * a_dag_inv));
    let mut best = current;
    let (mut f1, mut f2) = (params.unitarity_factor, params.residual_factor);

    for i in 0..params.max_iterations {
        if current.residual < params.residual_bound && current.defect < params.unitarity_bound {
            return Solve {
                link: current.b,
                iterations: i,
                converged: true,
                singular: false,
            };
        }
        let before = current;

        // Unitarity pull
        if let Some(b_dag_inv) = current.b.adjoint().inverse() {
            let pulled = Measured::new(
                a,
                current.b.scale(1.0 - f1) + b_dag_inv.scale(f1),
            );
            if pulled.defect > current.defect {
                f1 *= 0.5;
            } else {
                current = pulled;
            }
        } else {
            f1 *= 0.5;
        }

        // Residual pull
        let x = *a * (unit + current.b).adjoint();
        let target = (x - x.ah()) * a_dag_inv - unit;
        let pulled = Measured::new(a, current.b.scale(1.0 - f2) + target.scale(f2));
        if pulled.residual > current.residual {
            f2 *= 0.5;
        } else {
            current = pulled;
        }

        if current.combined() > before.combined() {
            f1 *= 0.5;
            f2 *= 0.5;
        }
        if current.combined() < best.combined() {
            best = current;
        }
    }

    let converged =
        best.residual < params.residual_bound && best.defect < params.unitarity_bound;
    if !converged {
        tracing::trace!(
            residual = best.residual,
            defect = best.defect,
            f1,
            f2,
            "damped fixed point hit its iteration cap"
        );
    }
    Solve {
        link: best.b,
        iterations: params.max_iterations,
        converged,
        singular: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unitarize::tests::{generic_su3_sum, weak_su2_sum};

    #[test]
    fn su2_closed_form_start_converges_immediately() {
        let s = solve(&weak_su2_sum(), None, &FixedPointParams::default());
        assert!(s.converged);
        assert_eq!(s.iterations, 0);
    }

    #[test]
    fn su2_from_perturbed_start_converges() {
        let a = weak_su2_sum();
        let exact = solve(&a, None, &FixedPointParams::default()).link;
        let mut start = exact;
        start.m[0][1].re += 1e-3;
        start.m[1][1].im -= 5e-4;
        let params = FixedPointParams {
            max_iterations: 200,
            ..FixedPointParams::default()
        };
        let s = solve(&a, Some(start), &params);
        let initial = Measured::new(&a, start).combined();
        let last = Measured::new(&a, s.link).combined();
        assert!(last < initial, "combined measure {last:.3e} vs start {initial:.3e}");
    }

    #[test]
    fn su3_best_estimate_no_worse_than_start() {
        let a = generic_su3_sum();
        let start = Measured::new(&a, a * a.adjoint().inverse().unwrap());
        let s = solve(&a, None, &FixedPointParams::default());
        let end = Measured::new(&a, s.link);
        assert!(
            end.combined() <= start.combined(),
            "best {:.3e} worse than closed form {:.3e}",
            end.combined(),
            start.combined()
        );
    }

    #[test]
    fn singular_input_short_circuits() {
        let s = solve(&ColorMatrix::<3>::ZERO, None, &FixedPointParams::default());
        assert!(s.singular && !s.converged);
    }
}
