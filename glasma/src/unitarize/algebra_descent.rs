// SPDX-License-Identifier: AGPL-3.0-only

//! Descent on the group manifold through the exponential map.
//!
//! Both variants keep the iterate in SU(N) by construction.
//!
//! - Central difference: `B(m) = exp(Σ_a m_a T_a) B₀` with `B₀` fixed, and
//!   `∂L/∂m_a ≈ (L(m + h e_a) − L(m − h e_a)) / 2h`.
//! - Analytic: the derivative at the current iterate along `T_a B` is
//!   `∂L/∂m_a = 2 Re Tr(ah(A (T_a B)†) Y†)`, and the update is the
//!   left-translated step `B ← exp(−η Σ_a g_a T_a) B`.
//!
//! Candidates and rate adaptation are shared with the coordinate descent.

use super::coordinate::{adapt_rate, pick};
use super::{loss, residual, DescentParams, Solve};
use crate::lattice::algebra::{re_tr_mul_adj, GaugeGroup};
use crate::lattice::color::ColorMatrix;

type Coords<const N: usize> = <ColorMatrix<N> as GaugeGroup>::Coords;

fn axpy<const N: usize>(x: &Coords<N>, alpha: f64, y: &Coords<N>) -> Coords<N>
where
    ColorMatrix<N>: GaugeGroup,
{
    let mut out = *x;
    for (o, v) in out.as_mut().iter_mut().zip(y.as_ref()) {
        *o += alpha * v;
    }
    out
}

pub(super) fn solve_central<const N: usize>(
    a: &ColorMatrix<N>,
    start: Option<ColorMatrix<N>>,
    params: &DescentParams,
) -> Solve<N>
where
    ColorMatrix<N>: GaugeGroup,
{
    let b0 = start.unwrap_or(ColorMatrix::IDENTITY);
    let link =
        |m: &Coords<N>| ColorMatrix::<N>::from_algebra_coords(m.as_ref()).exp_algebra() * b0;
    let eval = |m: &Coords<N>| loss(a, &link(m));

    let mut m: Coords<N> = Default::default();
    let mut current = eval(&m);
    let mut rate = params.initial_rate;
    let h = params.probe_step;

    for i in 0..params.max_iterations {
        if current < params.loss_bound {
            return Solve {
                link: link(&m),
                iterations: i,
                converged: true,
                singular: false,
            };
        }

        let mut grad: Coords<N> = Default::default();
        for (g, slot) in grad.as_mut().iter_mut().enumerate() {
            let mut plus = m;
            let mut minus = m;
            plus.as_mut()[g] += h;
            minus.as_mut()[g] -= h;
            *slot = (eval(&plus) - eval(&minus)) / (2.0 * h);
        }

        let candidate = |f: f64| {
            let p = axpy::<N>(&m, -rate * f, &grad);
            (p, eval(&p))
        };
        let step = pick((m, current), candidate(0.25), candidate(0.5), candidate(1.0));
        rate = adapt_rate(rate, &step, i, params.grow_every);
        m = step.point;
        current = step.loss;
    }

    Solve {
        link: link(&m),
        iterations: params.max_iterations,
        converged: current < params.loss_bound,
        singular: false,
    }
}

/// `∂L/∂m_a` at `b` along the left-translated direction `T_a B`.
fn analytic_gradient<const N: usize>(a: &ColorMatrix<N>, b: &ColorMatrix<N>) -> Coords<N>
where
    ColorMatrix<N>: GaugeGroup,
{
    let y = residual(a, b);
    let mut grad: Coords<N> = Default::default();
    for (g, slot) in grad.as_mut().iter_mut().enumerate() {
        let dy = (*a * (ColorMatrix::<N>::generator(g) * *b).adjoint()).ah();
        *slot = 2.0 * re_tr_mul_adj(&dy, &y);
    }
    grad
}

pub(super) fn solve_analytic<const N: usize>(
    a: &ColorMatrix<N>,
    start: Option<ColorMatrix<N>>,
    params: &DescentParams,
) -> Solve<N>
where
    ColorMatrix<N>: GaugeGroup,
{
    let mut b = start.unwrap_or(ColorMatrix::IDENTITY);
    let mut current = loss(a, &b);
    let mut rate = params.initial_rate;

    for i in 0..params.max_iterations {
        if current < params.loss_bound {
            return Solve {
                link: b,
                iterations: i,
                converged: true,
                singular: false,
            };
        }

        let direction = ColorMatrix::<N>::from_algebra_coords(analytic_gradient(a, &b).as_ref());
        let candidate = |f: f64| {
            let p = direction.scale(-rate * f).exp_algebra() * b;
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
        converged: current < params.loss_bound,
        singular: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::color::Su3;
    use crate::unitarize::tests::{generic_su3_sum, su3_link, weak_su2_sum};

    #[test]
    fn analytic_gradient_matches_central_difference() {
        let a = generic_su3_sum();
        let b = su3_link([0.1, 0.2, -0.1, 0.05, 0.0, -0.2, 0.1, 0.3]);
        let grad = analytic_gradient(&a, &b);
        let h = 1e-5;
        for g in 0..8 {
            let t = Su3::generator(g);
            let plus = loss(&a, &(t.scale(h).exp_algebra() * b));
            let minus = loss(&a, &(t.scale(-h).exp_algebra() * b));
            let numeric = (plus - minus) / (2.0 * h);
            assert!(
                (numeric - grad[g]).abs() < 1e-7,
                "generator {g}: analytic {} vs numeric {numeric}",
                grad[g]
            );
        }
    }

    #[test]
    fn central_difference_converges_on_weak_su2() {
        let a = weak_su2_sum();
        let s = solve_central(&a, None, &DescentParams::central_difference());
        assert!(s.converged, "loss {:.3e}", loss(&a, &s.link));
        assert!(s.link.unitarity_defect() < 1e-20);
    }

    #[test]
    fn analytic_converges_on_weak_su2() {
        let a = weak_su2_sum();
        let s = solve_analytic(&a, None, &DescentParams::analytic());
        assert!(s.converged, "loss {:.3e}", loss(&a, &s.link));
        assert!(s.link.unitarity_defect() < 1e-20);
        let d = s.link.det();
        assert!((d.re - 1.0).abs() < 1e-10);
    }

    #[test]
    fn analytic_converges_on_generic_su3() {
        let a = generic_su3_sum();
        let s = solve_analytic(&a, None, &DescentParams::analytic());
        assert!(s.converged, "loss {:.3e} after {}", loss(&a, &s.link), s.iterations);
        assert!(s.link.unitarity_defect() < 1e-20);
    }
}
