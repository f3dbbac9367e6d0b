// SPDX-License-Identifier: AGPL-3.0-only

//! Transverse link construction from the two nuclei's pure-gauge links.
//!
//! Given `A = U_a + U_b`, the sum of the two nuclei's links on one lattice
//! edge, the boost-invariant initial link `B` solves the matching condition
//!
//!   `ah(A (I + B)†) = 0`, with `B ∈ SU(N)`.
//!
//! The residual is `Y(B) = ah(A (I + B)†)` and the loss `L(B) = ‖Y(B)‖²`.
//!
//! | Strategy | Update | Start |
//! |----------|--------|-------|
//! | `ClosedForm` | `B = A (A†)⁻¹` | none |
//! | `DampedFixedPoint` | alternating unitarity and residual pulls | closed form |
//! | `CoordinateDescent` | additive forward-difference gradient steps | identity |
//! | `AlgebraDescent` | central-difference gradient in `B = exp(Σ m_a T_a) B₀` | identity |
//! | `AnalyticDescent` | closed-form gradient, `B ← exp(−η Σ g_a T_a) B` | identity |
//!
//! The closed form is exact for SU(2), where the sum of two group elements
//! is a real multiple of a group element, and for SU(3) data confined to an
//! SU(2) subgroup. For general SU(3) it violates unitarity; the unitarizer
//! then solves the site with the configured fallback and flags it.
//!
//! # References
//!
//! - Krasnitz & Venugopalan, NPB 557, 237 (1999), eq. (2.14)
//! - Lappi, PRC 67, 054903 (2003): SU(3) matching condition

mod algebra_descent;
mod closed_form;
mod coordinate;
mod fixed_point;

use serde::{Deserialize, Serialize};

use crate::lattice::algebra::GaugeGroup;
use crate::lattice::color::ColorMatrix;
use crate::tolerances::{UNITARIZE_RESIDUAL_BOUND, UNITARIZE_UNITARITY_BOUND};

/// Solution strategy for the link matching condition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum UnitarizeStrategy {
    /// `B = A (A†)⁻¹`. Exact for SU(2).
    #[default]
    ClosedForm,
    /// Damped alternating projection starting at the closed form.
    DampedFixedPoint,
    /// Additive descent with forward-difference gradients.
    CoordinateDescent,
    /// Descent on algebra coordinates with central-difference gradients.
    AlgebraDescent,
    /// Left-translated descent with the analytic gradient.
    AnalyticDescent,
}

/// Parameters of [`UnitarizeStrategy::DampedFixedPoint`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedPointParams {
    /// Initial weight f1 of the unitarity pull `B ← (1−f1) B + f1 (B†)⁻¹`.
    pub unitarity_factor: f64,
    /// Initial weight f2 of the residual pull.
    pub residual_factor: f64,
    /// Convergence bound on the loss.
    pub residual_bound: f64,
    /// Convergence bound on ‖B†B − I‖².
    pub unitarity_bound: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for FixedPointParams {
    fn default() -> Self {
        Self {
            unitarity_factor: 0.5,
            residual_factor: 0.25,
            residual_bound: UNITARIZE_RESIDUAL_BOUND,
            unitarity_bound: UNITARIZE_UNITARITY_BOUND,
            max_iterations: 30,
        }
    }
}

/// Parameters of the three descent strategies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DescentParams {
    /// Starting learning rate η.
    pub initial_rate: f64,
    /// Finite-difference probe step. Unused by the analytic gradient.
    pub probe_step: f64,
    /// Convergence bound on the loss.
    pub loss_bound: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// The rate doubles after a full-step win on iterations divisible by this.
    pub grow_every: usize,
}

impl DescentParams {
    /// Defaults for [`UnitarizeStrategy::CoordinateDescent`].
    ///
    /// The probe step is fixed and small: a forward difference carries a bias
    /// of order `h · L''`, which must stay below the loss bound.
    #[must_use]
    pub const fn forward_difference() -> Self {
        Self {
            initial_rate: 0.125,
            probe_step: 1e-6,
            loss_bound: UNITARIZE_RESIDUAL_BOUND,
            max_iterations: 2500,
            grow_every: 4,
        }
    }

    /// Defaults for [`UnitarizeStrategy::AlgebraDescent`].
    #[must_use]
    pub const fn central_difference() -> Self {
        Self {
            initial_rate: 0.125,
            probe_step: 1e-4,
            loss_bound: UNITARIZE_RESIDUAL_BOUND,
            max_iterations: 2500,
            grow_every: 8,
        }
    }

    /// Defaults for [`UnitarizeStrategy::AnalyticDescent`].
    #[must_use]
    pub const fn analytic() -> Self {
        Self {
            initial_rate: 0.125,
            probe_step: 0.0,
            loss_bound: UNITARIZE_RESIDUAL_BOUND,
            max_iterations: 2500,
            grow_every: 8,
        }
    }
}

/// Immutable unitarizer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitarizerConfig {
    /// Strategy applied to every link.
    pub strategy: UnitarizeStrategy,
    /// Strategy used when the closed form leaves the group (N > 2).
    pub fallback: UnitarizeStrategy,
    /// Damped fixed-point parameters.
    pub fixed_point: FixedPointParams,
    /// Coordinate descent parameters.
    pub coordinate: DescentParams,
    /// Algebra descent parameters.
    pub algebra: DescentParams,
    /// Analytic descent parameters.
    pub analytic: DescentParams,
    /// Bound on ‖B†B − I‖² for accepting a closed-form link.
    pub unitarity_bound: f64,
}

impl Default for UnitarizerConfig {
    fn default() -> Self {
        Self {
            strategy: UnitarizeStrategy::ClosedForm,
            fallback: UnitarizeStrategy::AnalyticDescent,
            fixed_point: FixedPointParams::default(),
            coordinate: DescentParams::forward_difference(),
            algebra: DescentParams::central_difference(),
            analytic: DescentParams::analytic(),
            unitarity_bound: UNITARIZE_UNITARITY_BOUND,
        }
    }
}

impl UnitarizerConfig {
    /// Default configuration with a different primary strategy.
    #[must_use]
    pub fn with_strategy(strategy: UnitarizeStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// Outcome of solving one link.
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct Refinement<const N: usize> {
    /// Best link found.
    pub link: ColorMatrix<N>,
    /// Iterations spent (0 for the closed form or an already converged start).
    pub iterations: usize,
    /// Final loss ‖ah(A (I + B)†)‖².
    pub residual: f64,
    /// Final ‖B†B − I‖².
    pub unitarity_defect: f64,
    /// Whether the strategy's convergence criterion was met.
    pub converged: bool,
    /// Whether the closed form was replaced by the fallback strategy.
    pub fallback: bool,
    /// Whether `A` was singular so that the identity link was substituted.
    pub singular: bool,
}

/// Iterate state handed back by a strategy.
#[derive(Clone, Copy, Debug)]
struct Solve<const N: usize> {
    link: ColorMatrix<N>,
    iterations: usize,
    converged: bool,
    singular: bool,
}

impl<const N: usize> Solve<N> {
    const fn singular() -> Self {
        Self {
            link: ColorMatrix::IDENTITY,
            iterations: 0,
            converged: false,
            singular: true,
        }
    }
}

/// Residual `Y(B) = ah(A (I + B)†)`.
pub fn residual<const N: usize>(a: &ColorMatrix<N>, b: &ColorMatrix<N>) -> ColorMatrix<N> {
    (*a * (ColorMatrix::IDENTITY + *b).adjoint()).ah()
}

/// Loss `‖Y(B)‖²`.
#[must_use]
pub fn loss<const N: usize>(a: &ColorMatrix<N>, b: &ColorMatrix<N>) -> f64 {
    residual(a, b).norm_sq()
}

/// Solves the link matching condition with a configured strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkUnitarizer {
    config: UnitarizerConfig,
}

impl LinkUnitarizer {
    /// Unitarizer with the given configuration.
    #[must_use]
    pub const fn new(config: UnitarizerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &UnitarizerConfig {
        &self.config
    }

    /// Solve for `A` from the strategy's own starting point.
    pub fn refine<const N: usize>(&self, a: &ColorMatrix<N>) -> Refinement<N>
    where
        ColorMatrix<N>: GaugeGroup,
    {
        self.run(self.config.strategy, a, None)
    }

    /// Solve for `A` starting from `start`.
    ///
    /// A start that already meets the residual and unitarity bounds is
    /// returned unchanged after zero iterations, so re-feeding a converged
    /// link is a fixed point.
    pub fn refine_from<const N: usize>(
        &self,
        a: &ColorMatrix<N>,
        start: &ColorMatrix<N>,
    ) -> Refinement<N>
    where
        ColorMatrix<N>: GaugeGroup,
    {
        self.run(self.config.strategy, a, Some(*start))
    }

    fn run<const N: usize>(
        &self,
        strategy: UnitarizeStrategy,
        a: &ColorMatrix<N>,
        start: Option<ColorMatrix<N>>,
    ) -> Refinement<N>
    where
        ColorMatrix<N>: GaugeGroup,
    {
        if let Some(b) = start {
            if loss(a, &b) < self.residual_bound(strategy)
                && b.unitarity_defect() < self.config.unitarity_bound
            {
                return finish(
                    a,
                    Solve {
                        link: b,
                        iterations: 0,
                        converged: true,
                        singular: false,
                    },
                );
            }
        }

        let solve = match strategy {
            UnitarizeStrategy::ClosedForm => closed_form::solve(a),
            UnitarizeStrategy::DampedFixedPoint => {
                fixed_point::solve(a, start, &self.config.fixed_point)
            }
            UnitarizeStrategy::CoordinateDescent => {
                coordinate::solve(a, start, &self.config.coordinate, self.config.unitarity_bound)
            }
            UnitarizeStrategy::AlgebraDescent => {
                algebra_descent::solve_central(a, start, &self.config.algebra)
            }
            UnitarizeStrategy::AnalyticDescent => {
                algebra_descent::solve_analytic(a, start, &self.config.analytic)
            }
        };

        if strategy == UnitarizeStrategy::ClosedForm
            && N > 2
            && !solve.singular
            && solve.link.unitarity_defect() > self.config.unitarity_bound
            && self.config.fallback != UnitarizeStrategy::ClosedForm
        {
            let mut r = self.run(self.config.fallback, a, None);
            r.fallback = true;
            return r;
        }

        let in_group = solve.link.unitarity_defect() <= self.config.unitarity_bound;
        let converged = in_group
            && (solve.converged || (strategy == UnitarizeStrategy::ClosedForm && !solve.singular));
        finish(a, Solve { converged, ..solve })
    }

    /// Loss bound of `strategy` as configured.
    fn residual_bound(&self, strategy: UnitarizeStrategy) -> f64 {
        match strategy {
            UnitarizeStrategy::ClosedForm => UNITARIZE_RESIDUAL_BOUND,
            UnitarizeStrategy::DampedFixedPoint => self.config.fixed_point.residual_bound,
            UnitarizeStrategy::CoordinateDescent => self.config.coordinate.loss_bound,
            UnitarizeStrategy::AlgebraDescent => self.config.algebra.loss_bound,
            UnitarizeStrategy::AnalyticDescent => self.config.analytic.loss_bound,
        }
    }
}

fn finish<const N: usize>(a: &ColorMatrix<N>, s: Solve<N>) -> Refinement<N> {
    Refinement {
        link: s.link,
        iterations: s.iterations,
        residual: loss(a, &s.link),
        unitarity_defect: s.link.unitarity_defect(),
        converged: s.converged,
        fallback: false,
        singular: s.singular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::color::{Su2, Su3};
    use crate::tolerances::FIXED_POINT_DRIFT;

    pub(super) fn su2_link(c: [f64; 3]) -> Su2 {
        Su2::from_algebra_coords(&c).exp_algebra()
    }

    pub(super) fn su3_link(c: [f64; 8]) -> Su3 {
        Su3::from_algebra_coords(&c).exp_algebra()
    }

    /// Two small SU(2) links, as from weak MV fields.
    pub(super) fn weak_su2_sum() -> Su2 {
        su2_link([0.05, -0.03, 0.02]) + su2_link([-0.01, 0.04, 0.05])
    }

    /// Two generic SU(3) links, strong enough that the closed form leaves
    /// the group.
    pub(super) fn generic_su3_sum() -> Su3 {
        su3_link([0.5, -0.3, 0.2, 0.4, -0.2, 0.1, 0.3, -0.5])
            + su3_link([-0.1, 0.4, 0.5, -0.3, 0.2, 0.2, -0.4, 0.1])
    }

    #[test]
    fn residual_of_closed_form_vanishes() {
        let a = weak_su2_sum();
        let r = LinkUnitarizer::default().refine(&a);
        assert!(r.converged);
        assert_eq!(r.iterations, 0);
        assert!(r.residual < 1e-24, "residual {:.3e}", r.residual);
        assert!(r.unitarity_defect < 1e-24);
        assert!(!r.fallback && !r.singular);
    }

    #[test]
    fn singular_sum_gives_identity() {
        let u = su2_link([0.3, 0.1, -0.2]);
        let a = u + u.scale(-1.0);
        let r = LinkUnitarizer::default().refine(&a);
        assert!(r.singular);
        assert!(!r.converged);
        assert_eq!(r.link, Su2::IDENTITY);
    }

    #[test]
    fn converged_start_is_fixed_point() {
        for strategy in [
            UnitarizeStrategy::ClosedForm,
            UnitarizeStrategy::DampedFixedPoint,
            UnitarizeStrategy::CoordinateDescent,
            UnitarizeStrategy::AlgebraDescent,
            UnitarizeStrategy::AnalyticDescent,
        ] {
            let u = LinkUnitarizer::new(UnitarizerConfig::with_strategy(strategy));
            let a = weak_su2_sum();
            let first = u.refine(&a);
            assert!(first.converged, "{strategy:?} did not converge");
            let second = u.refine_from(&a, &first.link);
            assert_eq!(second.iterations, 0, "{strategy:?}");
            assert!(
                (second.link - first.link).norm_sq() < FIXED_POINT_DRIFT,
                "{strategy:?} moved a converged link"
            );
        }
    }

    #[test]
    fn every_strategy_returns_group_elements() {
        let exact = LinkUnitarizer::default().refine(&weak_su2_sum()).link;
        for strategy in [
            UnitarizeStrategy::DampedFixedPoint,
            UnitarizeStrategy::CoordinateDescent,
            UnitarizeStrategy::AlgebraDescent,
            UnitarizeStrategy::AnalyticDescent,
        ] {
            let u = LinkUnitarizer::new(UnitarizerConfig::with_strategy(strategy));
            let r = u.refine(&weak_su2_sum());
            assert!(r.converged, "{strategy:?}");
            assert!(
                r.unitarity_defect <= UNITARIZE_UNITARITY_BOUND,
                "{strategy:?}: {:.3e}",
                r.unitarity_defect
            );
            assert!((r.link - exact).norm_sq() < 1e-6, "{strategy:?} strayed from B");
        }
        let coordinate = LinkUnitarizer::new(UnitarizerConfig::with_strategy(
            UnitarizeStrategy::CoordinateDescent,
        ));
        let r = coordinate.refine(&generic_su3_sum());
        assert!(r.converged, "residual {:.3e}", r.residual);
        assert!(r.unitarity_defect < 1e-20, "{:.3e}", r.unitarity_defect);
    }

    #[test]
    fn start_is_held_to_the_configured_bound() {
        let a = weak_su2_sum();
        let exact = LinkUnitarizer::default().refine(&a).link;
        let start = su2_link([1e-6, -1e-6, 1e-6]) * exact;
        let start_loss = loss(&a, &start);
        assert!(start_loss < UNITARIZE_RESIDUAL_BOUND && start_loss > 1e-16);

        let mut config = UnitarizerConfig::with_strategy(UnitarizeStrategy::AnalyticDescent);
        let relaxed = LinkUnitarizer::new(config).refine_from(&a, &start);
        assert_eq!(relaxed.iterations, 0);

        config.analytic.loss_bound = 1e-20;
        config.analytic.max_iterations = 50;
        let strict = LinkUnitarizer::new(config).refine_from(&a, &start);
        assert!(strict.iterations > 0, "strict bound bypassed");
        assert!(strict.residual <= start_loss);
    }

    #[test]
    fn su3_closed_form_falls_back() {
        let a = generic_su3_sum();
        let r = LinkUnitarizer::default().refine(&a);
        assert!(r.fallback, "generic SU(3) data must leave the closed form");
        assert!(r.converged, "fallback residual {:.3e}", r.residual);
        assert!(r.residual < UNITARIZE_RESIDUAL_BOUND);
        assert!(r.unitarity_defect < 1e-20);
    }

    #[test]
    fn su3_subgroup_closed_form_is_exact() {
        let a = su3_link([0.1, -0.2, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0])
            + su3_link([-0.05, 0.1, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let r = LinkUnitarizer::default().refine(&a);
        assert!(!r.fallback);
        assert!(r.converged);
        assert!(r.unitarity_defect < 1e-20 && r.residual < 1e-20);
    }

    #[test]
    fn disabled_fallback_reports_nonconvergence() {
        let config = UnitarizerConfig {
            fallback: UnitarizeStrategy::ClosedForm,
            ..UnitarizerConfig::default()
        };
        let r = LinkUnitarizer::new(config).refine(&generic_su3_sum());
        assert!(!r.fallback);
        assert!(!r.converged);
        assert!(r.unitarity_defect > UNITARIZE_UNITARITY_BOUND);
    }

    #[test]
    fn config_round_trips_json() {
        let c = UnitarizerConfig::with_strategy(UnitarizeStrategy::AlgebraDescent);
        let json = serde_json::to_string(&c).unwrap();
        let back: UnitarizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.coordinate.grow_every, 4);
        assert_eq!(back.algebra.grow_every, 8);
    }
}
