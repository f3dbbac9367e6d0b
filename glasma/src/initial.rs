// SPDX-License-Identifier: AGPL-3.0-only

//! Boost-invariant Glasma initial condition from two nuclei's Wilson lines.
//!
//! The construction, per site `x` and transverse direction `d`:
//!
//! 1. pure-gauge links of each nucleus, `U_a(x,d) = V₁(x) V₁(x+d)†` and
//!    likewise `U_b` from `V₂`;
//! 2. the τ = 0 link `B` from the matching condition on `A = U_a + U_b`
//!    (see [`unitarize`](crate::unitarize));
//! 3. the longitudinal electric field
//!    `Π(x) = ½ Σ_d ah(B(x,d) Δ(x,d)† − Δ(x,d)† + B(x−d,d)† Δ(x−d,d) − Δ(x−d,d))`
//!    with `Δ = U_b − U_a`;
//! 4. half-step corrections to the transverse momenta from the plaquettes of
//!    `B`, then the advanced links `u1 = exp(pt1 · dt/(dt/2)) u0` and the
//!    longitudinal potential `aeta1 = aeta0 + Π · (dt/2) · dt`.
//!
//! At τ = 0 the longitudinal electric and magnetic energies agree in the
//! continuum; [`InitReport`] carries both for comparison.
//!
//! # References
//!
//! - Krasnitz & Venugopalan, NPB 557, 237 (1999)
//! - Lappi & McLerran, NPA 772, 200 (2006)

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{MvParams, SimulationParams};
use crate::error::{check_len, GlasmaError};
use crate::lattice::algebra::GaugeGroup;
use crate::lattice::color::ColorMatrix;
use crate::lattice::fields::{plaq, plaquettes, GlasmaFields};
use crate::lattice::index::{Grid2d, TRANSVERSE_DIMS};
use crate::mv::WilsonLineGenerator;
use crate::unitarize::{LinkUnitarizer, Refinement, UnitarizeStrategy, UnitarizerConfig};

/// Non-fatal condition raised during initialization.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InitEvent {
    /// A link did not meet its strategy's convergence bound; the best
    /// estimate was stored.
    NonConvergence {
        /// Site index.
        site: usize,
        /// Transverse direction.
        direction: usize,
        /// Final loss.
        residual: f64,
        /// Final ‖B†B − I‖².
        unitarity_defect: f64,
        /// Iterations spent.
        iterations: usize,
    },
    /// The closed form does not preserve unitarity for this group; links
    /// that left the group were solved with `fallback`.
    UnsupportedGroup {
        /// Number of colors.
        n_colors: usize,
        /// Strategy used instead.
        fallback: UnitarizeStrategy,
    },
    /// The screening kernel had no support; Wilson lines are unit matrices.
    DegenerateKernel,
    /// `U_a + U_b` was singular; the unit link was stored.
    SingularSum {
        /// Site index.
        site: usize,
        /// Transverse direction.
        direction: usize,
    },
}

/// Aggregate unitarizer diagnostics over all links.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UnitarizerStats {
    /// Links solved.
    pub links: usize,
    /// Links meeting their convergence bound.
    pub converged: usize,
    /// Links solved by the fallback strategy.
    pub fallback: usize,
    /// Links with a singular sum.
    pub singular: usize,
    /// Iterations summed over links.
    pub total_iterations: usize,
    /// Largest iteration count of a single link.
    pub max_iterations: usize,
    /// Largest final loss.
    pub max_residual: f64,
    /// Largest final unitarity defect.
    pub max_unitarity_defect: f64,
}

impl UnitarizerStats {
    fn record<const N: usize>(&mut self, r: &Refinement<N>) {
        self.links += 1;
        self.converged += usize::from(r.converged);
        self.fallback += usize::from(r.fallback);
        self.singular += usize::from(r.singular);
        self.total_iterations += r.iterations;
        self.max_iterations = self.max_iterations.max(r.iterations);
        self.max_residual = self.max_residual.max(r.residual);
        self.max_unitarity_defect = self.max_unitarity_defect.max(r.unitarity_defect);
    }

    /// Mean iterations per link.
    #[must_use]
    pub fn mean_iterations(&self) -> f64 {
        if self.links == 0 {
            0.0
        } else {
            self.total_iterations as f64 / self.links as f64
        }
    }
}

/// Result of one initialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InitReport {
    /// Longitudinal electric energy `E_L = Σ_x ‖Π(x)‖²`.
    pub electric_energy: f64,
    /// Longitudinal magnetic energy `B_L = Σ_x (‖ah P(u0)‖² + ‖ah P(u1)‖²) / 2`.
    pub magnetic_energy: f64,
    /// Unitarizer diagnostics.
    pub unitarizer: UnitarizerStats,
    /// Non-fatal events, in the order raised.
    pub events: Vec<InitEvent>,
}

impl InitReport {
    /// `E_L / B_L`, or `None` when the magnetic energy vanishes.
    #[must_use]
    pub fn energy_ratio(&self) -> Option<f64> {
        (self.magnetic_energy > 0.0).then(|| self.electric_energy / self.magnetic_energy)
    }
}

/// Builds the Glasma initial state from two Wilson-line fields.
#[derive(Clone, Copy, Debug)]
pub struct InitialFieldBuilder {
    sim: SimulationParams,
    unitarizer: LinkUnitarizer,
}

impl InitialFieldBuilder {
    /// Builder for lattice `sim` with link solver configuration `config`.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] when `sim` fails validation.
    pub fn new(sim: SimulationParams, config: UnitarizerConfig) -> Result<Self, GlasmaError> {
        sim.validate()?;
        Ok(Self {
            sim,
            unitarizer: LinkUnitarizer::new(config),
        })
    }

    /// Simulation parameters in use.
    #[must_use]
    pub const fn params(&self) -> &SimulationParams {
        &self.sim
    }

    /// Write the initial state into `fields` from Wilson lines `v1`, `v2`.
    ///
    /// `pt1` and `aeta0` are read as the starting transverse momenta and
    /// longitudinal potential (zero for a vacuum state). Every other array is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::FieldSize`] when `fields` or a Wilson-line field does
    /// not match the lattice.
    pub fn build<const N: usize>(
        &self,
        fields: &mut GlasmaFields<N>,
        v1: &[ColorMatrix<N>],
        v2: &[ColorMatrix<N>],
    ) -> Result<InitReport, GlasmaError>
    where
        ColorMatrix<N>: GaugeGroup,
    {
        let grid = Grid2d::new(self.sim.n);
        check_len("lattice", grid.volume(), fields.grid.volume())?;
        fields.validate()?;
        check_len("wilson line v1", grid.volume(), v1.len())?;
        check_len("wilson line v2", grid.volume(), v2.len())?;

        let dt = self.sim.dt;
        let dth = dt / 2.0;
        fields.dt = dt;

        let ua = pure_gauge_links(&grid, v1);
        let ub = pure_gauge_links(&grid, v2);

        let refinements: Vec<Refinement<N>> = ua
            .par_iter()
            .zip(ub.par_iter())
            .map(|(a, b)| self.unitarizer.refine(&(*a + *b)))
            .collect();
        for (l, r) in refinements.iter().enumerate() {
            fields.u0[l] = r.link;
        }
        let mut report = InitReport {
            events: self.link_events(&refinements),
            ..InitReport::default()
        };
        for r in &refinements {
            report.unitarizer.record(r);
        }

        let u0 = &fields.u0;
        fields
            .peta1
            .par_iter_mut()
            .enumerate()
            .for_each(|(x, p)| *p = longitudinal_electric(&grid, u0, &ua, &ub, x));

        fields.pt1.par_iter_mut().enumerate().for_each(|(l, pt)| {
            let (x, d) = (l / TRANSVERSE_DIMS, l % TRANSVERSE_DIMS);
            *pt = *pt - plaquettes(&grid, u0, x, d).scale(dt * dt / 2.0);
        });

        let pt1 = &fields.pt1;
        fields.u1.par_iter_mut().enumerate().for_each(|(l, u)| {
            *u = pt1[l].scale(dt / dth).exp_algebra() * u0[l];
        });
        let peta1 = &fields.peta1;
        fields
            .aeta1
            .par_iter_mut()
            .zip(fields.aeta0.par_iter())
            .enumerate()
            .for_each(|(x, (a1, a0))| *a1 = *a0 + peta1[x].scale(dth * dt));

        report.electric_energy = fields.peta1.par_iter().map(|p| p.norm_sq()).sum();
        let u1 = &fields.u1;
        report.magnetic_energy = (0..grid.volume())
            .into_par_iter()
            .map(|x| {
                let b0 = plaq(&grid, u0, x, 0, 1, 1, 1).ah().norm_sq();
                let b1 = plaq(&grid, u1, x, 0, 1, 1, 1).ah().norm_sq();
                (b0 + b1) / 2.0
            })
            .sum();

        fields.peta0.clone_from(&fields.peta1);
        fields.pt0.clone_from(&fields.pt1);

        tracing::info!(
            e_l = report.electric_energy,
            b_l = report.magnetic_energy,
            converged = report.unitarizer.converged,
            links = report.unitarizer.links,
            "Glasma initial condition built"
        );
        Ok(report)
    }

    fn link_events<const N: usize>(&self, refinements: &[Refinement<N>]) -> Vec<InitEvent>
    where
        ColorMatrix<N>: GaugeGroup,
    {
        let mut events = Vec::new();
        if refinements.iter().any(|r| r.fallback) {
            let fallback = self.unitarizer.config().fallback;
            tracing::warn!(
                n_colors = N,
                ?fallback,
                "closed-form link construction is not unitary for SU({}); \
                 affected links were solved with the fallback strategy",
                N
            );
            events.push(InitEvent::UnsupportedGroup {
                n_colors: N,
                fallback,
            });
        }
        for (l, r) in refinements.iter().enumerate() {
            let (site, direction) = (l / TRANSVERSE_DIMS, l % TRANSVERSE_DIMS);
            if r.singular {
                tracing::warn!(site, direction, "singular link sum; unit link stored");
                events.push(InitEvent::SingularSum { site, direction });
            } else if !r.converged {
                tracing::warn!(
                    site,
                    direction,
                    residual = r.residual,
                    unitarity_defect = r.unitarity_defect,
                    iterations = r.iterations,
                    "link solver did not converge"
                );
                events.push(InitEvent::NonConvergence {
                    site,
                    direction,
                    residual: r.residual,
                    unitarity_defect: r.unitarity_defect,
                    iterations: r.iterations,
                });
            }
        }
        events
    }
}

/// `V(x) V(x+d)†` on every link.
fn pure_gauge_links<const N: usize>(grid: &Grid2d, v: &[ColorMatrix<N>]) -> Vec<ColorMatrix<N>> {
    (0..grid.link_count())
        .into_par_iter()
        .map(|l| {
            let (x, d) = (l / TRANSVERSE_DIMS, l % TRANSVERSE_DIMS);
            v[x] * v[grid.shift(x, d, 1)].adjoint()
        })
        .collect()
}

fn longitudinal_electric<const N: usize>(
    grid: &Grid2d,
    u0: &[ColorMatrix<N>],
    ua: &[ColorMatrix<N>],
    ub: &[ColorMatrix<N>],
    x: usize,
) -> ColorMatrix<N> {
    let mut sum = ColorMatrix::ZERO;
    for d in 0..TRANSVERSE_DIMS {
        let here = grid.link_index(x, d);
        let back = grid.link_index(grid.shift(x, d, -1), d);

        let delta_dag = (ub[here] - ua[here]).adjoint();
        let forward = u0[here] * delta_dag - delta_dag;

        let delta_back = ub[back] - ua[back];
        let backward = u0[back].adjoint() * delta_back - delta_back;

        sum = sum + (forward + backward).ah();
    }
    sum.scale(0.5)
}

/// Seeds of the two nuclei.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NucleusSeeds {
    /// Seed of the first nucleus.
    pub first: u64,
    /// Seed of the second nucleus.
    pub second: u64,
}

impl NucleusSeeds {
    /// Two distinct seeds derived from one run seed.
    #[must_use]
    pub const fn from_run(seed: u64) -> Self {
        Self {
            first: seed.wrapping_mul(2),
            second: seed.wrapping_mul(2).wrapping_add(1),
        }
    }
}

/// Generate both nuclei and build the initial state on a vacuum background.
///
/// Kernel diagnostics of the generator precede the link events in the
/// report.
///
/// # Errors
///
/// [`GlasmaError::InvalidParameter`] when `sim` or `mv` fails validation.
pub fn glasma_initial_state<const N: usize>(
    sim: &SimulationParams,
    mv: &MvParams,
    config: UnitarizerConfig,
    seeds: NucleusSeeds,
) -> Result<(GlasmaFields<N>, InitReport), GlasmaError>
where
    ColorMatrix<N>: GaugeGroup,
{
    let generator = WilsonLineGenerator::<N>::new(sim, mv)?;
    let builder = InitialFieldBuilder::new(*sim, config)?;
    let w1 = generator.generate(seeds.first);
    let w2 = generator.generate(seeds.second);

    let mut fields = GlasmaFields::vacuum(Grid2d::new(sim.n), sim.dt);
    let mut report = builder.build(&mut fields, &w1.lines, &w2.lines)?;

    let mut events = w1.events;
    if !events.contains(&InitEvent::DegenerateKernel) {
        events.extend(w2.events);
    }
    events.append(&mut report.events);
    report.events = events;
    Ok((fields, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::color::{Su2, Su3};
    use crate::tolerances::UNITARIZE_UNITARITY_BOUND;

    fn sim(n: usize) -> SimulationParams {
        SimulationParams { n, dt: 0.25, g: 2.0 }
    }

    #[test]
    fn identity_wilson_lines_give_vacuum() {
        let n = 4;
        let builder = InitialFieldBuilder::new(sim(n), UnitarizerConfig::default()).unwrap();
        let mut fields = GlasmaFields::<2>::vacuum(Grid2d::new(n), 0.25);
        let ones = vec![Su2::IDENTITY; n * n];
        let report = builder.build(&mut fields, &ones, &ones).unwrap();

        assert!(fields.u0.iter().all(|u| *u == Su2::IDENTITY));
        assert!(fields.u1.iter().all(|u| *u == Su2::IDENTITY));
        assert!(fields.peta1.iter().all(|p| *p == Su2::ZERO));
        assert!(fields.peta0.iter().all(|p| *p == Su2::ZERO));
        assert!(fields.pt1.iter().all(|p| *p == Su2::ZERO));
        assert_eq!(report.electric_energy, 0.0);
        assert_eq!(report.magnetic_energy, 0.0);
        assert!(report.events.is_empty());
        assert_eq!(report.unitarizer.converged, 2 * n * n);
        assert_eq!(report.energy_ratio(), None);
    }

    #[test]
    fn existing_transverse_momenta_are_kept_on_flat_links() {
        let n = 3;
        let builder = InitialFieldBuilder::new(sim(n), UnitarizerConfig::default()).unwrap();
        let mut fields = GlasmaFields::<3>::vacuum(Grid2d::new(n), 0.25);
        let p = Su3::generator(5).scale(0.01);
        fields.pt1[4] = p;
        let ones = vec![Su3::IDENTITY; n * n];
        builder.build(&mut fields, &ones, &ones).unwrap();
        assert_eq!(fields.pt1[4], p);
        assert_eq!(fields.pt0[4], p);
        // u1 = exp(2 pt1) u0
        assert!((fields.u1[4] - p.scale(2.0).exp_algebra()).norm_sq() < 1e-28);
    }

    #[test]
    fn mismatched_wilson_lines_rejected() {
        let builder = InitialFieldBuilder::new(sim(4), UnitarizerConfig::default()).unwrap();
        let mut fields = GlasmaFields::<2>::vacuum(Grid2d::new(4), 0.25);
        let short = vec![Su2::IDENTITY; 15];
        let full = vec![Su2::IDENTITY; 16];
        let err = builder.build(&mut fields, &short, &full).unwrap_err();
        assert_eq!(
            err,
            GlasmaError::FieldSize {
                what: "wilson line v1",
                expected: 16,
                found: 15
            }
        );
        let mut wrong = GlasmaFields::<2>::vacuum(Grid2d::new(5), 0.25);
        assert!(builder.build(&mut wrong, &full, &full).is_err());
    }

    #[test]
    fn singular_sum_is_reported() {
        // V₂ = −V₁ on one site makes U_a + U_b vanish on the links touching it.
        let n = 4;
        let builder = InitialFieldBuilder::new(sim(n), UnitarizerConfig::default()).unwrap();
        let mut fields = GlasmaFields::<2>::vacuum(Grid2d::new(n), 0.25);
        let v1 = vec![Su2::IDENTITY; n * n];
        let mut v2 = v1.clone();
        v2[5] = Su2::IDENTITY.scale(-1.0);
        let report = builder.build(&mut fields, &v1, &v2).unwrap();
        assert_eq!(report.unitarizer.singular, 4);
        let singular: Vec<_> = report
            .events
            .iter()
            .filter(|e| matches!(e, InitEvent::SingularSum { .. }))
            .collect();
        assert_eq!(singular.len(), 4);
        assert!(report
            .events
            .contains(&InitEvent::SingularSum { site: 5, direction: 0 }));
    }

    #[test]
    fn su3_fallback_emits_single_warning_event() {
        let mv = MvParams {
            mu: 0.2,
            m: 0.3,
            ..MvParams::default()
        };
        let config = UnitarizerConfig::default();
        let (fields, report) =
            glasma_initial_state::<3>(&sim(4), &mv, config, NucleusSeeds::from_run(3)).unwrap();
        let unsupported = report
            .events
            .iter()
            .filter(|e| matches!(e, InitEvent::UnsupportedGroup { .. }))
            .count();
        assert_eq!(unsupported, 1);
        assert!(report.unitarizer.fallback > 0);
        for u in &fields.u0 {
            assert!(u.unitarity_defect() <= UNITARIZE_UNITARITY_BOUND);
        }
    }

    #[test]
    fn seeds_are_distinct() {
        for s in [0, 1, u64::MAX] {
            let seeds = NucleusSeeds::from_run(s);
            assert_ne!(seeds.first, seeds.second);
        }
    }

    #[test]
    fn report_serializes() {
        let report = InitReport {
            events: vec![InitEvent::DegenerateKernel],
            ..InitReport::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("DegenerateKernel"));
        assert!(json.contains("electric_energy"));
    }
}
