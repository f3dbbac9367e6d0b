// SPDX-License-Identifier: AGPL-3.0-only

//! Glasma initial-condition validation.
//!
//! # Validation targets
//!
//! | Observable | Expected | Basis |
//! |-----------|----------|-------|
//! | Pb-Pb 5.02 TeV `Q_s` | 2.54422 GeV | `√(0.13 A^(1/3) √s^(1/4))` |
//! | Pb-Pb 5.02 TeV `g` | 1.96995 | `π/√ln(Q_s/0.2)` |
//! | `exp` of su(N) element | unitary, det 1 | Definition |
//! | μ = 0 initial state | u0 = u1 = I, Π = 0 | Pure gauge vacuum |
//! | SU(2) closed-form links | unitary, residual 0 | Exact solution |
//! | `E_L / B_L`, SU(2), n = 32 | in [0.5, 2] | Continuum equality at τ = 0 |
//! | SU(3) subgroup links | no fallback | Closed form exact in SU(2) ⊂ SU(3) |
//! | Re-refining a converged link | unchanged | Fixed point |
//! | `C(0)` | mean `‖F‖²` | Definition |
//! | Full SU(3) collision | all links unitary, every miss reported | Fallback solver |

use std::time::Instant;

use glasma::config::{CollisionParams, ColorMode, MvParams, SimulationParams};
use glasma::initial::{glasma_initial_state, InitEvent, InitReport, NucleusSeeds};
use glasma::lattice::algebra::GaugeGroup;
use glasma::lattice::color::{ColorMatrix, Su2, Su3};
use glasma::lattice::index::Grid2d;
use glasma::mv::WilsonLineGenerator;
use glasma::observables::{mean_square, transverse_correlator, FieldComponent};
use glasma::tolerances;
use glasma::unitarize::{LinkUnitarizer, UnitarizerConfig};
use glasma::validation::ValidationHarness;

fn max_defect<const N: usize>(links: &[ColorMatrix<N>]) -> f64 {
    links
        .iter()
        .map(|u| u.unitarity_defect())
        .fold(0.0, f64::max)
}

fn print_report(report: &InitReport) {
    let stats = &report.unitarizer;
    println!("  E_L = {:.6e}, B_L = {:.6e}", report.electric_energy, report.magnetic_energy);
    println!(
        "  links: {} converged / {} total, {} fallback, {} singular, mean iterations {:.1}",
        stats.converged,
        stats.links,
        stats.fallback,
        stats.singular,
        stats.mean_iterations()
    );
    println!(
        "  max residual {:.3e}, max unitarity defect {:.3e}, {} events",
        stats.max_residual,
        stats.max_unitarity_defect,
        report.events.len()
    );
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Glasma Initial Conditions: MV Wilson lines + link matching ║");
    println!("║  Krasnitz & Venugopalan, NPB 557, 237 (1999)                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let mut harness = ValidationHarness::new("glasma_init");
    let config = UnitarizerConfig::default();
    let t_start = Instant::now();

    // ═══ Physical parametrization ═══
    println!("═══ Physical Parameters (Pb-Pb, √s = 5.02 TeV) ═══");
    let collision = CollisionParams::default();
    {
        let qs = collision.saturation_momentum();
        let g = collision.coupling();
        println!("  Q_s = {qs:.6} GeV, g = {g:.6}");
        println!(
            "  μ = {:.6} GeV, m = {:.6} GeV, E0 = {:.6} GeV",
            collision.mu_gev(),
            collision.ir_mass_gev(),
            collision.lattice_energy_gev()
        );
        harness.check_rel("saturation momentum", qs, 2.544_22, 1e-5);
        harness.check_rel("running coupling", g, 1.969_95, 1e-5);
        harness.check_rel(
            "lattice energy unit",
            collision.lattice_energy_gev(),
            10.103_091_2,
            1e-7,
        );
    }
    println!();

    // ═══ Exponential map ═══
    println!("═══ Exponential Map ═══");
    {
        let mut su2_defect = 0.0_f64;
        let mut su3_defect = 0.0_f64;
        let mut det_err = 0.0_f64;
        for k in 0..32 {
            let t = f64::from(k) * 0.37;
            let c2 = [t.sin(), 2.0 * t.cos(), 0.5 * t];
            let c3 = [t.sin(), t.cos(), 0.3 * t, -t.sin(), 0.2, 1.5 * t.cos(), -0.7, 0.1 * t];
            let u = Su2::from_algebra_coords(&c2).exp_algebra();
            let w = Su3::from_algebra_coords(&c3).exp_algebra();
            su2_defect = su2_defect.max(u.unitarity_defect());
            su3_defect = su3_defect.max(w.unitarity_defect());
            det_err = det_err
                .max((u.det() - 1.0).norm())
                .max((w.det() - 1.0).norm());
        }
        println!("  max ‖U†U − I‖²: SU(2) {su2_defect:.3e}, SU(3) {su3_defect:.3e}");
        println!("  max |det U − 1|: {det_err:.3e}");
        harness.check_upper("SU(2) exp unitary", su2_defect, tolerances::GROUP_UNITARITY_ABS);
        harness.check_upper("SU(3) exp unitary", su3_defect, tolerances::GROUP_UNITARITY_ABS);
        harness.check_upper("exp det = 1", det_err, tolerances::GROUP_DET_ABS);
    }
    println!();

    // ═══ Vacuum ═══
    println!("═══ Vacuum (n = 4, ns = 1, μ = 0) ═══");
    {
        let sim = SimulationParams { n: 4, dt: 0.125, g: 2.0 };
        let mv = MvParams {
            mu: 0.0,
            ..MvParams::default()
        };
        match glasma_initial_state::<3>(&sim, &mv, config, NucleusSeeds::from_run(0)) {
            Ok((fields, report)) => {
                print_report(&report);
                harness.check_bool("u0 = I", fields.u0.iter().all(|u| *u == Su3::IDENTITY));
                harness.check_bool("u1 = I", fields.u1.iter().all(|u| *u == Su3::IDENTITY));
                harness.check_bool(
                    "longitudinal field vanishes",
                    fields.peta0.iter().chain(&fields.peta1).all(|p| *p == Su3::ZERO),
                );
                harness.check_abs("vacuum E_L", report.electric_energy, 0.0, tolerances::EXACT_F64);
                harness.check_abs("vacuum B_L", report.magnetic_energy, 0.0, tolerances::EXACT_F64);
            }
            Err(e) => {
                println!("  vacuum build failed: {e}");
                harness.check_bool("vacuum build", false);
            }
        }
    }
    println!();

    // ═══ Energy balance, SU(2) ═══
    println!("═══ Energy Balance (SU(2), n = 32) ═══");
    let sim32 = SimulationParams { n: 32, dt: 0.125, g: 2.0 };
    let mv32 = MvParams::default();
    match glasma_initial_state::<2>(&sim32, &mv32, config, NucleusSeeds::from_run(7)) {
        Ok((fields, report)) => {
            print_report(&report);
            let ratio = report.energy_ratio().unwrap_or(f64::NAN);
            println!("  E_L / B_L = {ratio:.4}");
            harness.check_range(
                "E_L / B_L",
                ratio,
                tolerances::ENERGY_BALANCE_RATIO_MIN,
                tolerances::ENERGY_BALANCE_RATIO_MAX,
            );
            harness.check_upper(
                "SU(2) link unitarity",
                max_defect(&fields.u0),
                tolerances::GROUP_UNITARITY_ABS,
            );
            harness.check_upper(
                "SU(2) link residual",
                report.unitarizer.max_residual,
                tolerances::UNITARIZE_RESIDUAL_BOUND,
            );
            harness.check_bool("SU(2) raises no events", report.events.is_empty());

            for component in [FieldComponent::Ez, FieldComponent::Bz] {
                let corr = transverse_correlator(&fields, component);
                let ms = mean_square(&fields, component);
                println!(
                    "  {component:?}: C(0) = {:.6e}, C(1) = {:.6e}, C(n/2 − 1) = {:.6e}",
                    corr[0],
                    corr[1],
                    corr[corr.len() - 1]
                );
                let label = format!("{component:?} C(0) = ⟨‖F‖²⟩");
                harness.check_rel(&label, corr[0], ms, tolerances::EXACT_F64);
            }
        }
        Err(e) => {
            println!("  SU(2) build failed: {e}");
            harness.check_bool("SU(2) build", false);
        }
    }
    println!();

    // ═══ Fixed point ═══
    println!("═══ Unitarizer Fixed Point ═══");
    match WilsonLineGenerator::<2>::new(&sim32, &mv32) {
        Ok(generator) => {
            let v1 = generator.generate(101).lines;
            let v2 = generator.generate(102).lines;
            let grid = Grid2d::new(sim32.n);
            let unitarizer = LinkUnitarizer::default();
            let mut drift = 0.0_f64;
            let mut iterations = 0;
            for site in (0..grid.volume()).step_by(17) {
                let xs = grid.shift(site, 0, 1);
                let a = v1[site] * v1[xs].adjoint() + v2[site] * v2[xs].adjoint();
                let first = unitarizer.refine(&a);
                let second = unitarizer.refine_from(&a, &first.link);
                drift = drift.max((second.link - first.link).norm_sq());
                iterations += second.iterations;
            }
            println!("  max drift {drift:.3e}, iterations on re-entry {iterations}");
            harness.check_upper("re-refine drift", drift, tolerances::FIXED_POINT_DRIFT);
            harness.check_bool("re-refine takes no steps", iterations == 0);
        }
        Err(e) => {
            println!("  generator setup failed: {e}");
            harness.check_bool("generator setup", false);
        }
    }
    println!();

    // ═══ SU(3), SU(2) subgroup ═══
    println!("═══ SU(3) with SU(2)-Subgroup Charges (n = 16) ═══");
    {
        let sim = SimulationParams { n: 16, dt: 0.125, g: 2.0 };
        let mv = MvParams {
            color_mode: ColorMode::Su2Subgroup,
            ..MvParams::default()
        };
        match glasma_initial_state::<3>(&sim, &mv, config, NucleusSeeds::from_run(11)) {
            Ok((fields, report)) => {
                print_report(&report);
                harness.check_bool("subgroup needs no fallback", report.unitarizer.fallback == 0);
                harness.check_upper(
                    "subgroup link unitarity",
                    max_defect(&fields.u0),
                    tolerances::GROUP_UNITARITY_ABS,
                );
            }
            Err(e) => {
                println!("  subgroup build failed: {e}");
                harness.check_bool("subgroup build", false);
            }
        }
    }
    println!();

    // ═══ Scaled-down collision, full SU(3) ═══
    println!("═══ Pb-Pb Collision, Full SU(3) (n = 16, ns = 4) ═══");
    {
        let small = CollisionParams {
            lattice_sites: 16,
            num_sheets: 4,
            ..collision
        };
        let params = small
            .simulation_params()
            .and_then(|sim| Ok((sim, small.mv_params(ColorMode::Full)?)));
        match params.and_then(|(sim, mv)| {
            println!(
                "  lattice units: μ = {:.4}, m = {:.4}, uv = {:.4}, g = {:.4}",
                mv.mu, mv.m, mv.uv, sim.g
            );
            glasma_initial_state::<3>(&sim, &mv, config, NucleusSeeds::from_run(2024))
        }) {
            Ok((fields, report)) => {
                print_report(&report);
                let stats = &report.unitarizer;
                let unresolved = report
                    .events
                    .iter()
                    .filter(|e| {
                        matches!(
                            e,
                            InitEvent::NonConvergence { .. } | InitEvent::SingularSum { .. }
                        )
                    })
                    .count();
                harness.check_upper(
                    "SU(3) link unitarity",
                    max_defect(&fields.u0),
                    tolerances::UNITARIZE_UNITARITY_BOUND,
                );
                harness.check_bool(
                    "every unresolved link reported",
                    unresolved == stats.links - stats.converged,
                );
                harness.check_bool(
                    "fallback announced once",
                    report
                        .events
                        .iter()
                        .filter(|e| matches!(e, InitEvent::UnsupportedGroup { .. }))
                        .count()
                        == usize::from(stats.fallback > 0),
                );
            }
            Err(e) => {
                println!("  collision build failed: {e}");
                harness.check_bool("collision build", false);
            }
        }
    }
    println!();

    println!("  wall time: {:.2} s", t_start.elapsed().as_secs_f64());
    harness.finish();
}
