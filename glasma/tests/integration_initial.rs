// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: Wilson lines → link matching → τ = 0 Glasma fields.

use glasma::config::{ColorMode, MvParams, SimulationParams};
use glasma::error::GlasmaError;
use glasma::initial::{glasma_initial_state, InitEvent, NucleusSeeds};
use glasma::lattice::color::{Su2, Su3};
use glasma::tolerances;
use glasma::unitarize::{UnitarizeStrategy, UnitarizerConfig};

fn sim(n: usize) -> SimulationParams {
    SimulationParams { n, dt: 0.125, g: 2.0 }
}

fn default_links() -> UnitarizerConfig {
    UnitarizerConfig::default()
}

#[test]
fn su2_energy_balance() {
    for run in [1, 2, 3] {
        let (_, report) = glasma_initial_state::<2>(
            &sim(32),
            &MvParams::default(),
            UnitarizerConfig::default(),
            NucleusSeeds::from_run(run),
        )
        .unwrap();
        let ratio = report.energy_ratio().unwrap();
        assert!(
            (tolerances::ENERGY_BALANCE_RATIO_MIN..=tolerances::ENERGY_BALANCE_RATIO_MAX)
                .contains(&ratio),
            "run {run}: E_L = {:.4e}, B_L = {:.4e}, ratio {ratio:.3}",
            report.electric_energy,
            report.magnetic_energy
        );
        assert!(report.events.is_empty(), "run {run}: {:?}", report.events);
        assert_eq!(report.unitarizer.converged, report.unitarizer.links);
    }
}

#[test]
fn su3_subgroup_energy_balance_without_fallback() {
    let mv = MvParams {
        color_mode: ColorMode::Su2Subgroup,
        ..MvParams::default()
    };
    let seeds = NucleusSeeds::from_run(5);
    let (fields, report) = glasma_initial_state::<3>(&sim(24), &mv, default_links(), seeds).unwrap();
    assert_eq!(report.unitarizer.fallback, 0);
    assert!(report.events.is_empty());
    let ratio = report.energy_ratio().unwrap();
    let balance = tolerances::ENERGY_BALANCE_RATIO_MIN..=tolerances::ENERGY_BALANCE_RATIO_MAX;
    assert!(balance.contains(&ratio), "ratio {ratio:.3}");
    for u in &fields.u0 {
        assert!(u.unitarity_defect() < tolerances::GROUP_UNITARITY_ABS);
        // Color 2 decouples from the subgroup.
        assert!((u.m[2][2].re - 1.0).abs() < tolerances::EXACT_F64);
    }
}

#[test]
fn same_seeds_same_state() {
    let run = || {
        glasma_initial_state::<2>(
            &sim(16),
            &MvParams::default(),
            UnitarizerConfig::default(),
            NucleusSeeds::from_run(9),
        )
        .unwrap()
    };
    let (a, ra) = run();
    let (b, rb) = run();
    assert_eq!(a.u0, b.u0);
    assert_eq!(a.u1, b.u1);
    assert_eq!(a.peta1, b.peta1);
    assert_eq!(a.pt1, b.pt1);
    assert!((ra.electric_energy - rb.electric_energy).abs() <= 1e-12 * ra.electric_energy);
    assert!((ra.magnetic_energy - rb.magnetic_energy).abs() <= 1e-12 * ra.magnetic_energy);

    let (c, _) = glasma_initial_state::<2>(
        &sim(16),
        &MvParams::default(),
        UnitarizerConfig::default(),
        NucleusSeeds::from_run(10),
    )
    .unwrap();
    assert_ne!(a.u0, c.u0);
}

#[test]
fn vacuum_from_zero_source() {
    let mv = MvParams {
        mu: 0.0,
        ..MvParams::default()
    };
    let seeds = NucleusSeeds::from_run(0);
    let (fields, report) = glasma_initial_state::<3>(&sim(4), &mv, default_links(), seeds).unwrap();
    assert!(fields.u0.iter().chain(&fields.u1).all(|u| *u == Su3::IDENTITY));
    assert!(fields.peta0.iter().chain(&fields.peta1).all(|p| *p == Su3::ZERO));
    assert!(fields.aeta1.iter().all(|a| *a == Su3::ZERO));
    assert_eq!(report.electric_energy, 0.0);
    assert_eq!(report.magnetic_energy, 0.0);
    assert_eq!(report.energy_ratio(), None);
}

#[test]
fn degenerate_kernel_reported_once() {
    // A cutoff below the first mode and a negative cutoff both empty the kernel.
    for uv in [1e-3, -1.0] {
        let mv = MvParams {
            uv,
            ..MvParams::default()
        };
        let (fields, report) =
            glasma_initial_state::<2>(&sim(8), &mv, default_links(), NucleusSeeds::from_run(4))
                .unwrap();
        assert_eq!(report.events, vec![InitEvent::DegenerateKernel], "uv = {uv}");
        assert!(fields.u0.iter().all(|u| *u == Su2::IDENTITY));
        assert_eq!(report.electric_energy, 0.0);
    }
}

#[test]
fn every_strategy_agrees_with_closed_form_for_su2() {
    let build = |strategy| {
        glasma_initial_state::<2>(
            &sim(12),
            &MvParams::default(),
            UnitarizerConfig::with_strategy(strategy),
            NucleusSeeds::from_run(21),
        )
        .unwrap()
    };
    let (exact, exact_report) = build(UnitarizeStrategy::ClosedForm);
    let rel = |x: f64, y: f64| (x - y).abs() / x.abs();
    for strategy in [
        UnitarizeStrategy::DampedFixedPoint,
        UnitarizeStrategy::CoordinateDescent,
        UnitarizeStrategy::AlgebraDescent,
        UnitarizeStrategy::AnalyticDescent,
    ] {
        let (fields, report) = build(strategy);
        assert_eq!(report.unitarizer.converged, report.unitarizer.links, "{strategy:?}");
        assert!(report.events.is_empty(), "{strategy:?}: {:?}", report.events);
        for (a, b) in exact.u0.iter().zip(&fields.u0) {
            assert!(b.unitarity_defect() <= tolerances::UNITARIZE_UNITARITY_BOUND, "{strategy:?}");
            assert!((*a - *b).norm_sq() < 1e-6, "{strategy:?}");
        }
        assert!(rel(exact_report.electric_energy, report.electric_energy) < 0.1);
        assert!(rel(exact_report.magnetic_energy, report.magnetic_energy) < 0.1);
    }
}

#[test]
fn invalid_inputs_are_fatal() {
    let bad_sim = SimulationParams { n: 8, dt: -0.1, g: 2.0 };
    let err = glasma_initial_state::<2>(
        &bad_sim,
        &MvParams::default(),
        UnitarizerConfig::default(),
        NucleusSeeds::from_run(0),
    )
    .unwrap_err();
    assert!(matches!(err, GlasmaError::InvalidParameter(_)));

    let bad_mv = MvParams {
        m: f64::NAN,
        ..MvParams::default()
    };
    let seeds = NucleusSeeds::from_run(0);
    assert!(glasma_initial_state::<3>(&sim(4), &bad_mv, default_links(), seeds).is_err());
}
