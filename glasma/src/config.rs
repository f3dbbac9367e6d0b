// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation and MV-model parameters.
//!
//! Lattice-unit parameters ([`SimulationParams`], [`MvParams`]) drive the
//! generator and the builder directly. [`CollisionParams`] is the physical
//! front end: it derives the MV parameters of a nucleus-nucleus collision
//! from its mass number and energy, then converts them to lattice units with
//! `E0 = N ħc / L`.
//!
//! # Physical parametrization
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | Saturation momentum | `Q_s = √(0.13 A^(1/3) √s^(1/4))` GeV |
//! | Running coupling | `g = π / √ln(Q_s / 0.2 GeV)` |
//! | MV source strength | `μ = Q_s / (g² · Q_s/g²μ)` |
//! | IR regulator | `m = 0.1 g² μ` |
//!
//! # References
//!
//! - McLerran & Venugopalan, PRD 49, 2233 (1994)
//! - Lappi, EPJ C 55, 285 (2008): sheet count and `Q_s/g²μ` ratio

use serde::{Deserialize, Serialize};

use crate::error::GlasmaError;

/// ħc in GeV·fm.
pub const HBAR_C_GEV_FM: f64 = 0.197_326;

/// Lambda_QCD scale in the running coupling, GeV.
const RUNNING_COUPLING_SCALE_GEV: f64 = 0.2;

/// IR regulator as a fraction of g²μ.
const IR_MASS_FRACTION: f64 = 0.1;

/// Lattice size, time step and coupling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct SimulationParams {
    /// Transverse sites per direction.
    pub n: usize,
    /// Time step in units of the lattice spacing.
    pub dt: f64,
    /// Gauge coupling g.
    pub g: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            n: 64,
            dt: 0.125,
            g: 2.0,
        }
    }
}

impl SimulationParams {
    /// Reject non-physical values.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] for `n = 0`, a non-positive or
    /// non-finite `dt`, or a non-finite `g`.
    pub fn validate(&self) -> Result<(), GlasmaError> {
        if self.n == 0 {
            return Err(GlasmaError::InvalidParameter(
                "lattice size n must be positive".into(),
            ));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(GlasmaError::InvalidParameter(format!(
                "time step dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !self.g.is_finite() {
            return Err(GlasmaError::InvalidParameter(format!(
                "coupling g must be finite, got {}",
                self.g
            )));
        }
        Ok(())
    }
}

/// Which generators receive random color charge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Every generator of su(N).
    #[default]
    Full,
    /// Only the first three generators, i.e. the SU(2) subgroup acting on
    /// colors 0 and 1. For N = 2 this is the same as `Full`.
    Su2Subgroup,
}

/// MV-model source parameters in lattice units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct MvParams {
    /// Source strength μ.
    pub mu: f64,
    /// Infrared regulator mass m.
    pub m: f64,
    /// Ultraviolet momentum cutoff.
    pub uv: f64,
    /// Number of color sheets along the longitudinal direction.
    pub num_sheets: usize,
    /// Generators carrying charge.
    pub color_mode: ColorMode,
}

impl Default for MvParams {
    fn default() -> Self {
        Self {
            mu: 0.05,
            m: 0.02,
            uv: 10.0,
            num_sheets: 1,
            color_mode: ColorMode::Full,
        }
    }
}

impl MvParams {
    /// Reject non-physical values.
    ///
    /// `m = 0` is allowed: the zero mode is always masked, so the kernel
    /// stays finite. Any finite `uv` is allowed; `uv ≤ 0` leaves the kernel
    /// without support and the Wilson lines at unity.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] for a negative or non-finite μ or m,
    /// a non-finite uv, or zero sheets.
    pub fn validate(&self) -> Result<(), GlasmaError> {
        for (name, v) in [("mu", self.mu), ("m", self.m)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(GlasmaError::InvalidParameter(format!(
                    "{name} must be non-negative and finite, got {v}"
                )));
            }
        }
        if !self.uv.is_finite() {
            return Err(GlasmaError::InvalidParameter(format!(
                "uv must be finite, got {}",
                self.uv
            )));
        }
        if self.num_sheets == 0 {
            return Err(GlasmaError::InvalidParameter(
                "num_sheets must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Physical description of a symmetric nucleus-nucleus collision.
///
/// Defaults are Pb-Pb at √s = 5.02 TeV on a 10 fm box with 512² sites.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct CollisionParams {
    /// Nuclear mass number A.
    pub mass_number: f64,
    /// Center-of-mass energy per nucleon pair, GeV.
    pub sqrt_s_gev: f64,
    /// Number of color sheets.
    pub num_sheets: usize,
    /// Ratio `Q_s / g²μ` appropriate for `num_sheets`.
    pub qs_over_g2mu: f64,
    /// Transverse box length, fm.
    pub box_size_fm: f64,
    /// Transverse sites per direction.
    pub lattice_sites: usize,
    /// UV regulator, GeV.
    pub uv_gev: f64,
    /// Time steps per lattice spacing.
    pub steps_per_spacing: usize,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            mass_number: 207.0,
            sqrt_s_gev: 5020.0,
            num_sheets: 50,
            qs_over_g2mu: 0.8,
            box_size_fm: 10.0,
            lattice_sites: 512,
            uv_gev: 10.0,
            steps_per_spacing: 8,
        }
    }
}

impl CollisionParams {
    /// Saturation momentum `Q_s` in GeV.
    #[must_use]
    pub fn saturation_momentum(&self) -> f64 {
        (0.13 * self.mass_number.cbrt() * self.sqrt_s_gev.powf(0.25)).sqrt()
    }

    /// Running coupling evaluated at `Q_s`.
    #[must_use]
    pub fn coupling(&self) -> f64 {
        let log = (self.saturation_momentum() / RUNNING_COUPLING_SCALE_GEV).ln();
        std::f64::consts::PI * (1.0 / log).sqrt()
    }

    /// MV source strength μ in GeV.
    #[must_use]
    pub fn mu_gev(&self) -> f64 {
        let g = self.coupling();
        self.saturation_momentum() / (g * g * self.qs_over_g2mu)
    }

    /// IR regulator m in GeV.
    #[must_use]
    pub fn ir_mass_gev(&self) -> f64 {
        let g = self.coupling();
        IR_MASS_FRACTION * g * g * self.mu_gev()
    }

    /// Lattice energy unit `E0 = N ħc / L` in GeV (inverse lattice spacing).
    #[must_use]
    pub fn lattice_energy_gev(&self) -> f64 {
        self.lattice_sites as f64 / self.box_size_fm * HBAR_C_GEV_FM
    }

    /// Lattice spacing in fm.
    #[must_use]
    pub fn lattice_spacing_fm(&self) -> f64 {
        self.box_size_fm / self.lattice_sites as f64
    }

    /// Lattice size, time step `1/steps_per_spacing` and running coupling.
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] when the physical inputs do not
    /// produce a valid lattice.
    pub fn simulation_params(&self) -> Result<SimulationParams, GlasmaError> {
        self.validate()?;
        let params = SimulationParams {
            n: self.lattice_sites,
            dt: 1.0 / self.steps_per_spacing as f64,
            g: self.coupling(),
        };
        params.validate()?;
        Ok(params)
    }

    /// MV parameters in lattice units (`μ/E0`, `m/E0`, `uv/E0`).
    ///
    /// # Errors
    ///
    /// [`GlasmaError::InvalidParameter`] when the physical inputs do not
    /// produce valid MV parameters.
    pub fn mv_params(&self, color_mode: ColorMode) -> Result<MvParams, GlasmaError> {
        self.validate()?;
        let e0 = self.lattice_energy_gev();
        let params = MvParams {
            mu: self.mu_gev() / e0,
            m: self.ir_mass_gev() / e0,
            uv: self.uv_gev / e0,
            num_sheets: self.num_sheets,
            color_mode,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), GlasmaError> {
        let positive = [
            ("mass_number", self.mass_number),
            ("sqrt_s_gev", self.sqrt_s_gev),
            ("qs_over_g2mu", self.qs_over_g2mu),
            ("box_size_fm", self.box_size_fm),
            ("uv_gev", self.uv_gev),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(GlasmaError::InvalidParameter(format!(
                    "{name} must be positive and finite, got {v}"
                )));
            }
        }
        if self.lattice_sites == 0 || self.steps_per_spacing == 0 {
            return Err(GlasmaError::InvalidParameter(
                "lattice_sites and steps_per_spacing must be positive".into(),
            ));
        }
        if self.saturation_momentum() <= RUNNING_COUPLING_SCALE_GEV {
            return Err(GlasmaError::InvalidParameter(format!(
                "saturation momentum {:.4} GeV is below the running-coupling scale",
                self.saturation_momentum()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimulationParams::default().validate().is_ok());
        assert!(MvParams::default().validate().is_ok());
        assert_eq!(MvParams::default().color_mode, ColorMode::Full);
    }

    #[test]
    fn zero_lattice_rejected() {
        let p = SimulationParams {
            n: 0,
            ..SimulationParams::default()
        };
        assert!(matches!(p.validate(), Err(GlasmaError::InvalidParameter(_))));
    }

    #[test]
    fn bad_dt_rejected() {
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let p = SimulationParams {
                dt,
                ..SimulationParams::default()
            };
            assert!(p.validate().is_err(), "dt = {dt} accepted");
        }
    }

    #[test]
    fn mv_validation() {
        let ok = MvParams {
            m: 0.0,
            mu: 0.0,
            ..MvParams::default()
        };
        assert!(ok.validate().is_ok());
        let neg_cutoff = MvParams {
            uv: -1.0,
            ..MvParams::default()
        };
        assert!(neg_cutoff.validate().is_ok());
        let inf = MvParams {
            uv: f64::INFINITY,
            ..MvParams::default()
        };
        let err = inf.validate().unwrap_err();
        assert!(err.to_string().contains("uv"));
        let none = MvParams {
            num_sheets: 0,
            ..MvParams::default()
        };
        assert!(none.validate().is_err());
    }

    #[test]
    fn lead_lead_parameters() {
        let c = CollisionParams::default();
        let qs = c.saturation_momentum();
        // √(0.13 · 207^(1/3) · 5020^(1/4)) ≈ 2.544 GeV
        assert!((qs - 2.544_22).abs() < 1e-4, "Q_s = {qs}");
        let g = c.coupling();
        assert!((g - 1.969_95).abs() < 1e-4, "g = {g}");
        let g2mu = g * g * c.mu_gev();
        assert!((g2mu * c.qs_over_g2mu - qs).abs() < 1e-12);
        assert!((c.ir_mass_gev() - 0.1 * g2mu).abs() < 1e-12);
        // 512 / 10 fm · ħc
        assert!((c.lattice_energy_gev() - 10.103_091_2).abs() < 1e-6);
    }

    #[test]
    fn lattice_units() {
        let c = CollisionParams::default();
        let mv = c.mv_params(ColorMode::Full).unwrap();
        let e0 = c.lattice_energy_gev();
        assert!((mv.mu * e0 - c.mu_gev()).abs() < 1e-12);
        assert!((mv.uv - 10.0 / e0).abs() < 1e-12);
        assert_eq!(mv.num_sheets, 50);
        let sim = c.simulation_params().unwrap();
        assert_eq!(sim.n, 512);
        assert!((sim.dt - 0.125).abs() < 1e-15);
        assert!((c.lattice_spacing_fm() * e0 - HBAR_C_GEV_FM).abs() < 1e-12);
    }

    #[test]
    fn low_energy_collision_rejected() {
        let c = CollisionParams {
            mass_number: 1.0,
            sqrt_s_gev: 1e-4,
            ..CollisionParams::default()
        };
        assert!(c.mv_params(ColorMode::Full).is_err());
    }

    #[test]
    fn params_serialize() {
        let json = serde_json::to_string(&MvParams::default()).unwrap();
        assert!(json.contains("\"color_mode\":\"Full\""));
        let back: MvParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MvParams::default());
    }
}
