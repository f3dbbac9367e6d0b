// SPDX-License-Identifier: AGPL-3.0-only

//! Boost-invariant Glasma initial conditions in the McLerran-Venugopalan model.
//!
//! Two nuclei are modeled as Wilson-line fields built from random color
//! sheets. Their pure-gauge transverse fields are combined into the τ = 0
//! links and longitudinal fields of the Glasma on a periodic transverse
//! lattice.
//!
//! ## Pipeline
//!   - `mv`: Gaussian color charges, screened Poisson solve, Wilson lines
//!   - `unitarize`: link matching condition `ah(A (I + B)†) = 0`
//!   - `initial`: transverse links, momenta and longitudinal fields at τ = 0
//!   - `observables`: `E_z`, `B_z` and their transverse correlators
//!
//! ## Support
//!   - `lattice`: indexing, SU(N) matrices, algebra, FFT, field storage
//!   - `config`: lattice-unit and physical-unit parameters
//!   - `error`: fatal errors for invalid inputs
//!   - `tolerances`: numerical thresholds with their rationale
//!   - `validation`: pass/fail harness for `validate_glasma_init`
//!
//! ## Example
//!
//! ```no_run
//! use glasma::config::{CollisionParams, ColorMode};
//! use glasma::initial::{glasma_initial_state, NucleusSeeds};
//! use glasma::unitarize::UnitarizerConfig;
//!
//! # fn main() -> Result<(), glasma::error::GlasmaError> {
//! let collision = CollisionParams::default();
//! let sim = collision.simulation_params()?;
//! let mv = collision.mv_params(ColorMode::Full)?;
//! let config = UnitarizerConfig::default();
//! let (fields, report) = glasma_initial_state::<3>(&sim, &mv, config, NucleusSeeds::from_run(1))?;
//! println!("E_L = {:.4e}, {} links", report.electric_energy, fields.u0.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod initial;
pub mod lattice;
pub mod mv;
pub mod observables;
pub mod tolerances;
pub mod unitarize;
pub mod validation;
