// SPDX-License-Identifier: AGPL-3.0-only

//! Pass/fail bookkeeping for the validation binary.
//!
//! Checks are recorded with the observed value and the bound they were held
//! to. [`ValidationHarness::finish`] prints the table, one JSON summary line,
//! and exits with 0 when everything passed and 1 otherwise.

use std::fmt::Write as _;
use std::process;

use serde::Serialize;

/// How a check compares the observed value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Comparison {
    /// `|observed − expected| < tolerance`
    Absolute,
    /// `|observed − expected| / |expected| < tolerance`
    Relative,
    /// `observed < bound`
    Below,
    /// `observed > bound`
    Above,
    /// `lower ≤ observed ≤ upper`
    Within,
    /// boolean condition
    Holds,
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Absolute => "abs",
            Self::Relative => "rel",
            Self::Below => "<",
            Self::Above => ">",
            Self::Within => "in",
            Self::Holds => "bool",
        };
        f.write_str(s)
    }
}

/// One recorded check.
#[derive(Clone, Debug, Serialize)]
pub struct Check {
    /// Label printed in the report.
    pub label: String,
    /// Whether it passed.
    pub passed: bool,
    /// Observed value.
    pub observed: f64,
    /// Expected value, bound, or lower end of a range.
    pub expected: f64,
    /// Tolerance, or upper end of a range.
    pub tolerance: f64,
    /// Comparison applied.
    pub comparison: Comparison,
}

/// Machine-readable outcome of a run.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationSummary<'a> {
    /// Binary name.
    pub name: &'a str,
    /// Checks passed.
    pub passed: usize,
    /// Checks recorded.
    pub total: usize,
    /// Labels of failed checks.
    pub failed: Vec<&'a str>,
}

/// Accumulates checks for one validation binary.
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationHarness {
    name: String,
    checks: Vec<Check>,
}

impl ValidationHarness {
    /// Empty harness for the binary `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn push(
        &mut self,
        label: &str,
        passed: bool,
        observed: f64,
        expected: f64,
        tolerance: f64,
        comparison: Comparison,
    ) {
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            observed,
            expected,
            tolerance,
            comparison,
        });
    }

    /// `|observed − expected| < tolerance`
    pub fn check_abs(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = (observed - expected).abs() < tolerance;
        self.push(label, passed, observed, expected, tolerance, Comparison::Absolute);
    }

    /// `|observed − expected| / |expected| < tolerance`, falling back to an
    /// absolute comparison when `expected` is zero.
    pub fn check_rel(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = if expected.abs() > f64::EPSILON {
            ((observed - expected) / expected).abs() < tolerance
        } else {
            observed.abs() < tolerance
        };
        self.push(label, passed, observed, expected, tolerance, Comparison::Relative);
    }

    /// `observed < bound`
    pub fn check_upper(&mut self, label: &str, observed: f64, bound: f64) {
        self.push(label, observed < bound, observed, bound, bound, Comparison::Below);
    }

    /// `observed > bound`
    pub fn check_lower(&mut self, label: &str, observed: f64, bound: f64) {
        self.push(label, observed > bound, observed, bound, bound, Comparison::Above);
    }

    /// `lower ≤ observed ≤ upper`
    pub fn check_range(&mut self, label: &str, observed: f64, lower: f64, upper: f64) {
        let passed = (lower..=upper).contains(&observed);
        self.push(label, passed, observed, lower, upper, Comparison::Within);
    }

    /// Boolean condition.
    pub fn check_bool(&mut self, label: &str, passed: bool) {
        self.push(label, passed, f64::from(u8::from(passed)), 1.0, 0.0, Comparison::Holds);
    }

    /// Checks recorded so far.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Number of passed checks.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Whether every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Summary for the JSON line.
    #[must_use]
    pub fn summary(&self) -> ValidationSummary<'_> {
        ValidationSummary {
            name: &self.name,
            passed: self.passed_count(),
            total: self.checks.len(),
            failed: self
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.label.as_str())
                .collect(),
        }
    }

    /// Human-readable report table.
    #[must_use]
    pub fn report(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {} validation: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.checks.len()
        );
        for c in &self.checks {
            let icon = if c.passed { "✓" } else { "✗" };
            let _ = match c.comparison {
                Comparison::Holds => writeln!(s, "  {icon} {}", c.label),
                Comparison::Within => writeln!(
                    s,
                    "  {icon} {}: observed={:.6e} in [{:.3e}, {:.3e}]",
                    c.label, c.observed, c.expected, c.tolerance
                ),
                _ => writeln!(
                    s,
                    "  {icon} {}: observed={:.6e}, expected={:.6e}, tol={:.2e} ({})",
                    c.label, c.observed, c.expected, c.tolerance, c.comparison
                ),
            };
        }
        s
    }

    /// Print the report and a JSON summary line, then exit with 0 when all
    /// checks passed and 1 otherwise.
    pub fn finish(&self) -> ! {
        println!();
        print!("{}", self.report());
        match serde_json::to_string(&self.summary()) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("summary serialization failed: {e}"),
        }
        if self.all_passed() {
            println!("ALL CHECKS PASSED");
            process::exit(0);
        }
        println!("FAILED CHECKS: {}", self.summary().failed.join(", "));
        process::exit(1);
    }
}
