// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for Glasma initialization.
//!
//! Only malformed inputs are fatal. Solver trouble (non-convergence, group
//! fallback, empty screening kernels) is reported through
//! [`InitEvent`](crate::initial::InitEvent) values instead.

use std::fmt;

/// Errors arising from invalid parameters or mismatched field arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum GlasmaError {
    /// A simulation or MV parameter is outside its valid range.
    InvalidParameter(String),

    /// A field array does not match the lattice it is used with.
    FieldSize {
        /// Which array was checked.
        what: &'static str,
        /// Length required by the lattice.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },
}

impl fmt::Display for GlasmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            Self::FieldSize {
                what,
                expected,
                found,
            } => write!(
                f,
                "Field size mismatch for {what}: expected {expected} entries, found {found}"
            ),
        }
    }
}

impl std::error::Error for GlasmaError {}

/// Reject a length mismatch between a field array and its lattice.
pub(crate) fn check_len(
    what: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), GlasmaError> {
    if expected == found {
        Ok(())
    } else {
        Err(GlasmaError::FieldSize {
            what,
            expected,
            found,
        })
    }
}
