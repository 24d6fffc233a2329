//! Shared solver configuration.

use crate::error::{SolverError, SolverResult};
use rr_core::Real;

/// Configuration shared by all integration backends.
///
/// Both backends apply identical tolerance semantics: a step is accepted
/// when the scaled error norm `rms(err / (atol + rtol*|y|))` is at most 1.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverOptions {
    /// Relative tolerance (default: 1e-7).
    pub rtol: Real,
    /// Absolute tolerance (default: 1e-7).
    pub atol: Real,
    /// Initial step size. Set to 0.0 for automatic.
    pub h0: Real,
    /// Minimum step size.
    pub h_min: Real,
    /// Maximum number of steps (accepted or rejected).
    pub max_steps: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-7,
            atol: 1e-7,
            h0: 0.0,
            h_min: 1e-12,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    pub(crate) fn validate(&self) -> SolverResult<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(SolverError::InvalidSetup {
                what: "rtol must be finite and > 0".into(),
            });
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(SolverError::InvalidSetup {
                what: "atol must be finite and > 0".into(),
            });
        }
        if self.max_steps == 0 {
            return Err(SolverError::InvalidSetup {
                what: "max_steps must be > 0".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn initial_step(&self, span: Real) -> Real {
        if self.h0 > 0.0 {
            self.h0.min(span)
        } else {
            (span * 1e-3).max(self.h_min).min(span)
        }
    }

    /// Error scale for component `i`: `atol + rtol * max(|a|, |b|)`.
    pub(crate) fn scale(&self, a: Real, b: Real) -> Real {
        self.atol + self.rtol * a.abs().max(b.abs())
    }
}
