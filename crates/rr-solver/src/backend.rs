//! Backend selection and the shared integration contract.

use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::system::OdeSystem;
use crate::trajectory::Trajectory;
use crate::{Bdf, Rk23};
use rr_core::Real;

/// Integration strategy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendKind {
    /// Adaptive explicit Runge-Kutta 2(3) pair (default, non-stiff systems).
    #[default]
    ExplicitRk23,
    /// Implicit variable-step BDF (stiff systems).
    ImplicitBdf,
}

impl BackendKind {
    /// Instantiate the backend for this variant.
    pub fn backend(self) -> Box<dyn IntegrationBackend + Send + Sync> {
        match self {
            BackendKind::ExplicitRk23 => Box::new(Rk23),
            BackendKind::ImplicitBdf => Box::new(Bdf::default()),
        }
    }
}

/// Which integration backends are usable in this build.
///
/// Probed once at startup and injected into downstream configuration, so
/// that an unsupported selection fails eagerly at construction time rather
/// than in the middle of a long evaluation loop.
#[derive(Clone, Copy, Debug)]
pub struct SolverCapabilities {
    pub explicit_rk23: bool,
    pub implicit_bdf: bool,
}

impl SolverCapabilities {
    /// Probe the backends compiled into this build.
    pub fn detect() -> Self {
        Self {
            explicit_rk23: true,
            implicit_bdf: true,
        }
    }

    pub fn supports(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::ExplicitRk23 => self.explicit_rk23,
            BackendKind::ImplicitBdf => self.implicit_bdf,
        }
    }
}

/// Capability contract shared by all integration backends.
///
/// `integrate` solves `dy/dt = f(t, y)` from `y0` over `t_span` and returns
/// the solution sampled at `t_eval`, which must be ascending and contained
/// in `t_span`.
pub trait IntegrationBackend {
    fn integrate(
        &self,
        system: &dyn OdeSystem,
        t_span: (Real, Real),
        y0: &[Real],
        t_eval: &[Real],
        opts: &SolverOptions,
    ) -> SolverResult<Trajectory>;
}

/// Validation shared by both backends before stepping starts.
pub(crate) fn check_problem(
    system: &dyn OdeSystem,
    t_span: (Real, Real),
    y0: &[Real],
    t_eval: &[Real],
    opts: &SolverOptions,
) -> SolverResult<()> {
    opts.validate()?;

    let n = system.ndim();
    if y0.len() != n {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            got: y0.len(),
        });
    }

    let (t0, t1) = t_span;
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(SolverError::InvalidSetup {
            what: format!("t_span must be finite with t1 >= t0, got ({t0}, {t1})"),
        });
    }

    let mut prev = Real::NEG_INFINITY;
    for &te in t_eval {
        if !te.is_finite() || te < t0 || te > t1 {
            return Err(SolverError::InvalidSetup {
                what: format!("t_eval point {te} outside t_span ({t0}, {t1})"),
            });
        }
        if te < prev {
            return Err(SolverError::InvalidSetup {
                what: "t_eval must be ascending".into(),
            });
        }
        prev = te;
    }

    Ok(())
}
