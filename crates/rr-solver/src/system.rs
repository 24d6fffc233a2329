//! OdeSystem trait for pluggable right-hand sides.

use rr_core::Real;

/// Right-hand side of an ODE system `dy/dt = f(t, y)`.
///
/// All backends consume the same buffer-writing callback shape: the RHS
/// writes derivatives into `dydt` instead of allocating a return value, so
/// one system definition drives both the explicit and the implicit solver.
pub trait OdeSystem {
    /// Number of state variables.
    fn ndim(&self) -> usize;

    /// Evaluate `f(t, y)` and write into `dydt`.
    ///
    /// `y` and `dydt` have length `ndim()`.
    fn rhs(&self, t: Real, y: &[Real], dydt: &mut [Real]);
}
