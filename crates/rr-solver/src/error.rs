//! Error types for integration backends.

use thiserror::Error;

/// Errors that can occur while driving an ODE integration.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid solver setup: {what}")]
    InvalidSetup { what: String },

    #[error("State dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Exceeded max_steps={max_steps} at t={t:.6e} before reaching t_end={t_end:.6e}")]
    MaxStepsExceeded { max_steps: usize, t: f64, t_end: f64 },

    #[error("Newton iteration failed to converge at t={t:.6e}")]
    NewtonFailed { t: f64 },

    #[error("Singular iteration matrix at t={t:.6e}")]
    SingularMatrix { t: f64 },
}

pub type SolverResult<T> = Result<T, SolverError>;
