//! Error types for the forward model.

use rr_core::RrError;
use thiserror::Error;

/// Errors surfaced by model construction and simulation.
///
/// Numerical failure during integration is deliberately not represented
/// here: a failed solve is reported as NaN-filled output so that a
/// statistical caller can reject the parameter point through its
/// likelihood instead of aborting a long-running sampling loop.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Simulation data are not available for the requested times: {what}")]
    DataUnavailable { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Numeric error: {0}")]
    Core(#[from] RrError),
}

pub type ModelResult<T> = Result<T, ModelError>;
