//! Lumped rainfall-runoff forward model (four-reservoir conceptual
//! catchment) for Bayesian parameter inference.
//!
//! Provides:
//! - saturation-excess flux function with a stable linear limit
//! - five-state reservoir ODE right-hand side
//! - daily forcing store with piecewise-constant ceiling lookup
//! - [`RiverModel`]: reusable `simulate(parameters, times)` forward model
//!   over the dual integration backends of `rr-solver`
//! - parallel population evaluation for inference workloads

pub mod error;
pub mod flux;
pub mod forcing;
pub mod params;
pub mod processes;
pub mod river;
pub mod sweep;

// Re-exports for public API
pub use error::{ModelError, ModelResult};
pub use flux::flux;
pub use forcing::ForcingStore;
pub use params::ModelParams;
pub use river::RiverModel;
pub use sweep::{PopulationSweep, simulate_population};
