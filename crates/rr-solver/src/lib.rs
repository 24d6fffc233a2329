//! Adaptive ODE integration backends for lumped dynamic models.
//!
//! Provides:
//! - [`OdeSystem`] trait with a buffer-writing RHS callback `dy/dt = f(t, y)`
//! - [`IntegrationBackend`] capability contract shared by all solvers
//! - [`Rk23`]: explicit Bogacki-Shampine 2(3) pair with dense output
//! - [`Bdf`]: implicit variable-step BDF (orders 1-2) with Newton iteration
//! - [`SolverCapabilities`] probe for backend selection at configuration time

pub mod backend;
pub mod bdf;
pub mod error;
pub mod options;
pub mod rk23;
pub mod system;
pub mod trajectory;

// Re-exports for public API
pub use backend::{BackendKind, IntegrationBackend, SolverCapabilities};
pub use bdf::Bdf;
pub use error::{SolverError, SolverResult};
pub use options::SolverOptions;
pub use rk23::Rk23;
pub use system::OdeSystem;
pub use trajectory::Trajectory;
