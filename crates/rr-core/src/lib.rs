//! rr-core: stable foundation for the rainfall-runoff workspace.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{RrError, RrResult};
pub use numeric::*;
