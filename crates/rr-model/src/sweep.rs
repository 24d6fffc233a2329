//! Parallel evaluation of a population of parameter vectors.
//!
//! Population-based optimizers and multi-chain MCMC launch many
//! independent `simulate` calls; the model is stateless across calls, so
//! the population is embarrassingly parallel over a read-only-shared
//! forcing store.

use crate::error::ModelResult;
use crate::river::RiverModel;
use rayon::prelude::*;
use rr_core::Real;

/// Result of evaluating a population of parameter vectors.
#[derive(Clone, Debug)]
pub struct PopulationSweep {
    /// One streamflow series per population member, in input order.
    /// Rejected (non-converged) members are NaN-filled.
    pub outputs: Vec<Vec<Real>>,
    /// Number of members rejected by the solver.
    pub num_rejected: usize,
}

impl PopulationSweep {
    /// Number of members that produced a finite series.
    pub fn num_successful(&self) -> usize {
        self.outputs.len() - self.num_rejected
    }
}

/// Evaluate `simulate` for every parameter vector in `population`.
///
/// Hard errors (wrong parameter count, times outside the forcing span)
/// abort the sweep; soft numerical failures stay NaN-filled rows and are
/// only counted.
pub fn simulate_population(
    model: &RiverModel,
    population: &[Vec<Real>],
    times: &[Real],
) -> ModelResult<PopulationSweep> {
    let outputs: Vec<Vec<Real>> = population
        .par_iter()
        .map(|parameters| model.simulate(parameters, times))
        .collect::<ModelResult<_>>()?;

    let num_rejected = outputs
        .iter()
        .filter(|row| row.iter().any(|v| v.is_nan()))
        .count();

    Ok(PopulationSweep {
        outputs,
        num_rejected,
    })
}
