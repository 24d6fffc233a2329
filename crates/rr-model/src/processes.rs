//! Right-hand side of the four-reservoir catchment ODE.

use crate::flux::flux;
use crate::params::ModelParams;
use rr_core::Real;

/// Percolation flux shape parameter, fixed (linear percolation curve).
pub const ALPHA_S: Real = 0.0;

/// Interception flux shape parameter, fixed.
pub const ALPHA_I: Real = 50.0;

/// Number of dynamic state components: four storages plus the
/// cumulative outflow `z`.
pub const N_STATES: usize = 5;

/// Evaluate the storage derivatives for state `(S_i, S_u, S_s, S_f)`.
///
/// The cumulative outflow `z` is accumulate-only and does not feed back
/// into any flux, so it is not part of the input. Instantaneous `precip`
/// and `evap` are the forcing values already resolved for this time.
///
/// Returns `(dS_i, dS_u, dS_s, dS_f, dz)`.
pub fn reservoir_rates(
    storages: &[Real; 4],
    precip: Real,
    evap: Real,
    p: &ModelParams,
) -> [Real; N_STATES] {
    let [s_i, s_u, s_s, s_f] = *storages;

    // Interception component
    let intercept_evap = evap * flux(s_i / p.i_max, ALPHA_I);
    let effect_precip = precip * flux(s_i / p.i_max, -ALPHA_I);

    // Unsaturated storage
    let unsat_evap = (evap - intercept_evap).max(0.0) * flux(s_u / p.s_umax, p.alpha_e);

    // Percolation and runoff
    let percolation = p.q_smax * flux(s_u / p.s_umax, ALPHA_S);
    let runoff = effect_precip * flux(s_u / p.s_umax, p.alpha_f);

    // Reservoir releases
    let slow_stream = s_s / p.k_s;
    let fast_stream = s_f / p.k_f;

    [
        precip - intercept_evap - effect_precip,
        effect_precip - unsat_evap - percolation - runoff,
        percolation - slow_stream,
        runoff - fast_stream,
        slow_stream + fast_stream,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ModelParams {
        ModelParams {
            i_max: 2.5,
            s_umax: 100.0,
            q_smax: 7.0,
            alpha_e: 1.0,
            alpha_f: -0.5,
            k_s: 60.0,
            k_f: 3.25,
        }
    }

    #[test]
    fn dry_catchment_is_exactly_static() {
        // Zero storages and zero precipitation: every derivative is
        // exactly zero, bit for bit.
        let rates = reservoir_rates(&[0.0; 4], 0.0, 1.0, &params());
        assert_eq!(rates, [0.0; 5]);
        assert!(rates[4] >= 0.0);
    }

    #[test]
    fn precipitation_enters_interception_exactly() {
        let rates = reservoir_rates(&[0.0; 4], 10.0, 1.0, &params());
        assert_eq!(rates[0], 10.0);
        assert!(rates[4] >= 0.0);
    }

    #[test]
    fn full_interception_passes_precipitation_through() {
        // With interception storage at capacity, all precipitation becomes
        // effective and lands in the unsaturated store.
        let rates = reservoir_rates(&[2.5, 0.0, 0.0, 0.0], 5.0, 1.0, &params());
        assert!((rates[1] - 5.0).abs() < 1e-12);
        assert!(rates[4] >= 0.0);
    }

    #[test]
    fn outflow_rate_is_nonnegative_for_nonnegative_storages() {
        let rates = reservoir_rates(&[0.5; 4], 5.0, 1.0, &params());
        assert!(rates[4] >= 0.0);
    }

    #[test]
    fn slower_slow_reservoir_releases_no_more() {
        let y = [0.5; 4];
        let mut fast = params();
        fast.k_s = 10.0;
        let mut slow = params();
        slow.k_s = 1000.0;

        let r_fast = reservoir_rates(&y, 5.0, 1.0, &fast);
        let r_slow = reservoir_rates(&y, 5.0, 1.0, &slow);
        // Larger K_s means a smaller release, so dS_s does not decrease.
        assert!(r_slow[2] >= r_fast[2]);
    }

    #[test]
    fn slower_fast_reservoir_releases_no_more() {
        let y = [0.5; 4];
        let mut fast = params();
        fast.k_f = 3.2;
        let mut slow = params();
        slow.k_f = 32.0;

        let r_fast = reservoir_rates(&y, 5.0, 1.0, &fast);
        let r_slow = reservoir_rates(&y, 5.0, 1.0, &slow);
        assert!(r_slow[3] >= r_fast[3]);
    }
}
