//! Model parameter vector.

use crate::error::{ModelError, ModelResult};
use rr_core::Real;

/// The seven tunable parameters of the four-reservoir catchment model,
/// in the order expected by the forward-model interface.
///
/// Positivity of `i_max`, `s_umax`, `k_s` and `k_f` is a caller contract:
/// the right-hand side divides by them without a runtime check, matching
/// the behavior expected by inference priors that bound these below.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParams {
    /// Maximum interception storage `I_max`.
    pub i_max: Real,
    /// Unsaturated storage capacity `S_u,max`.
    pub s_umax: Real,
    /// Maximum percolation rate `Q_s,max`.
    pub q_smax: Real,
    /// Evaporation flux shape parameter `alpha_e`.
    pub alpha_e: Real,
    /// Runoff flux shape parameter `alpha_f`.
    pub alpha_f: Real,
    /// Slow reservoir time constant `K_s`.
    pub k_s: Real,
    /// Fast reservoir time constant `K_f`.
    pub k_f: Real,
}

impl ModelParams {
    /// Number of tunable parameters.
    pub const N_PARAMETERS: usize = 7;

    /// Build from the flat slice used by the inference interface.
    pub fn from_slice(parameters: &[Real]) -> ModelResult<Self> {
        if parameters.len() != Self::N_PARAMETERS {
            return Err(ModelError::InvalidArg {
                what: format!(
                    "expected {} parameters, got {}",
                    Self::N_PARAMETERS,
                    parameters.len()
                ),
            });
        }
        Ok(Self {
            i_max: parameters[0],
            s_umax: parameters[1],
            q_smax: parameters[2],
            alpha_e: parameters[3],
            alpha_f: parameters[4],
            k_s: parameters[5],
            k_f: parameters[6],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_maps_in_order() {
        let p = ModelParams::from_slice(&[2.5, 100.0, 7.0, 1.0, -0.5, 60.0, 3.25]).unwrap();
        assert_eq!(p.i_max, 2.5);
        assert_eq!(p.s_umax, 100.0);
        assert_eq!(p.q_smax, 7.0);
        assert_eq!(p.alpha_e, 1.0);
        assert_eq!(p.alpha_f, -0.5);
        assert_eq!(p.k_s, 60.0);
        assert_eq!(p.k_f, 3.25);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ModelParams::from_slice(&[1.0, 2.0]).is_err());
        assert!(ModelParams::from_slice(&[0.0; 8]).is_err());
    }
}
