//! Saturation-excess flux function shared by every reservoir transfer term.

use rr_core::Real;

/// Shape parameters with magnitude at or below this use the linear limit.
const LINEAR_LIMIT: Real = 1e-6;

/// Upper cap on the argument passed to `exp`, preventing overflow when an
/// inference algorithm proposes extreme shape parameters.
const EXP_ARG_CAP: Real = 600.0;

/// Relative flux through a reservoir as a function of relative storage `s`
/// and shape parameter `a`:
///
/// `f(s, a) = (1 - exp(-a*s)) / (1 - exp(-a))`
///
/// For `|a| <= 1e-6` the curve degenerates towards the identity and the
/// closed form is numerically unstable, so `s` is returned directly. The
/// exponent cap is one-sided: only large positive `-a*s` or `-a` are
/// truncated, which is exactly where `exp` would overflow.
pub fn flux(s: Real, a: Real) -> Real {
    if a.abs() <= LINEAR_LIMIT {
        return s;
    }
    (1.0 - (-a * s).min(EXP_ARG_CAP).exp()) / (1.0 - (-a).min(EXP_ARG_CAP).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn closed_form_at_moderate_shape() {
        let a: Real = 2.0;
        let s: Real = 0.5;
        let expected = (1.0 - (-a * s).exp()) / (1.0 - (-a).exp());
        assert!((flux(s, a) - expected).abs() < 1e-12);
    }

    #[test]
    fn linear_limit_is_exact() {
        assert_eq!(flux(0.5, 1e-20), 0.5);
        assert_eq!(flux(0.5, 0.0), 0.5);
        assert_eq!(flux(-0.3, -1e-7), -0.3);
        assert_eq!(flux(2.0, 1e-6), 2.0);
    }

    #[test]
    fn zero_storage_gives_zero_flux() {
        assert_eq!(flux(0.0, 50.0), 0.0);
        assert_eq!(flux(0.0, -50.0), 0.0);
        assert_eq!(flux(0.0, 0.3), 0.0);
    }

    #[test]
    fn full_storage_gives_unit_flux() {
        // Numerator and denominator coincide at s = 1.
        assert_eq!(flux(1.0, 50.0), 1.0);
        assert_eq!(flux(1.0, -0.5), 1.0);
    }

    #[test]
    fn extreme_shapes_do_not_overflow() {
        assert!(flux(1.0, -1e6).is_finite());
        assert!(flux(-1e3, 1e3).is_finite());
        assert!(flux(5.0, -700.0).is_finite());
    }

    proptest! {
        #[test]
        fn finite_over_wide_ranges(s in -1e3f64..1e3, a in -1e4f64..1e4) {
            prop_assert!(flux(s, a).is_finite());
        }

        #[test]
        fn zero_storage_always_zero(a in prop_oneof![-1e4f64..-1e-5, 1e-5f64..1e4]) {
            prop_assert_eq!(flux(0.0, a), 0.0);
        }
    }
}
