use crate::RrError;

/// Floating point type used throughout the workspace
pub type Real = f64;

/// Absolute/relative tolerance pair for comparing simulated series.
///
/// The defaults are for comparison in tests and diagnostics; solver step
/// control carries its own tolerances in its options.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Tolerance pair with the same absolute and relative component.
    pub fn uniform(tol: Real) -> Self {
        Self { abs: tol, rel: tol }
    }

    /// Whether `a` and `b` agree within this tolerance.
    pub fn admits(&self, a: Real, b: Real) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }

    /// Whether two series agree pairwise and have equal length.
    pub fn admits_all(&self, a: &[Real], b: &[Real]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| self.admits(x, y))
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, RrError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RrError::NonFinite { what, value: v })
    }
}

/// Ensure every element of a slice is finite.
pub fn ensure_all_finite(vs: &[Real], what: &'static str) -> Result<(), RrError> {
    for &v in vs {
        ensure_finite(v, what)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn admits_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(tol.admits(1.0, 1.0 + 1e-12));
        assert!(tol.admits(0.0, 1e-13));
        assert!(!tol.admits(1.0, 1.0 + 1e-6));
    }

    #[test]
    fn admits_all_requires_equal_lengths() {
        let tol = Tolerances::uniform(1e-9);
        assert!(tol.admits_all(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(!tol.admits_all(&[1.0, 2.0], &[1.0]));
        assert!(!tol.admits_all(&[1.0, 2.0], &[1.0, 2.1]));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_detects_inf() {
        assert!(ensure_all_finite(&[0.0, 1.0, Real::INFINITY], "series").is_err());
        assert!(ensure_all_finite(&[0.0, 1.0, 2.0], "series").is_ok());
    }

    proptest! {
        #[test]
        fn admits_is_reflexive(x in -1e12f64..1e12) {
            prop_assert!(Tolerances::default().admits(x, x));
        }
    }
}
