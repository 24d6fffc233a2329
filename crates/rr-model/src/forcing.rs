//! Daily forcing store with piecewise-constant ceiling lookup.

use crate::error::{ModelError, ModelResult};
use rr_core::{Real, ensure_all_finite};
use std::collections::HashMap;

/// Precipitation and evaporation series keyed by integer day.
///
/// The store resolves a lookup for an arbitrary, possibly fractional,
/// solver-queried time by rounding up to the next day, so forcing is held
/// piecewise-constant over each day. The solver's internal substeps depend
/// on this stepwise contract for correctness of the physical model; it
/// must not be replaced with interpolation.
///
/// Immutable after construction, so independent evaluators can share a
/// store across threads.
#[derive(Clone, Debug)]
pub struct ForcingStore {
    times: Vec<Real>,
    precip_by_day: HashMap<i64, Real>,
    evap_by_day: HashMap<i64, Real>,
    first_time: Real,
    last_time: Real,
}

impl ForcingStore {
    /// Build the day-keyed maps by zipping `times` against each series.
    ///
    /// Times are keyed by the same `ceil` convention the lookups use, so a
    /// fractional construction time lands on the day its lookups resolve
    /// to. All three sequences must be non-empty, of equal length and
    /// finite. If a day appears more than once, the last value wins; this
    /// silent overwrite mirrors the tabular sources the store is fed from
    /// and is a documented caveat rather than an error.
    pub fn new(times: Vec<Real>, precip: Vec<Real>, evap: Vec<Real>) -> ModelResult<Self> {
        if times.is_empty() {
            return Err(ModelError::InvalidArg {
                what: "forcing series must not be empty".into(),
            });
        }
        if precip.len() != times.len() || evap.len() != times.len() {
            return Err(ModelError::InvalidArg {
                what: format!(
                    "forcing lengths differ: times={}, precip={}, evap={}",
                    times.len(),
                    precip.len(),
                    evap.len()
                ),
            });
        }
        ensure_all_finite(&times, "forcing times")?;
        ensure_all_finite(&precip, "precipitation")?;
        ensure_all_finite(&evap, "evaporation")?;

        let mut precip_by_day = HashMap::with_capacity(times.len());
        let mut evap_by_day = HashMap::with_capacity(times.len());
        for (i, &t) in times.iter().enumerate() {
            let day = t.ceil() as i64;
            precip_by_day.insert(day, precip[i]);
            evap_by_day.insert(day, evap[i]);
        }

        let first_time = times.iter().copied().fold(Real::INFINITY, Real::min);
        let last_time = times.iter().copied().fold(Real::NEG_INFINITY, Real::max);

        Ok(Self {
            times,
            precip_by_day,
            evap_by_day,
            first_time,
            last_time,
        })
    }

    /// Precipitation for the day containing `t` (rounded up); missing days
    /// read as no rain.
    pub fn precip_at(&self, t: Real) -> Real {
        self.precip_by_day
            .get(&(t.ceil() as i64))
            .copied()
            .unwrap_or(0.0)
    }

    /// Evaporation for the day containing `t` (rounded up); missing days
    /// read as no evaporation.
    pub fn evap_at(&self, t: Real) -> Real {
        self.evap_by_day
            .get(&(t.ceil() as i64))
            .copied()
            .unwrap_or(0.0)
    }

    /// Earliest forcing time.
    pub fn first_time(&self) -> Real {
        self.first_time
    }

    /// Latest forcing time.
    pub fn last_time(&self) -> Real {
        self.last_time
    }

    /// Whether the closed interval `[start, end]` lies inside the span of
    /// the stored forcing data.
    pub fn covers(&self, start: Real, end: Real) -> bool {
        start >= self.first_time && end <= self.last_time
    }

    /// Number of stored days.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if no days are stored (never, post-construction).
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store() -> ForcingStore {
        ForcingStore::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            vec![0.0, 10.0, 0.0, 20.0, 20.0, 0.0, 1.0],
            vec![3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 5.5],
        )
        .unwrap()
    }

    #[test]
    fn exact_day_lookup() {
        let s = store();
        assert_eq!(s.precip_at(1.0), 0.0);
        assert_eq!(s.evap_at(1.0), 3.0);
        assert_eq!(s.precip_at(7.0), 1.0);
        assert_eq!(s.evap_at(7.0), 5.5);
    }

    #[test]
    fn fractional_times_round_up() {
        let s = store();
        // Solver substeps inside day 4 read day 4's values.
        assert_eq!(s.precip_at(3.25), 20.0);
        assert_eq!(s.evap_at(3.999), 4.5);
    }

    #[test]
    fn missing_days_read_as_zero() {
        let s = store();
        assert_eq!(s.precip_at(42.0), 0.0);
        assert_eq!(s.evap_at(-5.0), 0.0);
        assert_eq!(s.precip_at(0.5), 0.0);
    }

    #[test]
    fn fractional_construction_times_use_the_lookup_convention() {
        // A series timestamped mid-day must be found by lookups in the
        // same day, so construction and lookup share the ceil keying.
        let s = ForcingStore::new(vec![0.5, 1.5], vec![4.0, 9.0], vec![1.0, 2.0]).unwrap();
        assert_eq!(s.precip_at(0.5), 4.0);
        assert_eq!(s.precip_at(0.25), 4.0);
        assert_eq!(s.evap_at(1.5), 2.0);
        assert_eq!(s.evap_at(1.1), 2.0);
        // Day 1 itself belongs to the first entry's key.
        assert_eq!(s.precip_at(1.0), 4.0);
    }

    #[test]
    fn duplicate_days_last_value_wins() {
        let s = ForcingStore::new(
            vec![1.0, 1.0, 2.0],
            vec![3.0, 7.0, 0.0],
            vec![1.0, 2.0, 0.0],
        )
        .unwrap();
        assert_eq!(s.precip_at(1.0), 7.0);
        assert_eq!(s.evap_at(1.0), 2.0);
    }

    #[test]
    fn span_queries() {
        let s = store();
        assert_eq!(s.first_time(), 1.0);
        assert_eq!(s.last_time(), 7.0);
        assert!(s.covers(4.0, 6.0));
        assert!(!s.covers(4.0, 12.0));
        assert!(!s.covers(0.0, 6.0));
    }

    #[test]
    fn rejects_invalid_series() {
        assert!(ForcingStore::new(vec![], vec![], vec![]).is_err());
        assert!(ForcingStore::new(vec![1.0, 2.0], vec![0.0], vec![0.0, 0.0]).is_err());
        assert!(
            ForcingStore::new(vec![1.0], vec![Real::NAN], vec![0.0]).is_err()
        );
    }

    proptest! {
        #[test]
        fn lookup_is_constant_within_a_day(frac in 0.0001f64..0.9999) {
            let s = store();
            // Any substep in (3, 4] resolves to day 4.
            prop_assert_eq!(s.precip_at(3.0 + frac), s.precip_at(4.0));
            prop_assert_eq!(s.evap_at(3.0 + frac), s.evap_at(4.0));
        }
    }
}
