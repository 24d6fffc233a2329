//! Trajectory type returned by integration backends.

use rr_core::Real;

/// Solution samples at the requested evaluation times.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    /// Evaluation times, in ascending order.
    pub t: Vec<Real>,
    /// State snapshots, one per evaluation time.
    pub y: Vec<Vec<Real>>,
}

impl Trajectory {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, t: Real, y: Vec<Real>) {
        self.t.push(t);
        self.y.push(y);
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Returns `true` if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Extract one state component across all samples.
    pub fn component(&self, idx: usize) -> Vec<Real> {
        self.y.iter().map(|row| row[idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_extraction() {
        let mut traj = Trajectory::with_capacity(2);
        traj.push(0.0, vec![1.0, 10.0]);
        traj.push(1.0, vec![2.0, 20.0]);
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.component(1), vec![10.0, 20.0]);
    }
}
