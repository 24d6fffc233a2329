//! Implicit variable-step BDF backend (orders 1-2) with Newton iteration.

use crate::backend::{IntegrationBackend, check_problem};
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::system::OdeSystem;
use crate::trajectory::Trajectory;
use nalgebra::{DMatrix, DVector};
use rr_core::Real;

/// Convergence threshold for the scaled Newton update norm.
const NEWTON_TOL: Real = 0.01;

/// Implicit multistep backend: backward Euler on the first step, then
/// variable-step BDF2. Each step lands exactly on the next requested
/// evaluation time, so no interpolation is needed for output.
///
/// The nonlinear stage equation is solved by Newton iteration with a
/// finite-difference Jacobian, factored once per step via LU.
#[derive(Clone, Copy, Debug)]
pub struct Bdf {
    /// Maximum Newton iterations per step.
    pub max_newton: usize,
}

impl Default for Bdf {
    fn default() -> Self {
        Self { max_newton: 10 }
    }
}

impl IntegrationBackend for Bdf {
    fn integrate(
        &self,
        system: &dyn OdeSystem,
        t_span: (Real, Real),
        y0: &[Real],
        t_eval: &[Real],
        opts: &SolverOptions,
    ) -> SolverResult<Trajectory> {
        check_problem(system, t_span, y0, t_eval, opts)?;

        let n = system.ndim();
        let (t0, t1) = t_span;

        let mut traj = Trajectory::with_capacity(t_eval.len());
        let mut idx = 0;
        while idx < t_eval.len() && t_eval[idx] <= t0 {
            traj.push(t_eval[idx], y0.to_vec());
            idx += 1;
        }
        if idx == t_eval.len() {
            return Ok(traj);
        }

        let mut t = t0;
        let mut y = y0.to_vec();
        // Previous accepted point, present once the first step is taken.
        let mut prev: Option<(Real, Vec<Real>)> = None;
        let mut h = opts.initial_step(t1 - t0);

        let mut f_buf = vec![0.0; n];

        for _step in 0..opts.max_steps {
            if idx == t_eval.len() {
                break;
            }

            // Cap the step so it lands exactly on the next evaluation time.
            let target = t_eval[idx];
            let mut h_step = h.min(t1 - t).max(opts.h_min);
            let t_new;
            if t + h_step >= target - 1e-12 * (1.0 + target.abs()) {
                h_step = target - t;
                t_new = target;
            } else {
                t_new = t + h_step;
            }

            // Predictor: linear extrapolation through the history, or an
            // explicit Euler step when no history exists yet.
            let y_pred: Vec<Real> = match &prev {
                Some((tp, yp)) => {
                    let rho = h_step / (t - tp);
                    y.iter()
                        .zip(yp)
                        .map(|(&yc, &yo)| yc + rho * (yc - yo))
                        .collect()
                }
                None => {
                    system.rhs(t, &y, &mut f_buf);
                    y.iter().zip(&f_buf).map(|(&yc, &f)| yc + h_step * f).collect()
                }
            };

            // Stage equation y_new = psi + c * f(t_new, y_new):
            // backward Euler, or variable-step BDF2 once history exists.
            let (order, c, psi): (u32, Real, Vec<Real>) = match &prev {
                None => (1, h_step, y.clone()),
                Some((tp, yp)) => {
                    let rho = h_step / (t - tp);
                    let denom = 1.0 + 2.0 * rho;
                    let c = h_step * (1.0 + rho) / denom;
                    let psi = y
                        .iter()
                        .zip(yp)
                        .map(|(&yc, &yo)| {
                            ((1.0 + rho) * (1.0 + rho) * yc - rho * rho * yo) / denom
                        })
                        .collect();
                    (2, c, psi)
                }
            };

            match self.newton(system, t_new, c, &psi, &y_pred, opts)? {
                Some(y_new) => {
                    // Local error from the corrector-predictor difference.
                    let err_const = if order == 2 { 1.0 / 3.0 } else { 0.5 };
                    let mut err_norm = 0.0;
                    for i in 0..n {
                        let ei = err_const * (y_new[i] - y_pred[i]);
                        let sc = opts.scale(y[i], y_new[i]);
                        err_norm += (ei / sc) * (ei / sc);
                    }
                    err_norm = (err_norm / n as Real).sqrt();

                    if err_norm <= 1.0 || h_step <= opts.h_min {
                        prev = Some((t, std::mem::replace(&mut y, y_new)));
                        t = t_new;
                        let eps = 1e-12 * (1.0 + t.abs());
                        while idx < t_eval.len() && t_eval[idx] <= t + eps {
                            traj.push(t_eval[idx], y.clone());
                            idx += 1;
                        }
                    }

                    let factor = if err_norm == 0.0 {
                        4.0
                    } else {
                        (0.9 * err_norm.powf(-1.0 / (order as Real + 1.0))).clamp(0.2, 4.0)
                    };
                    h = (h_step * factor).max(opts.h_min);
                }
                None => {
                    // Newton failed to converge: halve the step and retry.
                    if h_step <= opts.h_min {
                        return Err(SolverError::NewtonFailed { t });
                    }
                    tracing::debug!(t, h_step, "newton iteration stalled; halving step");
                    h = (h_step * 0.5).max(opts.h_min);
                }
            }
        }

        if idx < t_eval.len() {
            return Err(SolverError::MaxStepsExceeded {
                max_steps: opts.max_steps,
                t,
                t_end: t1,
            });
        }

        Ok(traj)
    }
}

impl Bdf {
    /// Solve `y = psi + c * f(t, y)` by Newton iteration starting from
    /// `y_pred`. Returns `Ok(None)` when the iteration does not converge
    /// within `max_newton` updates.
    fn newton(
        &self,
        system: &dyn OdeSystem,
        t: Real,
        c: Real,
        psi: &[Real],
        y_pred: &[Real],
        opts: &SolverOptions,
    ) -> SolverResult<Option<Vec<Real>>> {
        let n = system.ndim();
        let mut y = y_pred.to_vec();
        let mut f = vec![0.0; n];

        // Finite-difference Jacobian at the predictor, held fixed for the
        // whole iteration; the iteration matrix is I - c*J.
        system.rhs(t, &y, &mut f);
        let mut jac = DMatrix::<Real>::zeros(n, n);
        let mut y_pert = y.clone();
        let mut f_pert = vec![0.0; n];
        for j in 0..n {
            let dy = 1e-8 * (1.0 + y[j].abs());
            y_pert[j] = y[j] + dy;
            system.rhs(t, &y_pert, &mut f_pert);
            y_pert[j] = y[j];
            for i in 0..n {
                jac[(i, j)] = (f_pert[i] - f[i]) / dy;
            }
        }
        let m = DMatrix::<Real>::identity(n, n) - jac * c;
        let lu = m.lu();

        for iter in 0..self.max_newton {
            if iter > 0 {
                system.rhs(t, &y, &mut f);
            }
            let mut g = DVector::<Real>::zeros(n);
            for i in 0..n {
                g[i] = psi[i] + c * f[i] - y[i];
            }
            let delta = lu
                .solve(&g)
                .ok_or(SolverError::SingularMatrix { t })?;

            let mut norm = 0.0;
            for i in 0..n {
                y[i] += delta[i];
                let sc = opts.scale(y[i], y[i]);
                norm += (delta[i] / sc) * (delta[i] / sc);
            }
            norm = (norm / n as Real).sqrt();
            if norm < NEWTON_TOL {
                return Ok(Some(y));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rk23::Rk23;

    struct ExpDecay {
        k: Real,
    }
    impl OdeSystem for ExpDecay {
        fn ndim(&self) -> usize {
            1
        }
        fn rhs(&self, _t: Real, y: &[Real], dydt: &mut [Real]) {
            dydt[0] = -self.k * y[0];
        }
    }

    #[test]
    fn exp_decay_matches_closed_form() {
        let sys = ExpDecay { k: 1.3 };
        let t_eval = [0.0, 0.5, 1.0];
        let traj = Bdf::default()
            .integrate(&sys, (0.0, 1.0), &[2.0], &t_eval, &SolverOptions::default())
            .unwrap();

        assert_eq!(traj.len(), 3);
        for (i, &te) in t_eval.iter().enumerate() {
            let expected = 2.0 * (-1.3 * te).exp();
            assert!(
                (traj.y[i][0] - expected).abs() < 1e-4,
                "t={te}: got {}, expected {expected}",
                traj.y[i][0]
            );
        }
    }

    #[test]
    fn handles_stiff_decay() {
        // Fast decay rate that would force tiny explicit steps.
        let sys = ExpDecay { k: 200.0 };
        let traj = Bdf::default()
            .integrate(&sys, (0.0, 1.0), &[1.0], &[1.0], &SolverOptions::default())
            .unwrap();
        // Solution is ~1.4e-87, effectively zero at atol.
        assert!(traj.y[0][0].abs() < 1e-4);
    }

    #[test]
    fn agrees_with_explicit_backend() {
        let sys = ExpDecay { k: 0.5 };
        let opts = SolverOptions {
            rtol: 1e-8,
            atol: 1e-10,
            ..Default::default()
        };
        let t_eval = [2.0, 5.0];

        let bdf = Bdf::default()
            .integrate(&sys, (0.0, 5.0), &[1.0], &t_eval, &opts)
            .unwrap();
        let rk = Rk23
            .integrate(&sys, (0.0, 5.0), &[1.0], &t_eval, &opts)
            .unwrap();

        for i in 0..t_eval.len() {
            assert!(
                (bdf.y[i][0] - rk.y[i][0]).abs() < 1e-6,
                "backends disagree at t={}: bdf={}, rk23={}",
                t_eval[i],
                bdf.y[i][0],
                rk.y[i][0]
            );
        }
    }

    #[test]
    fn max_steps_exhaustion_is_an_error() {
        let sys = ExpDecay { k: 1.0 };
        let opts = SolverOptions {
            max_steps: 1,
            h0: 1e-6,
            ..Default::default()
        };
        let err = Bdf::default()
            .integrate(&sys, (0.0, 10.0), &[1.0], &[10.0], &opts)
            .unwrap_err();
        assert!(matches!(err, SolverError::MaxStepsExceeded { .. }));
    }
}
