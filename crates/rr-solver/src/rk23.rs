//! Adaptive explicit Runge-Kutta 2(3) backend (Bogacki-Shampine pair).

use crate::backend::{IntegrationBackend, check_problem};
use crate::error::{SolverError, SolverResult};
use crate::options::SolverOptions;
use crate::system::OdeSystem;
use crate::trajectory::Trajectory;
use rr_core::Real;

// Bogacki-Shampine 3(2) coefficients.
const A21: Real = 1.0 / 2.0;
const A32: Real = 3.0 / 4.0;

// 3rd-order weights (advancing solution).
const B1: Real = 2.0 / 9.0;
const B2: Real = 1.0 / 3.0;
const B3: Real = 4.0 / 9.0;

// Error = y3 - y2, from the embedded 2nd-order weights.
const E1: Real = B1 - 7.0 / 24.0;
const E2: Real = B2 - 1.0 / 4.0;
const E3: Real = B3 - 1.0 / 3.0;
const E4: Real = -1.0 / 8.0;

/// Explicit Bogacki-Shampine 2(3) pair with PI-free step control and
/// cubic Hermite dense output at the requested evaluation times.
///
/// The pair is FSAL: the last stage of an accepted step is the first stage
/// of the next, so each accepted step costs three fresh RHS evaluations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rk23;

impl IntegrationBackend for Rk23 {
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
        let mut h = opts.initial_step(t1 - t0);

        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut y_tmp = vec![0.0; n];
        let mut y_new = vec![0.0; n];

        system.rhs(t, &y, &mut k1);

        for _step in 0..opts.max_steps {
            if idx == t_eval.len() {
                break;
            }
            h = h.min(t1 - t).max(opts.h_min);

            // Stage 2
            for i in 0..n {
                y_tmp[i] = y[i] + h * A21 * k1[i];
            }
            system.rhs(t + h / 2.0, &y_tmp, &mut k2);

            // Stage 3
            for i in 0..n {
                y_tmp[i] = y[i] + h * A32 * k2[i];
            }
            system.rhs(t + 3.0 * h / 4.0, &y_tmp, &mut k3);

            // 3rd-order solution
            for i in 0..n {
                y_new[i] = y[i] + h * (B1 * k1[i] + B2 * k2[i] + B3 * k3[i]);
            }

            // Stage 4 (FSAL)
            let t_new = t + h;
            system.rhs(t_new, &y_new, &mut k4);

            // Scaled RMS error estimate
            let mut err_norm = 0.0;
            for i in 0..n {
                let ei = h * (E1 * k1[i] + E2 * k2[i] + E3 * k3[i] + E4 * k4[i]);
                let sc = opts.scale(y[i], y_new[i]);
                err_norm += (ei / sc) * (ei / sc);
            }
            err_norm = (err_norm / n as Real).sqrt();

            if err_norm <= 1.0 || h <= opts.h_min {
                // Accept step; emit dense output over (t, t_new].
                let eps = 1e-12 * (1.0 + t_new.abs());
                while idx < t_eval.len() && t_eval[idx] <= t_new + eps {
                    traj.push(
                        t_eval[idx],
                        hermite(t_eval[idx], t, h, &y, &k1, &y_new, &k4),
                    );
                    idx += 1;
                }

                t = t_new;
                y.copy_from_slice(&y_new);
                k1.copy_from_slice(&k4); // FSAL
            }

            // Step-size controller, order 3
            let factor = if err_norm == 0.0 {
                5.0
            } else {
                (0.9 * err_norm.powf(-1.0 / 3.0)).clamp(0.2, 5.0)
            };
            h = (h * factor).max(opts.h_min);
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

/// Cubic Hermite interpolation on an accepted step `[t_i, t_i + h]`,
/// using the derivatives already available at both endpoints.
fn hermite(
    te: Real,
    t_i: Real,
    h: Real,
    y_i: &[Real],
    f_i: &[Real],
    y_next: &[Real],
    f_next: &[Real],
) -> Vec<Real> {
    let theta = ((te - t_i) / h).clamp(0.0, 1.0);
    let t2 = theta * theta;
    let t3 = t2 * theta;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + theta;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    y_i.iter()
        .zip(f_i)
        .zip(y_next.iter().zip(f_next))
        .map(|((&yi, &fi), (&yn, &fn_))| h00 * yi + h10 * h * fi + h01 * yn + h11 * h * fn_)
        .collect()
}
