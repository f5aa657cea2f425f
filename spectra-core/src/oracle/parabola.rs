//! Parabolic-trajectory boundary oracle for the Boltzmann-HMC walk.
//!
//! The walk integrates x(t) = p + t·v - t²/(2T)·c, so the matrix value
//! along the trajectory is quadratic in time:
//!
//! ```text
//! M(t) = A(p) - t·Bv + t²/(2T)·Bc,   Bv = Σ vi·Ai,  Bc = Σ ci·Ai
//! ```
//!
//! The crossing is the first root of λ_min(M(t)) on (0, horizon]. It is
//! located by a sign-change scan over a fixed grid, refined by bisection
//! down to the shared boundary tolerance. The horizon is the walk's
//! remaining simulated time, so "no crossing" is an ordinary outcome
//! here, not an unboundedness signal.

use nalgebra::DMatrix;

use crate::linalg;

/// Grid nodes for the sign-change scan.
const SCAN_STEPS: usize = 64;

/// Bisection iteration cap; each step halves the bracket.
const MAX_BISECT: usize = 80;

/// Matrix value at time t along the trajectory.
fn lmi_along(
    a_at_p: &DMatrix<f64>,
    b_v: &DMatrix<f64>,
    b_c: &DMatrix<f64>,
    inv_2t: f64,
    t: f64,
) -> DMatrix<f64> {
    a_at_p - b_v * t + b_c * (t * t * inv_2t)
}

/// First t in (0, horizon] where M(t) becomes singular, or `None` when
/// the trajectory stays strictly inside for the whole horizon.
///
/// The returned time is the feasible end of the final bisection bracket,
/// so advancing to it never overshoots the detected boundary by more
/// than the tolerance-scaled bracket width.
pub fn parabolic_exit(
    a_at_p: &DMatrix<f64>,
    b_v: &DMatrix<f64>,
    b_c: &DMatrix<f64>,
    temperature: f64,
    horizon: f64,
    tol: f64,
) -> Option<f64> {
    if horizon <= 0.0 {
        return None;
    }
    let inv_2t = 1.0 / (2.0 * temperature);

    let scale = a_at_p.iter().map(|v| v.abs()).fold(0.0_f64, f64::max).max(1.0);
    if linalg::min_eigenvalue(a_at_p) <= tol * scale {
        // starting point already sits on the boundary
        return Some(0.0);
    }

    let dt = horizon / SCAN_STEPS as f64;
    let mut lo = 0.0_f64;
    let mut hi = None;
    for k in 1..=SCAN_STEPS {
        let t = dt * k as f64;
        let lambda = linalg::min_eigenvalue(&lmi_along(a_at_p, b_v, b_c, inv_2t, t));
        if lambda <= 0.0 {
            hi = Some(t);
            break;
        }
        lo = t;
    }
    let mut hi = hi?;

    let width_target = tol * horizon.max(1.0);
    for _ in 0..MAX_BISECT {
        if hi - lo <= width_target {
            break;
        }
        let mid = 0.5 * (lo + hi);
        let lambda = linalg::min_eigenvalue(&lmi_along(a_at_p, b_v, b_c, inv_2t, mid));
        if lambda > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(lo)
}
