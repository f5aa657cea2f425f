//! Linear-trajectory boundary oracle.
//!
//! First crossing along the ray x(s) = p + s·d: the smallest s > 0 with
//! det(A(p) - s·B) = 0, B = Σ di·Ai. With W = A(p)^{-1/2} B A(p)^{-1/2},
//! crossings sit at s = 1/μ over the eigenvalues μ of W, so the first
//! exit is 1/μ_max. No positive eigenvalue means the ray never leaves
//! the body.

use nalgebra::{DMatrix, DVector};

use crate::error::{SamplerError, SamplerResult};
use crate::linalg;
use crate::problem::Spectrahedron;

/// Distance to the boundary along +d, given A(p) and B = Σ di·Ai.
///
/// `p` must be feasible. A point already within `tol` of the boundary
/// snaps to a zero-length exit rather than erroring; a direction with no
/// positive crossing fails with `UnboundedDirection`.
pub fn first_exit_with(
    a_at_p: &DMatrix<f64>,
    deriv: &DMatrix<f64>,
    tol: f64,
) -> SamplerResult<f64> {
    // A zero pencil derivative leaves A constant along the whole ray.
    if deriv.iter().all(|&v| v == 0.0) {
        return Err(SamplerError::UnboundedDirection);
    }
    if a_at_p.iter().any(|v| !v.is_finite()) {
        return Err(SamplerError::Numerical(
            "non-finite matrix value at current point".to_string(),
        ));
    }

    let scale = a_at_p.iter().map(|v| v.abs()).fold(0.0_f64, f64::max).max(1.0);
    let min_eig = linalg::min_eigenvalue(a_at_p);
    if min_eig < -tol * scale {
        return Err(SamplerError::Numerical(format!(
            "oracle queried at an infeasible point (min eigenvalue {:.3e})",
            min_eig
        )));
    }
    if min_eig <= tol * scale {
        // already on the boundary within tolerance
        return Ok(0.0);
    }

    let x_inv_sqrt = linalg::inv_sqrt(a_at_p)?;
    let w = linalg::symmetrize(&(&x_inv_sqrt * deriv * x_inv_sqrt.transpose()));
    let mu_max = linalg::max_eigenvalue(&w);
    if !mu_max.is_finite() {
        return Err(SamplerError::Numerical(
            "pencil eigendecomposition produced non-finite values".to_string(),
        ));
    }
    if mu_max <= tol {
        return Err(SamplerError::UnboundedDirection);
    }
    Ok(1.0 / mu_max)
}

/// Convenience wrapper evaluating A(p) and B from the spectrahedron.
pub fn first_exit(
    spec: &Spectrahedron,
    p: &DVector<f64>,
    d: &DVector<f64>,
    tol: f64,
) -> SamplerResult<f64> {
    let a = spec.lmi().evaluate(p)?;
    let b = spec.lmi().directional_derivative(d)?;
    first_exit_with(&a, &b, tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Lmi;
    use nalgebra::DVector;

    fn box_spec() -> Spectrahedron {
        Spectrahedron::new(
            Lmi::new(
                DMatrix::identity(2, 2),
                vec![
                    DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 0.0])),
                    DMatrix::from_diagonal(&DVector::from_vec(vec![0.0, 1.0])),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_exit_along_axis() {
        let spec = box_spec();
        let p = DVector::from_vec(vec![0.0, 0.0]);
        let d = DVector::from_vec(vec![1.0, 0.0]);
        let t = first_exit(&spec, &p, &d, 1e-10).unwrap();
        assert!((t - 1.0).abs() < 1e-9, "expected exit at 1.0, got {}", t);
    }

    #[test]
    fn test_exit_diagonal() {
        let spec = box_spec();
        let p = DVector::from_vec(vec![0.0, 0.0]);
        let d = DVector::from_vec(vec![2.0, 2.0]);
        // boundary at x1 = 1 reached at s = 0.5 for this unnormalized d
        let t = first_exit(&spec, &p, &d, 1e-10).unwrap();
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_direction() {
        let spec = box_spec();
        let p = DVector::from_vec(vec![0.0, 0.0]);
        let d = DVector::from_vec(vec![-1.0, 0.0]);
        assert!(matches!(
            first_exit(&spec, &p, &d, 1e-10),
            Err(SamplerError::UnboundedDirection)
        ));
    }

    #[test]
    fn test_boundary_point_snaps_to_zero() {
        let spec = box_spec();
        let p = DVector::from_vec(vec![1.0, 0.0]);
        let d = DVector::from_vec(vec![1.0, 0.0]);
        let t = first_exit(&spec, &p, &d, 1e-10).unwrap();
        assert_eq!(t, 0.0);
    }
}
