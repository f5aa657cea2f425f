//! Strictly feasible point search.
//!
//! x ↦ λ_min(A(x)) is concave, so a supergradient ascent from the origin
//! either reaches a strictly positive minimum eigenvalue or certifies
//! that the iteration budget ran out without finding one. The
//! supergradient at x has components -vᵀ·Ai·v for the unit eigenvector v
//! of the smallest eigenvalue.

use nalgebra::DVector;

use crate::error::{SamplerError, SamplerResult};
use crate::linalg;
use crate::problem::{Lmi, Spectrahedron};

/// Smallest step the backtracking line search will try.
const MIN_STEP: f64 = 1e-12;

/// Find x with λ_min(A(x)) > margin, or fail with `Infeasible`.
pub fn find_interior_point(
    spec: &Spectrahedron,
    max_iters: usize,
    margin: f64,
) -> SamplerResult<DVector<f64>> {
    let n = spec.ambient_dim();
    let mut x = DVector::zeros(n);
    let a = spec.lmi().evaluate(&x)?;
    let (mut lambda, mut v) = linalg::min_eigenpair(&a);
    if lambda > margin {
        return Ok(x);
    }

    let mut step = 1.0;
    for _ in 0..max_iters {
        let g = supergradient(spec.lmi(), &v);
        let g_norm = g.norm();
        if g_norm <= MIN_STEP {
            // flat supergradient: no ascent direction left
            break;
        }
        let g = g / g_norm;

        // backtracking: accept the first step that improves λ_min
        let mut improved = false;
        while step >= MIN_STEP {
            let candidate = &x + &g * step;
            let a = spec.lmi().evaluate(&candidate)?;
            let (lambda_c, v_c) = linalg::min_eigenpair(&a);
            if lambda_c > lambda {
                x = candidate;
                lambda = lambda_c;
                v = v_c;
                improved = true;
                // allow the step to grow back after a successful move
                step *= 2.0;
                break;
            }
            step *= 0.5;
        }
        if !improved {
            break;
        }
        if lambda > margin {
            return Ok(x);
        }
    }
    Err(SamplerError::Infeasible { iters: max_iters })
}

fn supergradient(lmi: &Lmi, v: &DVector<f64>) -> DVector<f64> {
    DVector::from_fn(lmi.ambient_dim(), |i, _| {
        -v.dot(&(lmi.coefficient(i) * v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use crate::problem::Lmi;

    #[test]
    fn test_origin_accepted_when_a0_definite() {
        // A0 = I is strictly positive definite: the origin works as-is
        let spec = Spectrahedron::new(
            Lmi::new(
                DMatrix::identity(2, 2),
                vec![DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0])],
            )
            .unwrap(),
        );
        let x = find_interior_point(&spec, 100, 1e-6).unwrap();
        assert_eq!(x, DVector::zeros(1));
    }

    #[test]
    fn test_ascends_into_shifted_body() {
        // A(x) = diag(x - 1, 3 - x): feasible interval (1, 3), origin outside
        let a0 = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 3.0]);
        let a1 = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 1.0]);
        let spec = Spectrahedron::new(Lmi::new(a0, vec![a1]).unwrap());
        let x = find_interior_point(&spec, 500, 1e-6).unwrap();
        assert!(
            spec.min_eigenvalue(&x).unwrap() > 1e-6,
            "found point is not strictly interior"
        );
        assert!(x[0] > 1.0 && x[0] < 3.0);
    }

    #[test]
    fn test_infeasible_reported() {
        // A(x) = diag(-1 - x, -1 + x) is never PSD
        let a0 = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, -1.0]);
        let a1 = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        let spec = Spectrahedron::new(Lmi::new(a0, vec![a1]).unwrap());
        assert!(matches!(
            find_interior_point(&spec, 50, 1e-6),
            Err(SamplerError::Infeasible { .. })
        ));
    }
}
