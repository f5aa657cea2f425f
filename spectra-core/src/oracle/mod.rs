//! Boundary oracles for the spectrahedron.
//!
//! Given a strictly interior point and a trajectory, the oracle answers
//! how far one can travel before A(·) becomes singular. Two trajectory
//! shapes are supported: straight rays (`ray`, billiard walk) and
//! constant-acceleration parabolas (`parabola`, Boltzmann-HMC walk).
//!
//! Both variants share one eigenvalue tolerance, exposed as
//! `SamplerSettings::boundary_tol`; it is the dominant source of sampling
//! artifacts and is therefore never hardcoded at call sites.

pub mod parabola;
pub mod ray;

pub use parabola::parabolic_exit;
pub use ray::{first_exit, first_exit_with};

use nalgebra::{DMatrix, DVector};

use crate::error::{SamplerError, SamplerResult};
use crate::linalg;
use crate::problem::{Lmi, Spectrahedron};

/// Per-invocation cache for the billiard oracle.
///
/// Holds the matrix value A(p) at the walker's current point, refreshed
/// after every accepted move so one reflection step never re-evaluates
/// the full coefficient sum. Scoped to a single walk invocation.
#[derive(Debug, Clone)]
pub struct BilliardOracleCache {
    lmi_at_p: DMatrix<f64>,
}

impl BilliardOracleCache {
    /// Evaluate A(p) at the walk's starting point.
    pub fn new(spec: &Spectrahedron, p: &DVector<f64>) -> SamplerResult<Self> {
        Ok(Self {
            lmi_at_p: spec.lmi().evaluate(p)?,
        })
    }

    /// Cached A(p).
    pub fn lmi_at_p(&self) -> &DMatrix<f64> {
        &self.lmi_at_p
    }

    /// Slide the cache along the current segment:
    /// A(p + t·d) = A(p) - t·B with B = Σ di·Ai.
    pub fn advance(&mut self, deriv: &DMatrix<f64>, t: f64) {
        self.lmi_at_p -= deriv * t;
    }
}

/// Per-invocation state for the Boltzmann-HMC oracle.
///
/// The objective direction c is fixed for a whole trajectory, so its
/// matrix derivative Σ ci·Ai is computed on the first sub-interval and
/// reused across reflections. `epsilon` bounds how close to the true
/// boundary a reflection point may sit, preventing reflection loops fed
/// by floating-point residue.
#[derive(Debug, Clone)]
pub struct HmcOracleState {
    first_step: bool,
    epsilon: f64,
    force: Option<DMatrix<f64>>,
}

impl HmcOracleState {
    /// Fresh state for one walk invocation.
    pub fn new(epsilon: f64) -> Self {
        Self {
            first_step: true,
            epsilon,
            force: None,
        }
    }

    /// True until the first sub-interval has been integrated.
    pub fn is_first_step(&self) -> bool {
        self.first_step
    }

    /// Relative pull-back from reflection points.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Σ ci·Ai for the fixed objective direction. Computed on the first
    /// sub-interval, reused verbatim afterwards.
    pub fn force_matrix(&mut self, lmi: &Lmi, c: &DVector<f64>) -> SamplerResult<&DMatrix<f64>> {
        if self.first_step {
            self.force = Some(lmi.directional_derivative(c)?);
        }
        self.force.as_ref().ok_or_else(|| {
            SamplerError::Numerical("force matrix queried before the first step".to_string())
        })
    }

    /// Record that a sub-interval has been integrated.
    pub fn mark_stepped(&mut self) {
        self.first_step = false;
    }
}

/// Unit normal of the supporting hyperplane at a boundary point.
///
/// The boundary is the zero level set of x ↦ λ_min(A(x)); its gradient
/// has components ∂λ_min/∂xi = -vᵀ·Ai·v for the unit eigenvector v of
/// the smallest eigenvalue of `a_at_x`. Callers pass the cached matrix
/// value so the LMI is not re-evaluated at the boundary point.
pub fn boundary_normal(lmi: &Lmi, a_at_x: &DMatrix<f64>) -> SamplerResult<DVector<f64>> {
    let (_, v) = linalg::min_eigenpair(a_at_x);
    let grad = DVector::from_fn(lmi.ambient_dim(), |i, _| {
        -v.dot(&(lmi.coefficient(i) * &v))
    });
    let norm = grad.norm();
    if norm <= 0.0 || !norm.is_finite() {
        return Err(SamplerError::Numerical(
            "degenerate boundary normal".to_string(),
        ));
    }
    Ok(grad / norm)
}

/// Specular reflection of `d` about the hyperplane with unit normal
/// `normal`. Preserves the norm of `d`.
pub fn reflect(d: &DVector<f64>, normal: &DVector<f64>) -> DVector<f64> {
    d - normal * (2.0 * d.dot(normal))
}
