//! Rounding: affine rescaling from a sampled covariance estimate.
//!
//! Short preliminary billiard walks give a rough covariance of the body;
//! its Cholesky factor defines new coordinates y = L⁻¹(x - μ) in which
//! exit distances are roughly isotropic, so later walks need fewer
//! reflections to mix. The LMI itself is never mutated: rounding builds
//! a fresh spectrahedron over the y coordinates plus an invertible map
//! back to the original ones.

use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::error::{SamplerError, SamplerResult};
use crate::problem::{Lmi, SamplerSettings, Spectrahedron};
use crate::walks::BilliardWalk;

/// Diagonal regularization keeping the covariance estimate SPD.
const COV_REG: f64 = 1e-8;

/// Invertible affine map x = μ + L·y between original and rounded
/// coordinates, with L lower triangular.
#[derive(Debug, Clone)]
pub struct RoundingTransform {
    center: DVector<f64>,
    l: DMatrix<f64>,
}

impl RoundingTransform {
    /// Identity transform (no rounding).
    pub fn identity(n: usize) -> Self {
        Self {
            center: DVector::zeros(n),
            l: DMatrix::identity(n, n),
        }
    }

    /// Map a rounded-space point back to original coordinates:
    /// x = μ + L·y.
    pub fn to_original(&self, y: &DVector<f64>) -> DVector<f64> {
        &self.center + &self.l * y
    }

    /// Map an original-space point into rounded coordinates:
    /// y = L⁻¹(x - μ).
    pub fn to_rounded(&self, x: &DVector<f64>) -> SamplerResult<DVector<f64>> {
        self.l
            .solve_lower_triangular(&(x - &self.center))
            .ok_or_else(|| SamplerError::Numerical("singular rounding factor".to_string()))
    }

    /// Pull a linear objective into rounded coordinates: ⟨c, x⟩ differs
    /// from ⟨Lᵀc, y⟩ only by a constant, which a Boltzmann density
    /// ignores.
    pub fn pullback_objective(&self, c: &DVector<f64>) -> DVector<f64> {
        self.l.transpose() * c
    }

    /// The LMI over rounded coordinates: substituting x = μ + L·y gives
    /// A0' = A(μ) and A'j = Σi L[i,j]·Ai.
    pub fn apply(&self, lmi: &Lmi) -> SamplerResult<Lmi> {
        let n = lmi.ambient_dim();
        if self.center.len() != n {
            return Err(SamplerError::DimensionMismatch(format!(
                "transform is over R^{}, LMI over R^{}",
                self.center.len(),
                n
            )));
        }
        let a0 = lmi.evaluate(&self.center)?;
        let m = lmi.matrix_dim();
        let mut coeffs = Vec::with_capacity(n);
        for j in 0..n {
            let mut cj = DMatrix::zeros(m, m);
            for i in 0..n {
                let w = self.l[(i, j)];
                if w != 0.0 {
                    cj += lmi.coefficient(i) * w;
                }
            }
            coeffs.push(cj);
        }
        Lmi::new(a0, coeffs)
    }
}

/// Estimate a rounding transform from preliminary billiard walks and
/// build the rounded spectrahedron.
pub fn estimate<R: Rng + ?Sized>(
    spec: &Spectrahedron,
    interior_point: &DVector<f64>,
    diameter: f64,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SamplerResult<(Spectrahedron, RoundingTransform)> {
    let n = spec.ambient_dim();
    let walks = settings.rounding_walks.max(n + 2);
    let walk = BilliardWalk::new(diameter, settings.max_reflections, settings.boundary_tol);

    let mut points = Vec::with_capacity(walks);
    let mut current = interior_point.clone();
    for _ in 0..walks {
        let out = walk.run(spec, &current, rng)?;
        current = out.point;
        points.push(current.clone());
    }

    let count = points.len() as f64;
    let mut center = DVector::zeros(n);
    for p in &points {
        center += p;
    }
    center /= count;

    let mut cov = DMatrix::zeros(n, n);
    for p in &points {
        let d = p - &center;
        cov += &d * d.transpose();
    }
    cov /= count - 1.0;

    // keep the estimate SPD even when the preliminary walks are few
    let reg = COV_REG * (cov.trace() / n as f64).max(1.0);
    for i in 0..n {
        cov[(i, i)] += reg;
    }

    let chol = Cholesky::new(cov).ok_or_else(|| {
        SamplerError::Numerical("covariance estimate is not positive definite".to_string())
    })?;
    let transform = RoundingTransform {
        center,
        l: chol.l(),
    };
    let rounded = Spectrahedron::new(transform.apply(spec.lmi())?);
    Ok((rounded, transform))
}
