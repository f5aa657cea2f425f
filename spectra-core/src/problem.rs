//! Problem data structures and validation.
//!
//! This module defines the linear matrix inequality, the spectrahedron it
//! carves out, and all associated configuration and result types.

use nalgebra::{DMatrix, DVector};

use crate::error::{SamplerError, SamplerResult};
use crate::linalg;

/// Sparse matrix in CSC format, accepted as construction input.
pub type SparseSym = sprs::CsMat<f64>;

/// Relative symmetry tolerance checked once at construction.
const SYMMETRY_TOL: f64 = 1e-10;

/// Linear matrix inequality
///
/// ```text
/// A(x) = A0 - x1*A1 - ... - xn*An  ⪰  0
/// ```
///
/// i.e. the standard form `x1*A1 + ... + xn*An ⪯ A0`, with all matrices
/// symmetric of a common side length m. The coefficient list is immutable
/// for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct Lmi {
    a0: DMatrix<f64>,
    coeffs: Vec<DMatrix<f64>>,
    /// Ambient dimension n (number of coefficient matrices)
    n: usize,
    /// Matrix side length m
    m: usize,
}

impl Lmi {
    /// Build an LMI from dense matrices, validating shape and symmetry.
    pub fn new(a0: DMatrix<f64>, coeffs: Vec<DMatrix<f64>>) -> SamplerResult<Self> {
        let m = a0.nrows();
        check_symmetric(&a0, "A0", m)?;
        for (i, c) in coeffs.iter().enumerate() {
            check_symmetric(c, &format!("A{}", i + 1), m)?;
        }
        let n = coeffs.len();
        if n == 0 {
            return Err(SamplerError::DimensionMismatch(
                "LMI needs at least one coefficient matrix".to_string(),
            ));
        }
        Ok(Self { a0, coeffs, n, m })
    }

    /// Build an LMI from sparse upper-triangle matrices.
    ///
    /// Entries with `row <= col` are mirrored into the lower triangle;
    /// lower-triangle input entries are rejected so a matrix cannot be
    /// given inconsistently twice.
    pub fn from_sparse(a0: &SparseSym, coeffs: &[SparseSym]) -> SamplerResult<Self> {
        let dense_a0 = densify_upper(a0)?;
        let dense_coeffs = coeffs
            .iter()
            .map(densify_upper)
            .collect::<SamplerResult<Vec<_>>>()?;
        Self::new(dense_a0, dense_coeffs)
    }

    /// Ambient dimension n.
    pub fn ambient_dim(&self) -> usize {
        self.n
    }

    /// Matrix side length m.
    pub fn matrix_dim(&self) -> usize {
        self.m
    }

    /// The constant term A0.
    pub fn a0(&self) -> &DMatrix<f64> {
        &self.a0
    }

    /// The i-th coefficient matrix Ai (0-based).
    pub fn coefficient(&self, i: usize) -> &DMatrix<f64> {
        &self.coeffs[i]
    }

    /// All coefficient matrices A1..An.
    pub fn coefficients(&self) -> &[DMatrix<f64>] {
        &self.coeffs
    }

    /// Evaluate A(x) = A0 - Σ xi·Ai.
    pub fn evaluate(&self, x: &DVector<f64>) -> SamplerResult<DMatrix<f64>> {
        if x.len() != self.n {
            return Err(SamplerError::DimensionMismatch(format!(
                "point has length {}, expected {}",
                x.len(),
                self.n
            )));
        }
        let mut out = self.a0.clone();
        for (xi, ai) in x.iter().zip(self.coeffs.iter()) {
            out -= ai * *xi;
        }
        Ok(out)
    }

    /// Directional derivative of the pencil: Σ di·Ai.
    ///
    /// Independent of the evaluation point; along the ray x(s) = p + s·d
    /// the matrix value changes as A(p) - s·(Σ di·Ai).
    pub fn directional_derivative(&self, d: &DVector<f64>) -> SamplerResult<DMatrix<f64>> {
        if d.len() != self.n {
            return Err(SamplerError::DimensionMismatch(format!(
                "direction has length {}, expected {}",
                d.len(),
                self.n
            )));
        }
        let mut out = DMatrix::zeros(self.m, self.m);
        for (di, ai) in d.iter().zip(self.coeffs.iter()) {
            out += ai * *di;
        }
        Ok(out)
    }
}

fn check_symmetric(mat: &DMatrix<f64>, name: &str, m: usize) -> SamplerResult<()> {
    if mat.nrows() != m || mat.ncols() != m {
        return Err(SamplerError::DimensionMismatch(format!(
            "{} has shape {}x{}, expected {}x{}",
            name,
            mat.nrows(),
            mat.ncols(),
            m,
            m
        )));
    }
    let scale = mat.iter().map(|v| v.abs()).fold(0.0_f64, f64::max).max(1.0);
    for j in 0..m {
        for i in 0..j {
            if (mat[(i, j)] - mat[(j, i)]).abs() > SYMMETRY_TOL * scale {
                return Err(SamplerError::DimensionMismatch(format!(
                    "{} is not symmetric at ({}, {})",
                    name, i, j
                )));
            }
        }
    }
    if mat.iter().any(|v| !v.is_finite()) {
        return Err(SamplerError::DimensionMismatch(format!(
            "{} contains non-finite entries",
            name
        )));
    }
    Ok(())
}

fn densify_upper(mat: &SparseSym) -> SamplerResult<DMatrix<f64>> {
    let m = mat.rows();
    if mat.cols() != m {
        return Err(SamplerError::DimensionMismatch(format!(
            "sparse matrix has shape {}x{}, expected square",
            mat.rows(),
            mat.cols()
        )));
    }
    let mut out = DMatrix::zeros(m, m);
    for (&val, (row, col)) in mat.iter() {
        if row > col {
            return Err(SamplerError::DimensionMismatch(format!(
                "sparse matrix entry ({}, {}) is below the diagonal",
                row, col
            )));
        }
        out[(row, col)] = val;
        out[(col, row)] = val;
    }
    Ok(out)
}

/// A spectrahedron: the feasible region {x : A(x) ⪰ 0} of one LMI.
///
/// Immutable after construction; safe to share across threads for
/// concurrent read-only oracle queries. Rounding never mutates the LMI,
/// it produces a fresh `Spectrahedron` plus an invertible transform.
#[derive(Debug, Clone)]
pub struct Spectrahedron {
    lmi: Lmi,
}

impl Spectrahedron {
    /// Wrap a validated LMI.
    pub fn new(lmi: Lmi) -> Self {
        Self { lmi }
    }

    /// The underlying LMI.
    pub fn lmi(&self) -> &Lmi {
        &self.lmi
    }

    /// Ambient dimension n.
    pub fn ambient_dim(&self) -> usize {
        self.lmi.ambient_dim()
    }

    /// Matrix side length m.
    pub fn matrix_dim(&self) -> usize {
        self.lmi.matrix_dim()
    }

    /// Smallest eigenvalue of A(x); positive iff x is strictly interior.
    pub fn min_eigenvalue(&self, x: &DVector<f64>) -> SamplerResult<f64> {
        Ok(linalg::min_eigenvalue(&self.lmi.evaluate(x)?))
    }

    /// Feasibility test with a tolerance margin: λ_min(A(x)) ≥ -tol.
    pub fn contains(&self, x: &DVector<f64>, tol: f64) -> SamplerResult<bool> {
        Ok(self.min_eigenvalue(x)? >= -tol)
    }
}

/// Sampler settings and parameters.
///
/// The boundary tolerance is shared between the oracle and both walkers:
/// it decides when an eigenvalue counts as singular and when a trajectory
/// has hit the boundary rather than merely approached it.
#[derive(Debug, Clone)]
pub struct SamplerSettings {
    /// Number of independent samples to emit
    pub num_samples: usize,

    /// Chained walk invocations per emitted sample
    pub steps_per_sample: usize,

    /// Reflection cutoff per walk invocation; exceeding it emits the
    /// current point as a degraded sample instead of aborting
    pub max_reflections: usize,

    /// Eigenvalue magnitude below which a matrix counts as singular
    pub boundary_tol: f64,

    /// Fraction of the oracle distance actually traveled when reflecting,
    /// keeping post-reflection points strictly interior
    pub boundary_backoff: f64,

    /// Minimum λ_min(A(x)) for the interior-point search to accept x
    pub interior_margin: f64,

    /// Iteration budget for the interior-point search
    pub interior_max_iters: usize,

    /// Directions probed for the inner-radius/diameter estimate
    pub probe_directions: usize,

    /// Apply a rounding transform before sampling
    pub rounding: bool,

    /// Preliminary billiard walks used to estimate the rounding covariance
    pub rounding_walks: usize,

    /// Relative pull-back from reflection points in the HMC walk
    pub hmc_epsilon: f64,

    /// Enable diagnostic logging to stderr
    pub verbose: bool,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        // Environment overrides for the knobs most often tuned per run
        let max_reflections = std::env::var("SPECTRA_MAX_REFLECTIONS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(100);
        let boundary_tol = std::env::var("SPECTRA_BOUNDARY_TOL")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(1e-10);
        let verbose = std::env::var("SPECTRA_VERBOSE")
            .ok()
            .map(|s| s == "1")
            .unwrap_or(false);

        Self {
            num_samples: 100,
            steps_per_sample: 1,
            max_reflections,
            boundary_tol,
            boundary_backoff: 1.0 - 1e-6,
            interior_margin: 1e-6,
            interior_max_iters: 200,
            probe_directions: 32,
            rounding: true,
            rounding_walks: 50,
            hmc_epsilon: 1e-4,
            verbose,
        }
    }
}

impl SamplerSettings {
    /// Validate parameter ranges.
    pub fn validate(&self) -> SamplerResult<()> {
        if self.num_samples == 0 {
            return Err(SamplerError::Numerical(
                "num_samples must be positive".to_string(),
            ));
        }
        if !(0.0 < self.boundary_backoff && self.boundary_backoff <= 1.0) {
            return Err(SamplerError::Numerical(format!(
                "boundary_backoff must be in (0, 1], got {}",
                self.boundary_backoff
            )));
        }
        if self.boundary_tol <= 0.0 || !self.boundary_tol.is_finite() {
            return Err(SamplerError::Numerical(format!(
                "boundary_tol must be positive, got {}",
                self.boundary_tol
            )));
        }
        if !(0.0..1.0).contains(&self.hmc_epsilon) {
            return Err(SamplerError::Numerical(format!(
                "hmc_epsilon must be in [0, 1), got {}",
                self.hmc_epsilon
            )));
        }
        if self.probe_directions == 0 {
            return Err(SamplerError::Numerical(
                "probe_directions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sampling result: the points plus run diagnostics.
#[derive(Debug, Clone)]
pub struct SampleResult {
    /// Sampled points in generation order
    pub points: Vec<DVector<f64>>,

    /// Run diagnostics
    pub info: SampleInfo,
}

impl SampleResult {
    /// Samples as a row-major matrix: one row per point.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let rows = self.points.len();
        let cols = self.points.first().map_or(0, |p| p.len());
        DMatrix::from_fn(rows, cols, |i, j| self.points[i][j])
    }
}

/// Detailed run information and diagnostics.
#[derive(Debug, Clone)]
pub struct SampleInfo {
    /// Preprocessing time (milliseconds)
    pub preprocess_time_ms: u64,

    /// Sampling time (milliseconds)
    pub sample_time_ms: u64,

    /// Reflections summed over all walk invocations
    pub total_reflections: usize,

    /// Samples whose walk exhausted the reflection budget
    pub degraded_samples: usize,

    /// Inner-ball radius estimate from preprocessing
    pub inner_radius: f64,

    /// Diameter estimate from preprocessing
    pub diameter: f64,

    /// Whether a rounding transform was applied
    pub rounded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_lmi() -> Lmi {
        // A(x) = diag(1 - x1, 1 - x2): the region {x1 <= 1, x2 <= 1}
        Lmi::new(
            DMatrix::identity(2, 2),
            vec![
                DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 0.0])),
                DMatrix::from_diagonal(&DVector::from_vec(vec![0.0, 1.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_evaluate_box() {
        let lmi = box_lmi();
        let a = lmi.evaluate(&DVector::from_vec(vec![0.5, -1.0])).unwrap();
        assert!((a[(0, 0)] - 0.5).abs() < 1e-15);
        assert!((a[(1, 1)] - 2.0).abs() < 1e-15);
        assert_eq!(a[(0, 1)], 0.0);
    }

    #[test]
    fn test_directional_derivative_is_point_free() {
        let lmi = box_lmi();
        let d = DVector::from_vec(vec![2.0, -3.0]);
        let b = lmi.directional_derivative(&d).unwrap();
        assert!((b[(0, 0)] - 2.0).abs() < 1e-15);
        assert!((b[(1, 1)] + 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_dimension_mismatch() {
        let lmi = box_lmi();
        assert!(matches!(
            lmi.evaluate(&DVector::from_vec(vec![1.0])),
            Err(SamplerError::DimensionMismatch(_))
        ));
        assert!(matches!(
            lmi.directional_derivative(&DVector::from_vec(vec![1.0, 2.0, 3.0])),
            Err(SamplerError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_asymmetric() {
        let mut bad = DMatrix::identity(2, 2);
        bad[(0, 1)] = 0.5;
        let res = Lmi::new(DMatrix::identity(2, 2), vec![bad]);
        assert!(matches!(res, Err(SamplerError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let res = Lmi::new(DMatrix::identity(2, 2), vec![DMatrix::identity(3, 3)]);
        assert!(matches!(res, Err(SamplerError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rejects_empty_coefficients() {
        let res = Lmi::new(DMatrix::identity(2, 2), vec![]);
        assert!(res.is_err());
    }

    #[test]
    fn test_from_sparse_matches_dense() {
        let mut tri = sprs::TriMat::new((2, 2));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(1, 1, 1.0);
        let a0 = tri.to_csc();

        let mut tri = sprs::TriMat::new((2, 2));
        tri.add_triplet(0, 1, 2.0);
        let a1 = tri.to_csc();

        let lmi = Lmi::from_sparse(&a0, &[a1]).unwrap();
        let a = lmi.evaluate(&DVector::from_vec(vec![1.0])).unwrap();
        // off-diagonal entry mirrored into both triangles
        assert!((a[(0, 1)] + 2.0).abs() < 1e-15);
        assert!((a[(1, 0)] + 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_contains() {
        let spec = Spectrahedron::new(box_lmi());
        assert!(spec
            .contains(&DVector::from_vec(vec![0.0, 0.0]), 1e-12)
            .unwrap());
        assert!(!spec
            .contains(&DVector::from_vec(vec![2.0, 0.0]), 1e-12)
            .unwrap());
        // boundary point passes within tolerance
        assert!(spec
            .contains(&DVector::from_vec(vec![1.0, 0.0]), 1e-12)
            .unwrap());
    }

    #[test]
    fn test_settings_validate() {
        let settings = SamplerSettings::default();
        assert!(settings.validate().is_ok());

        let mut bad = SamplerSettings::default();
        bad.boundary_backoff = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = SamplerSettings::default();
        bad.num_samples = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_result_to_matrix() {
        let result = SampleResult {
            points: vec![
                DVector::from_vec(vec![1.0, 2.0]),
                DVector::from_vec(vec![3.0, 4.0]),
            ],
            info: SampleInfo {
                preprocess_time_ms: 0,
                sample_time_ms: 0,
                total_reflections: 0,
                degraded_samples: 0,
                inner_radius: 0.0,
                diameter: 0.0,
                rounded: false,
            },
        };
        let m = result.to_matrix();
        assert_eq!((m.nrows(), m.ncols()), (2, 2));
        assert_eq!(m[(1, 0)], 3.0);
    }
}
