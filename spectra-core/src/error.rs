//! Error types for the sampler.

use thiserror::Error;

/// Errors that can occur while constructing or sampling a spectrahedron.
///
/// Reflection-budget exhaustion inside a walk is deliberately *not* an
/// error: the walker emits a best-effort point and the run's
/// `degraded_samples` counter is incremented instead.
#[derive(Error, Debug)]
pub enum SamplerError {
    /// Malformed LMI data or a mis-sized point/direction argument
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Preprocessing found no strictly interior point
    #[error("no strictly feasible point found after {iters} iterations")]
    Infeasible {
        /// Iteration budget that was exhausted
        iters: usize,
    },

    /// The boundary oracle found no positive crossing along the queried
    /// ray. Spectrahedra are assumed bounded, so this signals a malformed
    /// instance or an inconsistent rounding transform.
    #[error("spectrahedron is unbounded along the queried direction")]
    UnboundedDirection,

    /// Eigendecomposition or factorization breakdown
    #[error("numerical error: {0}")]
    Numerical(String),
}

/// Result type for sampler operations.
pub type SamplerResult<T> = Result<T, SamplerError>;
