//! Spectra: random-walk sampling over spectrahedra
//!
//! This library samples points from a spectrahedron, the feasible region
//! of a linear matrix inequality
//!
//! ```text
//! A(x) = A0 - x1*A1 - ... - xn*An  ⪰  0
//! ```
//!
//! with all matrices symmetric. Two geometric random walks are provided:
//!
//! - **Billiard walk**: straight segments with specular boundary
//!   reflections, targeting the uniform distribution over the body
//! - **Boltzmann-HMC walk**: parabolic trajectories under a linear
//!   potential exp(-⟨c, x⟩ / T), reflecting elastically at the boundary
//!
//! Both walks rest on a boundary oracle that answers "how far until
//! A(·) becomes singular" via eigenvalue computations on the matrix
//! pencil, plus a preprocessing pass that finds a strictly interior
//! starting point, estimates the body's inner radius and diameter, and
//! optionally rounds the coordinates for faster mixing.
//!
//! # Example
//!
//! ```ignore
//! use nalgebra::{DMatrix, DVector};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use spectra_core::{sample_uniform, Lmi, SamplerSettings, Spectrahedron};
//!
//! // the closed unit disk as a 2x2 LMI
//! let lmi = Lmi::new(
//!     DMatrix::identity(2, 2),
//!     vec![
//!         DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]),
//!         DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]),
//!     ],
//! )?;
//! let spec = Spectrahedron::new(lmi);
//!
//! let settings = SamplerSettings::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let result = sample_uniform(&spec, &settings, &mut rng)?;
//! println!("sampled {} points", result.points.len());
//! ```
//!
//! # References
//!
//! - Chalkis, Fisikopoulos et al.: sampling and volume computation for
//!   spectrahedra (the volesti line of work)
//! - Polyak, Gryazina: billiard walk for uniform sampling of convex
//!   bodies
//! - Chalkis, Fisikopoulos, Papachristou, Tsigaridas: Boltzmann sampling
//!   for semidefinite programming

#![warn(clippy::all)]

pub mod driver;
pub mod error;
pub mod linalg;
pub mod oracle;
pub mod presolve;
pub mod problem;
pub mod walks;

// Re-export main types
pub use driver::{sample_boltzmann, sample_uniform};
pub use error::{SamplerError, SamplerResult};
pub use presolve::{prepare, Preprocess, RoundingTransform};
pub use problem::{Lmi, SampleInfo, SampleResult, SamplerSettings, Spectrahedron};
pub use walks::{BilliardWalk, BoltzmannHmcWalk, WalkOutcome, WalkState};
