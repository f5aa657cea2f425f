//! Random LMI instance generation.
//!
//! Instances take A0 = I and dense random symmetric coefficients, so the
//! origin is always strictly interior. A nonzero combination of random
//! symmetric matrices is indefinite with overwhelming probability, which
//! makes the generated body bounded in every direction for m >= 2;
//! degenerate draws surface later as `UnboundedDirection` and are a
//! signal to re-seed, not a generator bug.

use nalgebra::DMatrix;
use rand::Rng;
use spectra_core::{Lmi, Spectrahedron};

/// Random spectrahedron with ambient dimension `n` and matrix side `m`.
pub fn random_spectrahedron<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Spectrahedron {
    let a0 = DMatrix::identity(m, m);
    let coeffs = (0..n).map(|_| random_symmetric(m, rng)).collect();
    let lmi = Lmi::new(a0, coeffs).expect("generated coefficients are symmetric by construction");
    Spectrahedron::new(lmi)
}

fn random_symmetric<R: Rng + ?Sized>(m: usize, rng: &mut R) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(m, m);
    for j in 0..m {
        for i in 0..=j {
            let v = rng.gen_range(-1.0..1.0);
            out[(i, j)] = v;
            out[(j, i)] = v;
        }
    }
    out
}
