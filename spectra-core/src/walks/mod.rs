//! Random walks over the spectrahedron.
//!
//! Each walk invocation owns its state: a `WalkState` is created at the
//! start, mutated at every reflection, and discarded once the sample is
//! emitted. Nothing is shared across invocations except the read-only
//! spectrahedron and the caller's RNG stream, so independent samples can
//! be generated concurrently by giving each walker its own RNG.

pub mod billiard;
pub mod hmc;

pub use billiard::BilliardWalk;
pub use hmc::BoltzmannHmcWalk;

use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;

/// State carried across the reflections of a single walk invocation.
#[derive(Debug, Clone)]
pub struct WalkState {
    /// Current point
    pub point: DVector<f64>,
    /// Current direction (unit for the billiard walk, velocity for HMC)
    pub direction: DVector<f64>,
    /// Remaining path length (billiard) or simulated time (HMC)
    pub remaining: f64,
    /// Reflections performed so far in this invocation
    pub reflections: usize,
}

impl WalkState {
    /// Fresh state at the start of an invocation.
    pub fn new(point: DVector<f64>, direction: DVector<f64>, budget: f64) -> Self {
        Self {
            point,
            direction,
            remaining: budget,
            reflections: 0,
        }
    }
}

/// Result of one walk invocation.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// The emitted sample point
    pub point: DVector<f64>,
    /// Direction at emission, reusable for a chained invocation
    pub direction: DVector<f64>,
    /// Reflections performed
    pub reflections: usize,
    /// True when the reflection budget was exhausted and the point is a
    /// best-effort (degraded) sample
    pub truncated: bool,
}

/// Uniform direction on the unit sphere in R^n.
pub fn random_direction<R: Rng + ?Sized>(n: usize, rng: &mut R) -> DVector<f64> {
    loop {
        let d = DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal));
        let norm = d.norm();
        if norm > 1e-12 {
            return d / norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_direction_is_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let d = random_direction(5, &mut rng);
            assert!((d.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_random_direction_covers_signs() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut pos = 0;
        let mut neg = 0;
        for _ in 0..100 {
            let d = random_direction(3, &mut rng);
            if d[0] > 0.0 {
                pos += 1;
            } else {
                neg += 1;
            }
        }
        assert!(pos > 20 && neg > 20, "pos={} neg={}", pos, neg);
    }
}
