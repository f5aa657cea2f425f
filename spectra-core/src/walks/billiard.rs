//! Billiard walk: straight segments with specular boundary reflections.
//!
//! One invocation samples a path length from an exponential distribution
//! scaled by the body's diameter estimate, then travels in a straight
//! line, reflecting off the boundary until the length budget runs out.
//! The emitted point is one sample; the final direction can seed a
//! chained invocation.

use nalgebra::DVector;
use rand::Rng;

use super::{random_direction, WalkOutcome, WalkState};
use crate::error::SamplerResult;
use crate::oracle::{self, ray, BilliardOracleCache};
use crate::problem::Spectrahedron;

/// Billiard walk parameters, fixed for a sampling session.
#[derive(Debug, Clone)]
pub struct BilliardWalk {
    /// Scales the exponential path-length draw
    pub diameter: f64,
    /// Reflection cutoff per invocation
    pub max_reflections: usize,
    /// Shared boundary tolerance
    pub boundary_tol: f64,
    /// Fraction of the oracle distance actually traveled on reflection
    pub backoff: f64,
}

impl BilliardWalk {
    /// Walk with the default interior back-off.
    pub fn new(diameter: f64, max_reflections: usize, boundary_tol: f64) -> Self {
        Self {
            diameter,
            max_reflections,
            boundary_tol,
            backoff: 1.0 - 1e-6,
        }
    }

    /// One invocation: random direction, exponential length draw.
    pub fn run<R: Rng + ?Sized>(
        &self,
        spec: &Spectrahedron,
        start: &DVector<f64>,
        rng: &mut R,
    ) -> SamplerResult<WalkOutcome> {
        let direction = random_direction(spec.ambient_dim(), rng);
        let u: f64 = rng.gen();
        let length = -self.diameter * (1.0 - u).ln();
        self.run_with(spec, start, direction, length)
    }

    /// One invocation with an externally supplied direction and length.
    ///
    /// A zero length returns the starting point unchanged. The direction
    /// must be a unit vector for the length budget to be meaningful.
    pub fn run_with(
        &self,
        spec: &Spectrahedron,
        start: &DVector<f64>,
        direction: DVector<f64>,
        length: f64,
    ) -> SamplerResult<WalkOutcome> {
        let mut state = WalkState::new(start.clone(), direction, length);
        let mut cache = BilliardOracleCache::new(spec, &state.point)?;
        let mut truncated = false;

        while state.remaining > 0.0 {
            let deriv = spec.lmi().directional_derivative(&state.direction)?;
            let t_exit = ray::first_exit_with(cache.lmi_at_p(), &deriv, self.boundary_tol)?;

            if state.remaining <= t_exit * self.backoff {
                // the segment ends strictly inside: finish the walk here
                let step = state.remaining;
                state.point += &state.direction * step;
                cache.advance(&deriv, step);
                state.remaining = 0.0;
                break;
            }

            if state.reflections >= self.max_reflections {
                truncated = true;
                break;
            }

            // advance to just inside the boundary, then reflect
            let step = t_exit * self.backoff;
            state.point += &state.direction * step;
            cache.advance(&deriv, step);
            state.remaining -= step;

            let normal = oracle::boundary_normal(spec.lmi(), cache.lmi_at_p())?;
            state.direction = oracle::reflect(&state.direction, &normal);
            state.reflections += 1;
        }

        Ok(WalkOutcome {
            point: state.point,
            direction: state.direction,
            reflections: state.reflections,
            truncated,
        })
    }
}
