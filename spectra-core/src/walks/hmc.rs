//! Boltzmann-HMC walk: parabolic trajectories under a linear potential.
//!
//! The target density is exp(-⟨c, x⟩ / T) restricted to the body, so the
//! simulated particle feels a constant acceleration -c/T and each
//! sub-interval of the trajectory is a parabola
//!
//! ```text
//! x(t) = p + t·v - t²/(2T)·c,     v(t) = v - (t/T)·c
//! ```
//!
//! On a boundary crossing the velocity is reflected elastically about
//! the supporting hyperplane; the walk ends when the total simulated
//! time is spent.

use nalgebra::DVector;
use rand::Rng;

use super::{random_direction, WalkOutcome, WalkState};
use crate::error::{SamplerError, SamplerResult};
use crate::oracle::{self, parabola, HmcOracleState};
use crate::problem::{SamplerSettings, Spectrahedron};

/// Boltzmann-HMC walk parameters, fixed for a sampling session.
#[derive(Debug, Clone)]
pub struct BoltzmannHmcWalk {
    /// Fixed objective ("gravity") direction c
    pub objective: DVector<f64>,
    /// Temperature T of the target density exp(-⟨c, x⟩ / T)
    pub temperature: f64,
    /// Total simulated time per invocation
    pub total_time: f64,
    /// Reflection cutoff per invocation
    pub max_reflections: usize,
    /// Shared boundary tolerance
    pub boundary_tol: f64,
    /// Relative pull-back from reflection points
    pub epsilon: f64,
}

impl BoltzmannHmcWalk {
    /// Walk taking its cutoffs and tolerances from the settings.
    pub fn from_settings(
        objective: DVector<f64>,
        temperature: f64,
        total_time: f64,
        settings: &SamplerSettings,
    ) -> SamplerResult<Self> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(SamplerError::Numerical(format!(
                "temperature must be positive, got {}",
                temperature
            )));
        }
        if !(total_time >= 0.0 && total_time.is_finite()) {
            return Err(SamplerError::Numerical(format!(
                "total time must be non-negative, got {}",
                total_time
            )));
        }
        Ok(Self {
            objective,
            temperature,
            total_time,
            max_reflections: settings.max_reflections,
            boundary_tol: settings.boundary_tol,
            epsilon: settings.hmc_epsilon,
        })
    }

    /// One invocation: random initial velocity, fixed time budget.
    ///
    /// A zero total time returns the starting point unchanged.
    pub fn run<R: Rng + ?Sized>(
        &self,
        spec: &Spectrahedron,
        start: &DVector<f64>,
        rng: &mut R,
    ) -> SamplerResult<WalkOutcome> {
        let velocity = random_direction(spec.ambient_dim(), rng);
        self.run_with(spec, start, velocity)
    }

    /// One invocation with an externally supplied initial velocity.
    pub fn run_with(
        &self,
        spec: &Spectrahedron,
        start: &DVector<f64>,
        velocity: DVector<f64>,
    ) -> SamplerResult<WalkOutcome> {
        let mut state = WalkState::new(start.clone(), velocity, self.total_time);
        let mut oracle_state = HmcOracleState::new(self.epsilon);
        let mut a_at_p = spec.lmi().evaluate(&state.point)?;
        let mut truncated = false;

        while state.remaining > 0.0 {
            let b_v = spec.lmi().directional_derivative(&state.direction)?;
            let b_c = oracle_state
                .force_matrix(spec.lmi(), &self.objective)?
                .clone();

            match parabola::parabolic_exit(
                &a_at_p,
                &b_v,
                &b_c,
                self.temperature,
                state.remaining,
                self.boundary_tol,
            ) {
                None => {
                    // the trajectory stays inside: integrate to the end
                    let t = state.remaining;
                    self.integrate(&mut state, t);
                    state.remaining = 0.0;
                }
                Some(t_hit) => {
                    if state.reflections >= self.max_reflections {
                        truncated = true;
                        break;
                    }
                    // stop a little short of the boundary so the next
                    // sub-interval does not instantly re-trigger
                    let t = t_hit * (1.0 - oracle_state.epsilon());
                    self.integrate(&mut state, t);
                    state.remaining -= t;

                    a_at_p = spec.lmi().evaluate(&state.point)?;
                    let normal = oracle::boundary_normal(spec.lmi(), &a_at_p)?;
                    state.direction = oracle::reflect(&state.direction, &normal);
                    state.reflections += 1;
                }
            }
            oracle_state.mark_stepped();
        }

        Ok(WalkOutcome {
            point: state.point,
            direction: state.direction,
            reflections: state.reflections,
            truncated,
        })
    }

    /// Advance position and velocity by a time step along the parabola.
    fn integrate(&self, state: &mut WalkState, t: f64) {
        let inv_t = 1.0 / self.temperature;
        state.point += &state.direction * t - &self.objective * (0.5 * t * t * inv_t);
        state.direction -= &self.objective * (t * inv_t);
    }
}
