//! Sampling driver: preprocessing plus repeated walk invocations.
//!
//! Both entry points follow the same shape: validate, preprocess once,
//! then emit `num_samples` points, each after `steps_per_sample` chained
//! walk invocations. Walk state never outlives one invocation; the
//! spectrahedron is read-only throughout, so failures in one sample
//! cannot corrupt another.

use std::time::Instant;

use nalgebra::DVector;
use rand::Rng;

use crate::error::{SamplerError, SamplerResult};
use crate::presolve::{self, Preprocess};
use crate::problem::{SampleInfo, SampleResult, SamplerSettings, Spectrahedron};
use crate::walks::{BilliardWalk, BoltzmannHmcWalk, WalkOutcome};

/// Sample approximately uniformly with the billiard walk.
pub fn sample_uniform<R: Rng + ?Sized>(
    spec: &Spectrahedron,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SamplerResult<SampleResult> {
    settings.validate()?;

    let t0 = Instant::now();
    let (work, pre) = presolve::prepare(spec, settings, rng)?;
    let preprocess_time_ms = t0.elapsed().as_millis() as u64;
    log_preprocess(settings, &pre);

    let walk = BilliardWalk::new(pre.diameter, settings.max_reflections, settings.boundary_tol);
    run_loop(&work, &pre, settings, preprocess_time_ms, |spec, point, rng| {
        walk.run(spec, point, rng)
    }, rng)
}

/// Sample from the Boltzmann density exp(-⟨c, x⟩ / T) with the HMC walk.
///
/// `total_time` defaults to twice the diameter estimate when not given.
pub fn sample_boltzmann<R: Rng + ?Sized>(
    spec: &Spectrahedron,
    objective: &DVector<f64>,
    temperature: f64,
    total_time: Option<f64>,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SamplerResult<SampleResult> {
    settings.validate()?;
    if objective.len() != spec.ambient_dim() {
        return Err(SamplerError::DimensionMismatch(format!(
            "objective has length {}, expected {}",
            objective.len(),
            spec.ambient_dim()
        )));
    }

    let t0 = Instant::now();
    let (work, pre) = presolve::prepare(spec, settings, rng)?;
    let preprocess_time_ms = t0.elapsed().as_millis() as u64;
    log_preprocess(settings, &pre);

    // the potential follows the coordinate change
    let objective_work = match &pre.rounding {
        Some(tr) => tr.pullback_objective(objective),
        None => objective.clone(),
    };
    let time = total_time.unwrap_or(2.0 * pre.diameter);
    let walk = BoltzmannHmcWalk::from_settings(objective_work, temperature, time, settings)?;
    run_loop(&work, &pre, settings, preprocess_time_ms, |spec, point, rng| {
        walk.run(spec, point, rng)
    }, rng)
}

fn run_loop<R, F>(
    work: &Spectrahedron,
    pre: &Preprocess,
    settings: &SamplerSettings,
    preprocess_time_ms: u64,
    mut step: F,
    rng: &mut R,
) -> SamplerResult<SampleResult>
where
    R: Rng + ?Sized,
    F: FnMut(&Spectrahedron, &DVector<f64>, &mut R) -> SamplerResult<WalkOutcome>,
{
    let t0 = Instant::now();
    let steps = settings.steps_per_sample.max(1);
    let mut point = pre.interior_point.clone();
    let mut points = Vec::with_capacity(settings.num_samples);
    let mut total_reflections = 0;
    let mut degraded_samples = 0;

    for _ in 0..settings.num_samples {
        let mut sample_truncated = false;
        for _ in 0..steps {
            let out = step(work, &point, rng)?;
            point = out.point;
            total_reflections += out.reflections;
            sample_truncated |= out.truncated;
        }
        if sample_truncated {
            degraded_samples += 1;
        }
        points.push(match &pre.rounding {
            Some(tr) => tr.to_original(&point),
            None => point.clone(),
        });
    }

    let info = SampleInfo {
        preprocess_time_ms,
        sample_time_ms: t0.elapsed().as_millis() as u64,
        total_reflections,
        degraded_samples,
        inner_radius: pre.inner_radius,
        diameter: pre.diameter,
        rounded: pre.rounding.is_some(),
    };
    if settings.verbose {
        eprintln!(
            "sampling: {} points, {} reflections, {} degraded, {} ms",
            points.len(),
            info.total_reflections,
            info.degraded_samples,
            info.sample_time_ms
        );
    }
    Ok(SampleResult { points, info })
}

fn log_preprocess(settings: &SamplerSettings, pre: &Preprocess) {
    if settings.verbose {
        eprintln!(
            "presolve: inner_radius={:.3e} diameter={:.3e} rounded={}",
            pre.inner_radius,
            pre.diameter,
            pre.rounding.is_some()
        );
    }
}
