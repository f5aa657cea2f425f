//! Preprocessing: interior point, inner ball, and rounding.
//!
//! `prepare` runs once per sampling session, before the main walk loop.
//! It locates a strictly interior starting point, estimates the body's
//! inner-ball radius and diameter (used to size walk steps and time
//! budgets), and optionally replaces the working coordinates with
//! rounded ones so later walks mix with fewer reflections.

pub mod interior;
pub mod rounding;

pub use interior::find_interior_point;
pub use rounding::RoundingTransform;

use nalgebra::DVector;
use rand::Rng;

use crate::error::SamplerResult;
use crate::oracle::ray;
use crate::problem::{SamplerSettings, Spectrahedron};
use crate::walks::random_direction;

/// Derived quantities the walkers need, in working coordinates.
#[derive(Debug, Clone)]
pub struct Preprocess {
    /// Strictly interior starting point
    pub interior_point: DVector<f64>,
    /// Inner-ball radius estimate at the interior point
    pub inner_radius: f64,
    /// Diameter upper-bound estimate
    pub diameter: f64,
    /// Map from working (rounded) coordinates back to the original ones
    pub rounding: Option<RoundingTransform>,
}

/// Prepare a spectrahedron for sampling.
///
/// Returns the working spectrahedron (the rounded one when rounding is
/// enabled, otherwise a clone of the input) together with the derived
/// quantities, all expressed in the working coordinates. Any probe that
/// finds no boundary fails with `UnboundedDirection`: bounded bodies are
/// an assumption of the whole sampling scheme.
pub fn prepare<R: Rng + ?Sized>(
    spec: &Spectrahedron,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SamplerResult<(Spectrahedron, Preprocess)> {
    let p = find_interior_point(spec, settings.interior_max_iters, settings.interior_margin)?;
    let (inner_radius, diameter) = ball_probe(spec, &p, settings, rng)?;

    if !settings.rounding {
        return Ok((
            spec.clone(),
            Preprocess {
                interior_point: p,
                inner_radius,
                diameter,
                rounding: None,
            },
        ));
    }

    let (rounded, transform) = rounding::estimate(spec, &p, diameter, settings, rng)?;
    let p_rounded = transform.to_rounded(&p)?;
    // exit distances changed with the coordinates: probe again
    let (inner_radius, diameter) = ball_probe(&rounded, &p_rounded, settings, rng)?;
    Ok((
        rounded,
        Preprocess {
            interior_point: p_rounded,
            inner_radius,
            diameter,
            rounding: Some(transform),
        },
    ))
}

/// Chebyshev-style sampled estimate of the inner-ball radius and the
/// diameter: per direction the chord through p is the sum of the two
/// one-sided exits; the radius is the smallest one-sided exit seen and
/// the diameter twice the longest chord (slack for chords missing the
/// widest section).
fn ball_probe<R: Rng + ?Sized>(
    spec: &Spectrahedron,
    p: &DVector<f64>,
    settings: &SamplerSettings,
    rng: &mut R,
) -> SamplerResult<(f64, f64)> {
    let n = spec.ambient_dim();
    let a_at_p = spec.lmi().evaluate(p)?;
    let mut radius = f64::INFINITY;
    let mut max_chord = 0.0_f64;
    for _ in 0..settings.probe_directions.max(1) {
        let d = random_direction(n, rng);
        let b = spec.lmi().directional_derivative(&d)?;
        let forward = ray::first_exit_with(&a_at_p, &b, settings.boundary_tol)?;
        let backward = ray::first_exit_with(&a_at_p, &(-&b), settings.boundary_tol)?;
        radius = radius.min(forward.min(backward));
        max_chord = max_chord.max(forward + backward);
    }
    Ok((radius, 2.0 * max_chord))
}
