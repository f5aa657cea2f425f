//! End-to-end walk and driver tests on a 2D disk spectrahedron.

use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use spectra_core::{
    sample_boltzmann, sample_uniform, BilliardWalk, BoltzmannHmcWalk, Lmi, SamplerSettings,
    Spectrahedron,
};

fn disk_spec() -> Spectrahedron {
    // A(x) = [[1 - x1, -x2], [-x2, 1 + x1]]: the closed unit disk
    Spectrahedron::new(
        Lmi::new(
            DMatrix::identity(2, 2),
            vec![
                DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]),
                DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]),
            ],
        )
        .unwrap(),
    )
}

fn fast_settings() -> SamplerSettings {
    let mut settings = SamplerSettings::default();
    settings.rounding = false;
    settings.num_samples = 50;
    settings.steps_per_sample = 2;
    settings
}

// ============================================================================
// Billiard walk
// ============================================================================

#[test]
fn test_billiard_chain_stays_feasible() {
    let spec = disk_spec();
    let walk = BilliardWalk::new(2.0, 100, 1e-10);
    let mut rng = ChaCha8Rng::seed_from_u64(101);
    let mut point = DVector::from_vec(vec![0.0, 0.0]);
    for i in 0..200 {
        let out = walk.run(&spec, &point, &mut rng).unwrap();
        point = out.point;
        assert!(
            spec.contains(&point, 1e-8).unwrap(),
            "walk left the body at step {}: {:?}",
            i,
            point
        );
        assert!((out.direction.norm() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_billiard_radial_distribution_is_nondegenerate() {
    let spec = disk_spec();
    let walk = BilliardWalk::new(2.0, 100, 1e-10);
    let mut rng = ChaCha8Rng::seed_from_u64(202);
    let start = DVector::from_vec(vec![0.0, 0.0]);

    let mut inner = 0usize;
    let mut outer = 0usize;
    for _ in 0..1000 {
        // independent invocations from a fixed interior point
        let out = walk.run(&spec, &start, &mut rng).unwrap();
        let r = out.point.norm();
        assert!(r <= 1.0 + 1e-8, "sample outside the disk: r = {}", r);
        if r < 0.5 {
            inner += 1;
        } else {
            outer += 1;
        }
    }
    // no collapse to the center or to the boundary
    assert!(inner > 50, "only {} of 1000 samples with r < 0.5", inner);
    assert!(outer > 50, "only {} of 1000 samples with r >= 0.5", outer);
}

// ============================================================================
// Boltzmann-HMC walk
// ============================================================================

#[test]
fn test_hmc_chain_stays_feasible() {
    let spec = disk_spec();
    let walk = BoltzmannHmcWalk::from_settings(
        DVector::from_vec(vec![1.0, 0.0]),
        1.0,
        2.0,
        &SamplerSettings::default(),
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(303);
    let mut point = DVector::from_vec(vec![0.0, 0.0]);
    for i in 0..200 {
        let out = walk.run(&spec, &point, &mut rng).unwrap();
        point = out.point;
        assert!(
            spec.contains(&point, 1e-6).unwrap(),
            "walk left the body at step {}: {:?}",
            i,
            point
        );
    }
}

#[test]
fn test_hmc_drifts_against_objective() {
    // exp(-x1 / T) with a cold temperature concentrates at small x1
    let spec = disk_spec();
    let walk = BoltzmannHmcWalk::from_settings(
        DVector::from_vec(vec![1.0, 0.0]),
        0.2,
        4.0,
        &SamplerSettings::default(),
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(404);
    let mut point = DVector::from_vec(vec![0.0, 0.0]);
    let mut mean_x1 = 0.0;
    let count = 300;
    for _ in 0..count {
        let out = walk.run(&spec, &point, &mut rng).unwrap();
        point = out.point;
        mean_x1 += point[0];
    }
    mean_x1 /= count as f64;
    assert!(
        mean_x1 < 0.15,
        "Boltzmann samples show no drift toward -x1: mean {}",
        mean_x1
    );
}

// ============================================================================
// Driver entry points
// ============================================================================

#[test]
fn test_sample_uniform_end_to_end() {
    let spec = disk_spec();
    let settings = fast_settings();
    let mut rng = ChaCha8Rng::seed_from_u64(505);
    let result = sample_uniform(&spec, &settings, &mut rng).unwrap();

    assert_eq!(result.points.len(), settings.num_samples);
    for p in &result.points {
        assert!(spec.contains(p, 1e-7).unwrap(), "infeasible sample {:?}", p);
    }
    let m = result.to_matrix();
    assert_eq!((m.nrows(), m.ncols()), (settings.num_samples, 2));
    assert!(result.info.diameter > 0.0);
    assert!(result.info.inner_radius > 0.0);
    assert!(!result.info.rounded);
}

#[test]
fn test_sample_uniform_with_rounding_end_to_end() {
    let spec = disk_spec();
    let mut settings = fast_settings();
    settings.rounding = true;
    settings.rounding_walks = 30;
    let mut rng = ChaCha8Rng::seed_from_u64(606);
    let result = sample_uniform(&spec, &settings, &mut rng).unwrap();

    assert!(result.info.rounded);
    // delivered points are in the original coordinates
    for p in &result.points {
        assert!(spec.contains(p, 1e-7).unwrap(), "infeasible sample {:?}", p);
    }
}

#[test]
fn test_sample_uniform_is_reproducible() {
    let spec = disk_spec();
    let settings = fast_settings();
    let a = sample_uniform(&spec, &settings, &mut ChaCha8Rng::seed_from_u64(707)).unwrap();
    let b = sample_uniform(&spec, &settings, &mut ChaCha8Rng::seed_from_u64(707)).unwrap();
    assert_eq!(a.points.len(), b.points.len());
    for (pa, pb) in a.points.iter().zip(b.points.iter()) {
        assert!((pa - pb).norm() < 1e-15, "sequences diverge under one seed");
    }
}

#[test]
fn test_sample_boltzmann_end_to_end() {
    let spec = disk_spec();
    let settings = fast_settings();
    let mut rng = ChaCha8Rng::seed_from_u64(808);
    let objective = DVector::from_vec(vec![1.0, 0.0]);
    let result =
        sample_boltzmann(&spec, &objective, 0.5, None, &settings, &mut rng).unwrap();

    assert_eq!(result.points.len(), settings.num_samples);
    for p in &result.points {
        assert!(spec.contains(p, 1e-6).unwrap(), "infeasible sample {:?}", p);
    }
}

#[test]
fn test_sample_boltzmann_rejects_bad_objective() {
    let spec = disk_spec();
    let settings = fast_settings();
    let mut rng = ChaCha8Rng::seed_from_u64(909);
    let objective = DVector::from_vec(vec![1.0, 0.0, 0.0]);
    assert!(sample_boltzmann(&spec, &objective, 1.0, None, &settings, &mut rng).is_err());
}
