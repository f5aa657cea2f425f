//! Benchmarking CLI for the spectra sampler.
//!
//! Usage: spectra-bench [n] [m] [samples] [sdpa-out]
//!
//! Generates a random spectrahedron instance, optionally exports it in
//! SDPA sparse format, then runs both walks and reports timing and
//! diagnostics. The RNG seed can be fixed with SPECTRA_SEED.

mod generator;
mod sdpa;

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use spectra_core::walks::random_direction;
use spectra_core::{sample_boltzmann, sample_uniform, SampleResult, SamplerSettings};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let n: usize = parse_arg(&args, 1, 10)?;
    let m: usize = parse_arg(&args, 2, 20)?;
    let samples: usize = parse_arg(&args, 3, 100)?;
    let seed: u64 = env::var("SPECTRA_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    println!("instance: n={} m={} samples={} seed={}", n, m, samples, seed);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spec = generator::random_spectrahedron(n, m, &mut rng);

    let objective = random_direction(n, &mut rng);
    if let Some(path) = args.get(4) {
        let file = File::create(path).with_context(|| format!("creating {}", path))?;
        let mut out = BufWriter::new(file);
        sdpa::write_sdpa(&mut out, spec.lmi(), objective.as_slice())
            .with_context(|| format!("writing SDPA data to {}", path))?;
        println!("wrote SDPA instance to {}", path);
    }

    let mut settings = SamplerSettings::default();
    settings.num_samples = samples;

    let start = Instant::now();
    let uniform = sample_uniform(&spec, &settings, &mut rng)
        .context("billiard walk sampling failed")?;
    let uniform_ms = start.elapsed().as_millis();
    report("billiard", &uniform, uniform_ms);

    let start = Instant::now();
    let boltzmann = sample_boltzmann(&spec, &objective, 1.0, None, &settings, &mut rng)
        .context("Boltzmann-HMC sampling failed")?;
    let boltzmann_ms = start.elapsed().as_millis();
    report("boltzmann-hmc", &boltzmann, boltzmann_ms);

    Ok(())
}

fn parse_arg(args: &[String], idx: usize, default: usize) -> Result<usize> {
    match args.get(idx) {
        Some(s) => s
            .parse()
            .with_context(|| format!("argument {} is not a number: {}", idx, s)),
        None => Ok(default),
    }
}

fn report(name: &str, result: &SampleResult, total_ms: u128) {
    let info = &result.info;
    println!(
        "{:>14}: {} points in {} ms (presolve {} ms, sampling {} ms)",
        name,
        result.points.len(),
        total_ms,
        info.preprocess_time_ms,
        info.sample_time_ms
    );
    println!(
        "{:>14}  reflections={} degraded={} inner_radius={:.3e} diameter={:.3e} rounded={}",
        "",
        info.total_reflections,
        info.degraded_samples,
        info.inner_radius,
        info.diameter,
        info.rounded
    );
}
