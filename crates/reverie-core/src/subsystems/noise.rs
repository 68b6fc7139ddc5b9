//! Gaussian noise for subsystem perturbations.
//!
//! A small Box-Muller transform over uniform samples from any [`Rng`].
//! Each subsystem owns a seeded generator, so runs are reproducible for
//! a given world seed.

use rand::Rng;

/// Draw one sample from a normal distribution with the given mean and
/// standard deviation.
pub fn gaussian(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    // Box-Muller transform. The first uniform is floored away from zero
    // so the logarithm stays finite.
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = std::f64::consts::TAU * u2;
    radius.mul_add(theta.cos() * std_dev, mean)
}
