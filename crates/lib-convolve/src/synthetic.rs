//! Seeded synthetic spectra for tests.
//!
//! A spectrum is a noiseless `signal`, a `noisy` realization with Poisson
//! shot noise plus optional Gaussian constant noise, and the theoretical
//! per-sample `noise` standard deviation `sqrt(signal + sigma_const²)`.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};

pub struct SyntheticSpectrum {
    signal: Array1<f64>,
    noisy: Array1<f64>,
    noise: Array1<f64>,
}

impl SyntheticSpectrum {
    /// Apply shot noise and constant noise of standard deviation
    /// `const_noise` to `signal`.
    pub fn new(signal: Array1<f64>, const_noise: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, const_noise).expect("valid noise level");

        let noisy = signal.mapv(|s| {
            let counts = if s > 0.0 {
                Poisson::new(s).expect("positive rate").sample(&mut rng)
            } else {
                0.0
            };
            counts + normal.sample(&mut rng)
        });
        let noise = signal.mapv(|s| (s.max(0.0) + const_noise * const_noise).sqrt());

        Self {
            signal,
            noisy,
            noise,
        }
    }

    /// Gaussian emission line on a flat continuum, shot noise only.
    pub fn gaussian_line(
        len: usize,
        amplitude: f64,
        center: f64,
        sigma: f64,
        continuum: f64,
        seed: u64,
    ) -> Self {
        let signal = Array1::from_shape_fn(len, |i| {
            let d = i as f64 - center;
            continuum + amplitude * (-(d * d) / (2.0 * sigma * sigma)).exp()
        });
        Self::new(signal, 0.0, seed)
    }

    pub fn signal(&self) -> Array1<f64> {
        self.signal.clone()
    }

    pub fn noisy(&self) -> Array1<f64> {
        self.noisy.clone()
    }

    pub fn noise(&self) -> Array1<f64> {
        self.noise.clone()
    }
}

/// Random mask with each sample masked with probability `fraction`.
pub fn random_mask(len: usize, fraction: f64, seed: u64) -> Array1<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array1::from_shape_fn(len, |_| rng.random_bool(fraction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_reproducible() {
        let a = SyntheticSpectrum::gaussian_line(50, 400.0, 25.0, 3.0, 100.0, 5);
        let b = SyntheticSpectrum::gaussian_line(50, 400.0, 25.0, 3.0, 100.0, 5);
        assert_eq!(a.noisy(), b.noisy());
        assert_eq!(random_mask(50, 0.3, 9), random_mask(50, 0.3, 9));
    }

    #[test]
    fn test_noise_model() {
        let spectrum = SyntheticSpectrum::new(Array1::from_elem(4, 100.0), 3.0, 1);
        for &n in spectrum.noise().iter() {
            assert!((n - 109.0f64.sqrt()).abs() < 1e-12);
        }
        assert_eq!(spectrum.signal(), Array1::from_elem(4, 100.0));
    }

    #[test]
    fn test_shot_noise_scatter() {
        let spectrum = SyntheticSpectrum::new(Array1::from_elem(20_000, 400.0), 0.0, 2);
        let noisy = spectrum.noisy();
        let mean = noisy.mean().unwrap();
        let std = noisy.std(1.0);
        assert!((mean - 400.0).abs() < 1.0);
        assert!((std - 20.0).abs() < 1.0);
    }
}
