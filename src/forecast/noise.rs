//! Perturbation sources for the base predictors
//!
//! Predictors multiply every positive value by `1 + noise`. Production uses a
//! Gaussian generator; tests and deterministic runs use [`ZeroNoise`] or a
//! fixed seed.

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::ForecastError;

/// Default standard deviation of the multiplicative perturbation (5%)
pub const DEFAULT_NOISE_STD_DEV: f64 = 0.05;

/// Source of zero-mean multiplicative perturbations
#[cfg_attr(test, mockall::automock)]
pub trait NoiseSource {
    fn next_perturbation(&mut self) -> f64;
}

/// Always returns 0; forecasts become fully deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn next_perturbation(&mut self) -> f64 {
        0.0
    }
}

/// Normally distributed perturbation backed by its own RNG
pub struct GaussianNoise {
    rng: StdRng,
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Generator with a fixed seed (reproducible)
    pub fn seeded(seed: u64, std_dev: f64) -> Result<Self, ForecastError> {
        Self::with_rng(StdRng::seed_from_u64(seed), std_dev)
    }

    /// Generator seeded from OS entropy
    pub fn from_entropy(std_dev: f64) -> Result<Self, ForecastError> {
        Self::with_rng(StdRng::from_entropy(), std_dev)
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn new(seed: Option<u64>, std_dev: f64) -> Result<Self, ForecastError> {
        match seed {
            Some(seed) => Self::seeded(seed, std_dev),
            None => Self::from_entropy(std_dev),
        }
    }

    fn with_rng(rng: StdRng, std_dev: f64) -> Result<Self, ForecastError> {
        if !std_dev.is_finite() {
            return Err(ForecastError::InvalidNoise(format!(
                "standard deviation must be finite, got {std_dev}"
            )));
        }
        let normal = Normal::new(0.0, std_dev)
            .map_err(|e| ForecastError::InvalidNoise(format!("{e} (std_dev = {std_dev})")))?;
        Ok(Self { rng, normal })
    }
}

impl NoiseSource for GaussianNoise {
    fn next_perturbation(&mut self) -> f64 {
        self.normal.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_noise() {
        let mut noise = ZeroNoise;
        assert_eq!(noise.next_perturbation(), 0.0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = GaussianNoise::seeded(42, DEFAULT_NOISE_STD_DEV).unwrap();
        let mut b = GaussianNoise::seeded(42, DEFAULT_NOISE_STD_DEV).unwrap();
        for _ in 0..32 {
            assert_eq!(a.next_perturbation(), b.next_perturbation());
        }
    }

    #[test]
    fn test_gaussian_is_small_and_centered() {
        let mut noise = GaussianNoise::seeded(7, DEFAULT_NOISE_STD_DEV).unwrap();
        let samples: Vec<f64> = (0..10_000).map(|_| noise.next_perturbation()).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.005);
        assert!((var.sqrt() - DEFAULT_NOISE_STD_DEV).abs() < 0.005);
    }

    #[test]
    fn test_zero_std_dev_is_deterministic() {
        let mut noise = GaussianNoise::seeded(1, 0.0).unwrap();
        assert_eq!(noise.next_perturbation(), 0.0);
    }

    #[test]
    fn test_invalid_std_dev() {
        assert!(matches!(
            GaussianNoise::seeded(1, -0.1),
            Err(ForecastError::InvalidNoise(_))
        ));
        assert!(matches!(
            GaussianNoise::new(None, f64::NAN),
            Err(ForecastError::InvalidNoise(_))
        ));
    }
}
