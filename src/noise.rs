//! Ornstein-Uhlenbeck exploration noise.
//!
//! Each call to [`OuNoise::sample`] advances the process by one step:
//!
//! ```text
//! x ← x + θ·(μ − x) + σ·N(0, 1)^d
//! ```
//!
//! The process owns its random stream, so a run is reproduced from the noise
//! seed alone, independently of how often the replay buffer is sampled.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{DdpgError, Result};

pub const DEFAULT_THETA: f32 = 0.15;
pub const DEFAULT_SIGMA: f32 = 0.2;

#[derive(Clone, Debug)]
pub struct OuNoise {
    mu: Array1<f32>,
    theta: f32,
    sigma: f32,
    state: Array1<f32>,
    rng: StdRng,
}

impl OuNoise {
    /// Zero-mean process with the usual DDPG parameters.
    pub fn new(size: usize, seed: u64) -> Result<Self> {
        Self::with_params(size, 0.0, DEFAULT_THETA, DEFAULT_SIGMA, seed)
    }

    pub fn with_params(size: usize, mu: f32, theta: f32, sigma: f32, seed: u64) -> Result<Self> {
        if size == 0 {
            return Err(DdpgError::invalid_parameter(
                "size".to_string(),
                "noise dimensionality must be positive".to_string(),
            ));
        }
        if !mu.is_finite() {
            return Err(DdpgError::invalid_parameter(
                "mu".to_string(),
                format!("must be finite, got {}", mu),
            ));
        }
        if !(theta >= 0.0 && theta.is_finite()) {
            return Err(DdpgError::invalid_parameter(
                "theta".to_string(),
                format!("must be >= 0, got {}", theta),
            ));
        }
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(DdpgError::invalid_parameter(
                "sigma".to_string(),
                format!("must be >= 0, got {}", sigma),
            ));
        }

        let mu = Array1::from_elem(size, mu);
        Ok(OuNoise {
            state: mu.clone(),
            mu,
            theta,
            sigma,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn size(&self) -> usize {
        self.state.len()
    }

    /// Current value of the process without advancing it.
    pub fn state(&self) -> &Array1<f32> {
        &self.state
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state.assign(&self.mu);
    }

    /// Advance the process one step and return the new state.
    pub fn sample(&mut self) -> Array1<f32> {
        let (theta, sigma) = (self.theta, self.sigma);
        let rng = &mut self.rng;
        ndarray::Zip::from(&mut self.state)
            .and(&self.mu)
            .for_each(|x, &mu| {
                let gaussian: f32 = StandardNormal.sample(&mut *rng);
                *x += theta * (mu - *x) + sigma * gaussian;
            });
        self.state.clone()
    }
}
