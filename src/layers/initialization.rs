use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DdpgError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Uniform in `±1/sqrt(fan_in)`, applied to weights and biases
    FanInUniform,

    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// Uniform distribution with custom range, applied to weights and biases
    Uniform { min: f32, max: f32 },
}

impl WeightInit {
    /// Initialize a `(fan_in, fan_out)` weight matrix from the given random source
    pub fn initialize_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        let (fan_in, fan_out) = shape;
        if fan_in == 0 || fan_out == 0 {
            return Err(DdpgError::invalid_parameter(
                "layer shape".to_string(),
                format!("layer dimensions must be non-zero, got {:?}", shape),
            ));
        }

        let weights = match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }
            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, checked_uniform(*min, *max)?, rng)
            }
        };
        Ok(weights)
    }

    /// Initialize the bias vector of a layer with `fan_in` inputs
    pub fn initialize_biases<R: Rng + ?Sized>(
        &self,
        fan_in: usize,
        size: usize,
        rng: &mut R,
    ) -> Result<Array1<f32>> {
        let biases = match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array1::random_using(size, Uniform::new(-limit, limit), rng)
            }
            WeightInit::Uniform { min, max } => {
                Array1::random_using(size, checked_uniform(*min, *max)?, rng)
            }
            WeightInit::XavierUniform => Array1::zeros(size),
        };
        Ok(biases)
    }
}

fn checked_uniform(min: f32, max: f32) -> Result<Uniform<f32>> {
    if !(min < max) || !min.is_finite() || !max.is_finite() {
        return Err(DdpgError::invalid_parameter(
            "weight_init".to_string(),
            format!("uniform range must satisfy min < max, got [{}, {})", min, max),
        ));
    }
    Ok(Uniform::new(min, max))
}
