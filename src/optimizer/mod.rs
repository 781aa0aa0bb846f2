//! Gradient-descent optimizers with a fixed learning rate.
//!
//! An optimizer owns whatever per-parameter state it needs (Adam's moment
//! estimates) laid out exactly like the network it was created for, so each
//! network gets its own optimizer instance.

pub mod gradient_clipper;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{DdpgError, Result};
use crate::layers::{DenseLayer, LayerGradients};

pub use gradient_clipper::GradientClipper;

pub trait Optimizer {
    /// Apply one descent step to `layers` using `gradients` (one entry per layer).
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients]) -> Result<()>;

    fn learning_rate(&self) -> f32;
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients]) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(layers, gradients),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(layers, gradients),
        }
    }

    fn learning_rate(&self) -> f32 {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.learning_rate(),
            OptimizerWrapper::Adam(optimizer) => optimizer.learning_rate(),
        }
    }
}

/// Plain stochastic gradient descent
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD {
    pub learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> SGD {
        SGD { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients]) -> Result<()> {
        check_layout(layers, gradients)?;
        let lr = self.learning_rate;
        for (layer, grads) in layers.iter_mut().zip(gradients) {
            layer.weights.zip_mut_with(&grads.weights, |w, &g| *w -= lr * g);
            layer.biases.zip_mut_with(&grads.biases, |b, &g| *b -= lr * g);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

/// Adam with bias-corrected first and second moment estimates
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    /// Number of steps taken so far
    pub t: i32,
}

impl Adam {
    pub fn new(
        layers: &[DenseLayer],
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m_weights: layers.iter().map(|l| Array2::zeros(l.weights.dim())).collect(),
            v_weights: layers.iter().map(|l| Array2::zeros(l.weights.dim())).collect(),
            m_biases: layers.iter().map(|l| Array1::zeros(l.biases.dim())).collect(),
            v_biases: layers.iter().map(|l| Array1::zeros(l.biases.dim())).collect(),
            t: 0,
        }
    }

    pub fn default(layers: &[DenseLayer], learning_rate: f32) -> Self {
        Self::new(layers, learning_rate, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients]) -> Result<()> {
        check_layout(layers, gradients)?;
        if self.m_weights.len() != layers.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} layers of optimizer state", self.m_weights.len()),
                format!("{} layers", layers.len()),
            ));
        }

        self.t += 1;
        let (beta1, beta2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        let update = |param: &mut f32, m: &mut f32, v: &mut f32, g: f32| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / bias_correction1;
            let v_hat = *v / bias_correction2;
            *param -= lr * m_hat / (v_hat.sqrt() + eps);
        };

        for (i, (layer, grads)) in layers.iter_mut().zip(gradients).enumerate() {
            ndarray::Zip::from(&mut layer.weights)
                .and(&mut self.m_weights[i])
                .and(&mut self.v_weights[i])
                .and(&grads.weights)
                .for_each(|w, m, v, &g| update(w, m, v, g));
            ndarray::Zip::from(&mut layer.biases)
                .and(&mut self.m_biases[i])
                .and(&mut self.v_biases[i])
                .and(&grads.biases)
                .for_each(|b, m, v, &g| update(b, m, v, g));
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

fn check_layout(layers: &[DenseLayer], gradients: &[LayerGradients]) -> Result<()> {
    if layers.len() != gradients.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} layer gradients", layers.len()),
            format!("{} layer gradients", gradients.len()),
        ));
    }
    for (layer, grads) in layers.iter().zip(gradients) {
        if layer.weights.dim() != grads.weights.dim() || layer.biases.dim() != grads.biases.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", layer.weights.dim()),
                format!("{:?}", grads.weights.dim()),
            ));
        }
    }
    Ok(())
}
