use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{DdpgError, Result};

/// Gradients of a loss with respect to one layer's parameters
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

#[derive(Clone, Debug)]
struct ForwardCache {
    inputs: Array2<f32>,
    pre_activation: Array2<f32>,
}

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    #[serde(skip)]
    cache: Option<ForwardCache>,
}

impl DenseLayer {
    /// Create a new dense layer, drawing its parameters from `rng`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let weights = init.initialize_weights((input_size, output_size), rng)?;
        let biases = init.initialize_biases(input_size, output_size, rng)?;
        Ok(DenseLayer {
            weights,
            biases,
            activation,
            cache: None,
        })
    }

    /// Build a layer from explicit parameters.
    pub fn from_parameters(
        weights: Array2<f32>,
        biases: Array1<f32>,
        activation: Activation,
    ) -> Result<Self> {
        if weights.ncols() != biases.len() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} biases", weights.ncols()),
                format!("{} biases", biases.len()),
            ));
        }
        Ok(DenseLayer {
            weights,
            biases,
            activation,
            cache: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Inference-mode forward pass; leaves the backprop cache untouched.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Training-mode forward pass; remembers what backward needs.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let pre_activation = self.affine(inputs);
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        self.cache = Some(ForwardCache {
            inputs: inputs.to_owned(),
            pre_activation,
        });
        outputs
    }

    /// Backpropagate `output_errors` (dL/d output) through the layer.
    ///
    /// Returns dL/d input together with the parameter gradients.
    pub fn backward_batch(
        &self,
        output_errors: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, LayerGradients)> {
        let cache = self.cache.as_ref().ok_or_else(|| {
            DdpgError::TrainingError(
                "backward_batch() called without a preceding forward_batch()".to_string(),
            )
        })?;
        if output_errors.dim() != cache.pre_activation.dim() {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", cache.pre_activation.dim()),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let activation_deriv = self.activation.derivative_batch(cache.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = cache.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_errors = adjusted_error.dot(&self.weights.t());

        Ok((
            input_errors,
            LayerGradients {
                weights: weight_gradients,
                biases: bias_gradients,
            },
        ))
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_layer() -> DenseLayer {
        DenseLayer::from_parameters(
            array![[1.0, 2.0], [3.0, 4.0]],
            array![0.5, -0.5],
            Activation::Linear,
        )
        .unwrap()
    }

    #[test]
    fn test_predict_matches_forward() {
        let mut layer = linear_layer();
        let x = array![[1.0, 1.0]];
        assert_eq!(layer.predict(x.view()), layer.forward_batch(x.view()));
        assert_eq!(layer.predict(x.view()), array![[4.5, 5.5]]);
    }

    #[test]
    fn test_backward_requires_forward() {
        let layer = linear_layer();
        assert!(layer.backward_batch(array![[1.0, 1.0]].view()).is_err());
    }

    #[test]
    fn test_backward_gradients() {
        let mut layer = linear_layer();
        layer.forward_batch(array![[1.0, 2.0]].view());
        let (input_grad, grads) = layer.backward_batch(array![[1.0, 0.0]].view()).unwrap();
        assert_eq!(grads.weights, array![[1.0, 0.0], [2.0, 0.0]]);
        assert_eq!(grads.biases, array![1.0, 0.0]);
        assert_eq!(input_grad, array![[1.0, 3.0]]);
    }
}
