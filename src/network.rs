use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView2, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::device::Device;
use crate::error::{DdpgError, Result};
use crate::layers::{DenseLayer, LayerGradients, WeightInit};

/// Per-layer parameter gradients, ordered input layer first.
pub type Gradients = Vec<LayerGradients>;

/// A feed-forward stack of dense layers with manual backpropagation.
///
/// `predict` is the inference path and never records intermediate values.
/// `forward_batch` is the training path; it must precede `backward_batch`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and activations.
    ///
    /// Hidden layers use `hidden_init`, the last layer uses `output_init`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        hidden_init: WeightInit,
        output_init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DdpgError::invalid_parameter(
                "layer_sizes".to_string(),
                "network needs at least an input and an output size".to_string(),
            ));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(DdpgError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }

        let last = activations.len() - 1;
        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .enumerate()
            .map(|(i, (window, &activation))| {
                let init = if i == last { output_init } else { hidden_init };
                DenseLayer::new(window[0], window[1], activation, init, rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.output_size()).unwrap_or(0)
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Inference-mode forward pass for a batch.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.predict(current.view());
        }
        Ok(current)
    }

    /// Training-mode forward pass for a batch.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    /// Backpropagate dL/d output through the network.
    ///
    /// Returns the parameter gradients and dL/d input.
    pub fn backward_batch(
        &self,
        output_errors: ArrayView2<f32>,
    ) -> Result<(Gradients, Array2<f32>)> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for layer in self.layers.iter().rev() {
            let (input_error, layer_gradients) = layer.backward_batch(current_error.view())?;
            gradients.push(layer_gradients);
            current_error = input_error;
        }

        gradients.reverse();
        Ok((gradients, current_error))
    }

    /// Blend parameters towards `source`: `self ← τ·source + (1−τ)·self`.
    pub fn soft_update_from(
        &mut self,
        source: &NeuralNetwork,
        tau: f32,
        device: Device,
    ) -> Result<()> {
        self.check_same_shape(source)?;
        for (target, local) in self.layers.iter_mut().zip(source.layers.iter()) {
            blend(&mut target.weights, &local.weights, tau, device);
            blend(&mut target.biases, &local.biases, tau, device);
        }
        Ok(())
    }

    /// Overwrite every parameter with the corresponding one from `source`.
    pub fn hard_update_from(&mut self, source: &NeuralNetwork) -> Result<()> {
        self.check_same_shape(source)?;
        for (target, local) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights.assign(&local.weights);
            target.biases.assign(&local.biases);
        }
        Ok(())
    }

    /// Replace this network's parameters with those of `other`, keeping the architecture check.
    pub fn load_parameters(&mut self, other: NeuralNetwork) -> Result<()> {
        self.check_same_shape(&other)?;
        self.layers = other.layers;
        Ok(())
    }

    pub fn clear_cache(&mut self) {
        for layer in &mut self.layers {
            layer.clear_cache();
        }
    }

    /// Save the network's parameters to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network from a file written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = bincode::deserialize(&data)?;
        Ok(network)
    }

    fn check_input(&self, columns: usize) -> Result<()> {
        if columns != self.input_size() {
            return Err(DdpgError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", columns),
            ));
        }
        Ok(())
    }

    fn check_same_shape(&self, other: &NeuralNetwork) -> Result<()> {
        // A deserialized layer's biases need not agree with its own weights.
        let shape = |n: &NeuralNetwork| {
            n.layers
                .iter()
                .map(|l| (l.weights.dim(), l.biases.len(), l.activation))
                .collect::<Vec<_>>()
        };
        let (mine, theirs) = (shape(self), shape(other));
        if mine != theirs {
            return Err(DdpgError::dimension_mismatch(
                format!("{:?}", mine),
                format!("{:?}", theirs),
            ));
        }
        Ok(())
    }
}

fn blend<D: ndarray::Dimension>(
    target: &mut ndarray::Array<f32, D>,
    local: &ndarray::Array<f32, D>,
    tau: f32,
    device: Device,
) {
    let zip = Zip::from(target).and(local);
    match device {
        Device::Cpu => zip.for_each(|t, &l| *t = tau * l + (1.0 - tau) * *t),
        Device::Parallel => zip.par_for_each(|t, &l| *t = tau * l + (1.0 - tau) * *t),
    }
}
