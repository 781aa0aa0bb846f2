use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{mlp_activations, Policy, OUTPUT_INIT};
use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::WeightInit;
use crate::network::{Gradients, NeuralNetwork};

/// Deterministic policy network.
///
/// The last layer is `tanh`, mapped affinely onto `[action_low, action_high]`.
#[derive(Clone, Debug)]
pub struct Actor {
    network: NeuralNetwork,
    action_low: f32,
    action_high: f32,
}

impl Actor {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        action_low: f32,
        action_high: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![state_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(action_size);

        let activations = mlp_activations(hidden_sizes, Activation::Tanh);
        let network = NeuralNetwork::new(
            &sizes,
            &activations,
            WeightInit::FanInUniform,
            OUTPUT_INIT,
            rng,
        )?;
        Self::from_network(network, action_low, action_high)
    }

    /// Wrap an existing network; its output layer must be `tanh`.
    pub fn from_network(network: NeuralNetwork, action_low: f32, action_high: f32) -> Result<Self> {
        if !(action_low < action_high) {
            return Err(DdpgError::invalid_parameter(
                "action range".to_string(),
                format!("low {} must be below high {}", action_low, action_high),
            ));
        }
        match network.layers.last().map(|l| l.activation) {
            Some(Activation::Tanh) => {}
            other => {
                return Err(DdpgError::invalid_parameter(
                    "actor output".to_string(),
                    format!("expected a Tanh output layer, found {:?}", other),
                ))
            }
        }
        Ok(Actor {
            network,
            action_low,
            action_high,
        })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    /// Training-mode forward pass.
    pub fn forward_train(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        let raw = self.network.forward_batch(states)?;
        Ok(self.scale(raw))
    }

    /// Backpropagate dL/d action (as produced by [`Actor::forward_train`]).
    pub fn backward(&self, action_errors: ArrayView2<f32>) -> Result<Gradients> {
        let raw_errors = &action_errors * self.half_range();
        let (gradients, _) = self.network.backward_batch(raw_errors.view())?;
        Ok(gradients)
    }

    fn half_range(&self) -> f32 {
        0.5 * (self.action_high - self.action_low)
    }

    fn scale(&self, mut raw: Array2<f32>) -> Array2<f32> {
        let (low, half) = (self.action_low, self.half_range());
        raw.mapv_inplace(|t| low + (t + 1.0) * half);
        raw
    }
}

impl Policy for Actor {
    fn actions(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        let raw = self.network.predict(states)?;
        Ok(self.scale(raw))
    }
}
