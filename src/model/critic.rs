use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use super::{mlp_activations, ValueEstimator, OUTPUT_INIT};
use crate::activations::Activation;
use crate::error::{DdpgError, Result};
use crate::layers::WeightInit;
use crate::network::{Gradients, NeuralNetwork};

/// Action-value network over the concatenation `[state, action]`.
#[derive(Clone, Debug)]
pub struct Critic {
    network: NeuralNetwork,
    state_size: usize,
    action_size: usize,
}

impl Critic {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_size: usize,
        hidden_sizes: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        let mut sizes = vec![state_size + action_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(1);

        let activations = mlp_activations(hidden_sizes, Activation::Linear);
        let network = NeuralNetwork::new(
            &sizes,
            &activations,
            WeightInit::FanInUniform,
            OUTPUT_INIT,
            rng,
        )?;
        Self::from_network(network, state_size, action_size)
    }

    pub fn from_network(
        network: NeuralNetwork,
        state_size: usize,
        action_size: usize,
    ) -> Result<Self> {
        if network.input_size() != state_size + action_size || network.output_size() != 1 {
            return Err(DdpgError::dimension_mismatch(
                format!("{} -> 1", state_size + action_size),
                format!("{} -> {}", network.input_size(), network.output_size()),
            ));
        }
        Ok(Critic {
            network,
            state_size,
            action_size,
        })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    /// Training-mode forward pass, one value per row.
    pub fn forward_train(
        &mut self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        let inputs = self.join(states, actions)?;
        let values = self.network.forward_batch(inputs.view())?;
        Ok(values.index_axis_move(Axis(1), 0))
    }

    /// Backpropagate dL/dQ (one entry per row of the last `forward_train`).
    ///
    /// Returns the parameter gradients and dL/d action. Callers that only want
    /// the action gradient simply drop the parameter gradients; nothing is
    /// applied here.
    pub fn backward(&self, value_errors: ArrayView1<f32>) -> Result<(Gradients, Array2<f32>)> {
        let errors = value_errors.insert_axis(Axis(1));
        let (gradients, input_errors) = self.network.backward_batch(errors)?;
        let action_errors = input_errors.slice(s![.., self.state_size..]).to_owned();
        Ok((gradients, action_errors))
    }

    fn join(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        if states.ncols() != self.state_size
            || actions.ncols() != self.action_size
            || states.nrows() != actions.nrows()
        {
            return Err(DdpgError::dimension_mismatch(
                format!("(n, {}) states and (n, {}) actions", self.state_size, self.action_size),
                format!("{:?} states and {:?} actions", states.dim(), actions.dim()),
            ));
        }
        concatenate(Axis(1), &[states.view(), actions.view()])
            .map_err(|e| DdpgError::NumericalError(e.to_string()))
    }
}

impl ValueEstimator for Critic {
    fn estimate(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>> {
        let inputs = self.join(states, actions)?;
        let values = self.network.predict(inputs.view())?;
        Ok(values.index_axis_move(Axis(1), 0))
    }
}
