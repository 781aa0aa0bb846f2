//! # Function Approximators
//!
//! The actor maps states to actions inside the legal action range; the critic
//! maps `(state, action)` pairs to a scalar value estimate. Both are thin
//! wrappers over [`NeuralNetwork`](crate::network::NeuralNetwork) that know
//! how to route gradients for the DDPG updates:
//!
//! - the critic is trained directly on an MSE loss;
//! - the actor is trained through the critic, using dQ/da from
//!   [`Critic::backward`] as its output error.
//!
//! The [`Policy`] and [`ValueEstimator`] traits expose the inference paths only,
//! which is all the bootstrapped target computation needs.

mod actor;
mod critic;

pub use actor::Actor;
pub use critic::Critic;

use ndarray::{Array1, Array2, ArrayView2};

use crate::error::Result;

/// Deterministic policy evaluated in inference mode.
pub trait Policy {
    fn actions(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;
}

/// State-action value function evaluated in inference mode.
pub trait ValueEstimator {
    fn estimate(&self, states: ArrayView2<f32>, actions: ArrayView2<f32>) -> Result<Array1<f32>>;
}

/// Hidden-layer activations followed by the given output activation.
pub(crate) fn mlp_activations(
    hidden_sizes: &[usize],
    output: crate::activations::Activation,
) -> Vec<crate::activations::Activation> {
    vec![crate::activations::Activation::Relu; hidden_sizes.len()]
        .into_iter()
        .chain(std::iter::once(output))
        .collect()
}

/// Initialisation of the output layer: small uniform weights so initial
/// outputs stay close to zero.
pub const OUTPUT_INIT: crate::layers::WeightInit =
    crate::layers::WeightInit::Uniform { min: -3e-3, max: 3e-3 };
