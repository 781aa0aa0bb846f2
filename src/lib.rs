//! # DDPG - Deep Deterministic Policy Gradient in Rust
//!
//! A self-contained implementation of the DDPG learning core for
//! continuous-control environments: actor and critic networks with target
//! copies, a bounded experience replay memory, Ornstein-Uhlenbeck exploration
//! noise and the update rules tying them together.
//!
//! The environment and the episode loop are left to the caller; the agent only
//! needs observations, rewards and termination flags in, and hands actions out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddpg::agent::{DdpgAgent, DdpgConfig};
//! use ndarray::Array1;
//!
//! let config = DdpgConfig::new(4, 2, 42).batch_size(64);
//! let mut agent = DdpgAgent::new(config).unwrap();
//!
//! let mut state = Array1::<f32>::zeros(4);
//! for _ in 0..1000 {
//!     let action = agent.act(state.view(), true).unwrap();
//!     // ... step your environment with `action` ...
//!     let (next_state, reward, done) = (state.clone(), 0.0, false);
//!     agent.step(state.view(), action.view(), reward, next_state.view(), done).unwrap();
//!     state = next_state;
//! }
//! agent.save_checkpoint("checkpoints").unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, ...)
//! - [`agent`] - The DDPG agent and its configuration
//! - [`checkpoint`] - Named actor/critic parameter artifacts
//! - [`device`] - Explicit compute device selection
//! - [`diagnostics`] - NaN/Inf detection in parameter sets
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Loss functions for training
//! - [`metrics`] - Bounded learning statistics
//! - [`model`] - Actor and critic function approximators
//! - [`network`] - Feed-forward network with manual backpropagation
//! - [`noise`] - Ornstein-Uhlenbeck exploration noise
//! - [`optimizer`] - Adam and SGD
//! - [`replay_buffer`] - Experience replay memory

pub mod activations;
pub mod agent;
pub mod checkpoint;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod network;
pub mod noise;
pub mod optimizer;
pub mod replay_buffer;

#[cfg(test)]
mod tests;
