//! # Activation Functions Module
//!
//! Element-wise non-linearities used by the actor and critic networks.
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers
//! - **Tanh**: bounded to `[-1, 1]`, used by the actor output so actions stay legal
//! - **Linear**: identity, used by the critic output
//!
//! ## Usage Example
//!
//! ```rust
//! use ddpg::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5], [0.0, 2.0]];
//! Activation::Tanh.apply_batch(&mut data);
//! assert!(data.iter().all(|v| v.abs() <= 1.0));
//! ```

pub mod functions;

pub use functions::Activation;
