//! # DDPG Agent Module
//!
//! The learning agent composes an actor-critic pair (each with a slowly
//! tracking target copy), a replay memory and an Ornstein-Uhlenbeck noise
//! process.
//!
//! ## Control cycle
//!
//! 1. [`DdpgAgent::act`]: actor-local in inference mode, plus scaled noise when
//!    exploring, clipped to the action bounds.
//! 2. The environment steps (outside this crate).
//! 3. [`DdpgAgent::step`]: store the transition; when the memory holds more than
//!    `batch_size` transitions and the cadence allows, sample and
//!    [`learn`](DdpgAgent::learn).
//!
//! ## One learn call
//!
//! 1. `y = r + γ · Q'(s', μ'(s')) · (1 − done)` with both target networks
//! 2. critic-local regression onto `y` (MSE), one optimizer step
//! 3. actor-local ascent on `Q(s, μ(s))` through the freshly updated critic,
//!    one optimizer step; critic parameters are left untouched here
//! 4. soft update of both targets with rate `τ`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ddpg::agent::{DdpgAgent, DdpgConfig};
//!
//! // Reacher-like sizes: 33 observations, 4 torques
//! let config = DdpgConfig::new(33, 4, 42).batch_size(128);
//! let mut agent = DdpgAgent::new(config).unwrap();
//! agent.reset_noise();
//! ```

mod config;
mod ddpg;

pub use config::DdpgConfig;
pub use ddpg::{bootstrapped_targets, DdpgAgent, LearnReport};
