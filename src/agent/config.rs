use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::{DdpgError, Result};
use crate::noise::{DEFAULT_SIGMA, DEFAULT_THETA};

/// Constructor-time configuration of a [`DdpgAgent`](super::DdpgAgent).
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdpgConfig {
    pub state_size: usize,
    pub action_size: usize,
    /// Seed of the network initialisation stream
    pub seed: u64,
    /// Seed of the replay sampling stream; `seed + 1` when unset
    pub replay_seed: Option<u64>,
    /// Seed of the exploration noise stream; `seed + 2` when unset
    pub noise_seed: Option<u64>,
    /// Directory to restore actor and critic parameters from
    pub checkpoint_dir: Option<PathBuf>,
    pub buffer_size: usize,
    pub batch_size: usize,
    pub gamma: f32,
    pub tau: f32,
    pub lr_actor: f32,
    pub lr_critic: f32,
    /// Noise multiplier before any decay
    pub initial_noise_scale: f32,
    /// Per exploring `act` call: `scale ← scale × noise_decay`
    pub noise_decay: f32,
    /// Learn on every `update_every`-th call to `step`
    pub update_every: usize,
    /// Sample-and-learn rounds each time learning triggers
    pub updates_per_step: usize,
    pub action_low: f32,
    pub action_high: f32,
    pub actor_hidden_sizes: Vec<usize>,
    pub critic_hidden_sizes: Vec<usize>,
    pub ou_mu: f32,
    pub ou_theta: f32,
    pub ou_sigma: f32,
    /// Global-norm clip for critic gradients; off when unset
    pub critic_max_grad_norm: Option<f32>,
    pub metrics_history: usize,
    pub device: Device,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        DdpgConfig {
            state_size: 33,
            action_size: 4,
            seed: 0,
            replay_seed: None,
            noise_seed: None,
            checkpoint_dir: None,
            buffer_size: 100_000,
            batch_size: 128,
            gamma: 0.99,
            tau: 1e-3,
            lr_actor: 1e-3,
            lr_critic: 1e-3,
            initial_noise_scale: 1.0,
            noise_decay: 0.999,
            update_every: 1,
            updates_per_step: 1,
            action_low: -1.0,
            action_high: 1.0,
            actor_hidden_sizes: vec![400, 300],
            critic_hidden_sizes: vec![400, 300],
            ou_mu: 0.0,
            ou_theta: DEFAULT_THETA,
            ou_sigma: DEFAULT_SIGMA,
            critic_max_grad_norm: None,
            metrics_history: 1000,
            device: Device::Cpu,
        }
    }
}

impl DdpgConfig {
    pub fn new(state_size: usize, action_size: usize, seed: u64) -> Self {
        DdpgConfig {
            state_size,
            action_size,
            seed,
            ..Default::default()
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    pub fn learning_rates(mut self, lr_actor: f32, lr_critic: f32) -> Self {
        self.lr_actor = lr_actor;
        self.lr_critic = lr_critic;
        self
    }

    pub fn noise(mut self, initial_scale: f32, decay: f32) -> Self {
        self.initial_noise_scale = initial_scale;
        self.noise_decay = decay;
        self
    }

    pub fn ou_params(mut self, mu: f32, theta: f32, sigma: f32) -> Self {
        self.ou_mu = mu;
        self.ou_theta = theta;
        self.ou_sigma = sigma;
        self
    }

    pub fn update_cadence(mut self, update_every: usize, updates_per_step: usize) -> Self {
        self.update_every = update_every;
        self.updates_per_step = updates_per_step;
        self
    }

    pub fn action_bounds(mut self, low: f32, high: f32) -> Self {
        self.action_low = low;
        self.action_high = high;
        self
    }

    pub fn hidden_sizes(mut self, actor: Vec<usize>, critic: Vec<usize>) -> Self {
        self.actor_hidden_sizes = actor;
        self.critic_hidden_sizes = critic;
        self
    }

    pub fn replay_seed(mut self, seed: u64) -> Self {
        self.replay_seed = Some(seed);
        self
    }

    pub fn noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn checkpoint_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    pub fn critic_max_grad_norm(mut self, max_norm: f32) -> Self {
        self.critic_max_grad_norm = Some(max_norm);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn effective_replay_seed(&self) -> u64 {
        self.replay_seed.unwrap_or_else(|| self.seed.wrapping_add(1))
    }

    pub fn effective_noise_seed(&self) -> u64 {
        self.noise_seed.unwrap_or_else(|| self.seed.wrapping_add(2))
    }

    /// Reject configurations the agent cannot be built from.
    pub fn validate(&self) -> Result<()> {
        positive("state_size", self.state_size)?;
        positive("action_size", self.action_size)?;
        positive("buffer_size", self.buffer_size)?;
        positive("batch_size", self.batch_size)?;
        positive("update_every", self.update_every)?;
        positive("updates_per_step", self.updates_per_step)?;
        positive("metrics_history", self.metrics_history)?;

        if self.batch_size > self.buffer_size {
            return Err(DdpgError::invalid_parameter(
                "batch_size".to_string(),
                format!("{} exceeds buffer_size {}", self.batch_size, self.buffer_size),
            ));
        }

        open_unit("gamma", self.gamma)?;
        open_unit("tau", self.tau)?;
        open_unit("lr_actor", self.lr_actor)?;
        open_unit("lr_critic", self.lr_critic)?;

        if !(self.noise_decay > 0.0 && self.noise_decay <= 1.0) {
            return Err(DdpgError::invalid_parameter(
                "noise_decay".to_string(),
                format!("must be in (0, 1], got {}", self.noise_decay),
            ));
        }
        if !(self.initial_noise_scale >= 0.0 && self.initial_noise_scale.is_finite()) {
            return Err(DdpgError::invalid_parameter(
                "initial_noise_scale".to_string(),
                format!("must be finite and >= 0, got {}", self.initial_noise_scale),
            ));
        }
        if !(self.action_low.is_finite()
            && self.action_high.is_finite()
            && self.action_low < self.action_high)
        {
            return Err(DdpgError::invalid_parameter(
                "action_bounds".to_string(),
                format!("need finite low < high, got [{}, {}]", self.action_low, self.action_high),
            ));
        }
        for (name, sizes) in [
            ("actor_hidden_sizes", &self.actor_hidden_sizes),
            ("critic_hidden_sizes", &self.critic_hidden_sizes),
        ] {
            if sizes.iter().any(|&s| s == 0) {
                return Err(DdpgError::invalid_parameter(
                    name.to_string(),
                    format!("hidden layers must be non-empty, got {:?}", sizes),
                ));
            }
        }
        if let Some(max_norm) = self.critic_max_grad_norm {
            if !(max_norm > 0.0 && max_norm.is_finite()) {
                return Err(DdpgError::invalid_parameter(
                    "critic_max_grad_norm".to_string(),
                    format!("must be positive, got {}", max_norm),
                ));
            }
        }
        if let Some(dir) = &self.checkpoint_dir {
            if dir.as_os_str().is_empty() {
                return Err(DdpgError::invalid_parameter(
                    "checkpoint_dir".to_string(),
                    "path is empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: DdpgConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(DdpgError::invalid_parameter(
            name.to_string(),
            "must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn open_unit(name: &str, value: f32) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(DdpgError::invalid_parameter(
            name.to_string(),
            format!("must be in (0, 1), got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DdpgConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        assert!(DdpgConfig::default().gamma(1.0).validate().is_err());
        assert!(DdpgConfig::default().tau(0.0).validate().is_err());
        assert!(DdpgConfig::default().learning_rates(1e-3, 1.5).validate().is_err());
        assert!(DdpgConfig::default().noise(1.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(DdpgConfig::new(0, 2, 0).validate().is_err());
        assert!(DdpgConfig::new(4, 0, 0).validate().is_err());
        assert!(DdpgConfig::new(4, 2, 0).batch_size(10).buffer_size(5).validate().is_err());
        assert!(DdpgConfig::new(4, 2, 0).hidden_sizes(vec![0], vec![8]).validate().is_err());
        assert!(DdpgConfig::new(4, 2, 0).checkpoint_dir("").validate().is_err());
    }

    #[test]
    fn test_seed_derivation() {
        let config = DdpgConfig::new(4, 2, 42);
        assert_eq!(config.effective_replay_seed(), 43);
        assert_eq!(config.effective_noise_seed(), 44);
        assert_eq!(config.replay_seed(7).effective_replay_seed(), 7);
    }

    #[test]
    fn test_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddpg.json");
        fs::write(&path, r#"{ "state_size": 8, "action_size": 2, "batch_size": 64 }"#).unwrap();

        let config = DdpgConfig::from_json_file(&path).unwrap();
        assert_eq!(config.state_size, 8);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.gamma, 0.99);
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddpg.json");
        fs::write(&path, r#"{ "tau": 2.0 }"#).unwrap();
        assert!(DdpgConfig::from_json_file(&path).is_err());
    }
}
