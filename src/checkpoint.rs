//! Named parameter artifacts for the actor and the critic.
//!
//! A checkpoint directory holds two independent files, one per local network.
//! Target networks are never persisted; they are re-derived from the locals
//! on load.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{DdpgError, Result};
use crate::network::NeuralNetwork;

pub const ACTOR_CHECKPOINT: &str = "checkpoint_actor.bin";
pub const CRITIC_CHECKPOINT: &str = "checkpoint_critic.bin";

/// File locations of a checkpoint inside a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPaths {
    pub actor: PathBuf,
    pub critic: PathBuf,
}

impl CheckpointPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        CheckpointPaths {
            actor: dir.join(ACTOR_CHECKPOINT),
            critic: dir.join(CRITIC_CHECKPOINT),
        }
    }
}

/// Write both parameter sets, creating `dir` if needed.
pub fn save<P: AsRef<Path>>(
    dir: P,
    actor: &NeuralNetwork,
    critic: &NeuralNetwork,
) -> Result<CheckpointPaths> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(DdpgError::invalid_parameter(
            "checkpoint_dir".to_string(),
            "path is empty".to_string(),
        ));
    }
    fs::create_dir_all(dir)?;

    let paths = CheckpointPaths::in_dir(dir);
    actor.save(&paths.actor)?;
    critic.save(&paths.critic)?;
    info!("Saved checkpoint to {}", dir.display());
    Ok(paths)
}

/// Read both parameter sets from `dir`.
pub fn load<P: AsRef<Path>>(dir: P) -> Result<(NeuralNetwork, NeuralNetwork)> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DdpgError::CheckpointNotFound(dir.to_path_buf()));
    }

    let paths = CheckpointPaths::in_dir(dir);
    for path in [&paths.actor, &paths.critic] {
        if !path.is_file() {
            return Err(DdpgError::CheckpointNotFound(path.clone()));
        }
    }

    info!("Loading actor from: {}", paths.actor.display());
    let actor = NeuralNetwork::load(&paths.actor)?;
    info!("Loading critic from: {}", paths.critic.display());
    let critic = NeuralNetwork::load(&paths.critic)?;
    Ok((actor, critic))
}
