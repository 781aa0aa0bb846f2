use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::LearnReport;

/// Bounded history of learning statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    pub critic_losses: VecDeque<f32>,
    pub actor_losses: VecDeque<f32>,
    /// Mean Q(s, a) of the sampled batch before the critic update
    pub q_values: VecDeque<f32>,
    pub noise_scales: VecDeque<f32>,
    history_size: usize,
}

impl TrainingMetrics {
    pub fn new(history_size: usize) -> Self {
        let history_size = history_size.max(1);
        TrainingMetrics {
            critic_losses: VecDeque::with_capacity(history_size),
            actor_losses: VecDeque::with_capacity(history_size),
            q_values: VecDeque::with_capacity(history_size),
            noise_scales: VecDeque::with_capacity(history_size),
            history_size,
        }
    }

    /// Record the outcome of one learn call
    pub fn record(&mut self, report: &LearnReport, noise_scale: f32) {
        let limit = self.history_size;
        push_bounded(&mut self.critic_losses, report.critic_loss, limit);
        push_bounded(&mut self.actor_losses, report.actor_loss, limit);
        push_bounded(&mut self.q_values, report.mean_q, limit);
        push_bounded(&mut self.noise_scales, noise_scale, limit);
    }

    pub fn len(&self) -> usize {
        self.critic_losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.critic_losses.is_empty()
    }

    /// Average critic loss over the most recent `window` entries
    pub fn avg_critic_loss(&self, window: usize) -> Option<f32> {
        recent_mean(&self.critic_losses, window)
    }

    pub fn clear(&mut self) {
        *self = TrainingMetrics::new(self.history_size);
    }

    /// Save metrics to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load metrics from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn push_bounded(values: &mut VecDeque<f32>, value: f32, limit: usize) {
    if values.len() >= limit {
        values.pop_front();
    }
    values.push_back(value);
}

fn recent_mean(values: &VecDeque<f32>, window: usize) -> Option<f32> {
    if values.is_empty() || window == 0 {
        return None;
    }
    let n = window.min(values.len());
    let sum: f32 = values.iter().rev().take(n).sum();
    Some(sum / n as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(loss: f32) -> LearnReport {
        LearnReport {
            critic_loss: loss,
            actor_loss: -loss,
            mean_q: 0.0,
            mean_target: 0.0,
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut metrics = TrainingMetrics::new(3);
        for i in 0..5 {
            metrics.record(&report(i as f32), 1.0);
        }
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics.critic_losses.front(), Some(&2.0));
        assert_eq!(metrics.avg_critic_loss(2), Some(3.5));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let mut metrics = TrainingMetrics::new(10);
        metrics.record(&report(0.5), 0.9);
        metrics.save(&path).unwrap();
        assert_eq!(TrainingMetrics::load(&path).unwrap(), metrics);
    }
}
