use std::collections::VecDeque;

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::error::{DdpgError, Result};

/// One environment step: `(s, a, r, s', done)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: Array1<f32>,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: ArrayView1<f32>,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Self {
        Transition {
            state: state.to_owned(),
            action: action.to_owned(),
            reward,
            next_state: next_state.to_owned(),
            done,
        }
    }
}

/// A batch of transitions stacked field by field, one row per transition.
///
/// `dones` is a float mask: `1.0` for terminal transitions, `0.0` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    pub dones: Array1<f32>,
}

impl TransitionBatch {
    /// Stack transitions into a batch; every transition must share the same shapes.
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions.first().ok_or_else(|| {
            DdpgError::invalid_parameter(
                "batch".to_string(),
                "cannot build an empty batch".to_string(),
            )
        })?;
        let n = transitions.len();
        let (state_size, action_size) = (first.state.len(), first.action.len());

        let mut states = Array2::zeros((n, state_size));
        let mut actions = Array2::zeros((n, action_size));
        let mut next_states = Array2::zeros((n, state_size));
        let mut rewards = Array1::zeros(n);
        let mut dones = Array1::zeros(n);

        for (i, t) in transitions.iter().enumerate() {
            if t.state.len() != state_size
                || t.next_state.len() != state_size
                || t.action.len() != action_size
            {
                return Err(DdpgError::dimension_mismatch(
                    format!("state {} / action {}", state_size, action_size),
                    format!(
                        "state {} / next_state {} / action {} at row {}",
                        t.state.len(),
                        t.next_state.len(),
                        t.action.len(),
                        i
                    ),
                ));
            }
            states.row_mut(i).assign(&t.state);
            actions.row_mut(i).assign(&t.action);
            next_states.row_mut(i).assign(&t.next_state);
            rewards[i] = t.reward;
            dones[i] = if t.done { 1.0 } else { 0.0 };
        }

        Ok(TransitionBatch {
            states,
            actions,
            rewards,
            next_states,
            dones,
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Check that all fields agree on the batch length and the expected widths.
    pub fn validate(&self, state_size: usize, action_size: usize) -> Result<()> {
        let n = self.len();
        if n == 0 {
            return Err(DdpgError::invalid_parameter(
                "batch".to_string(),
                "batch is empty".to_string(),
            ));
        }
        let expected = (n, state_size, action_size);
        let consistent = self.states.dim() == (n, state_size)
            && self.next_states.dim() == (n, state_size)
            && self.actions.dim() == (n, action_size)
            && self.dones.len() == n;
        if !consistent {
            return Err(DdpgError::dimension_mismatch(
                format!("batch {} with state {} / action {}", expected.0, expected.1, expected.2),
                format!(
                    "states {:?}, actions {:?}, rewards {}, next_states {:?}, dones {}",
                    self.states.dim(),
                    self.actions.dim(),
                    n,
                    self.next_states.dim(),
                    self.dones.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Fixed-capacity ring buffer of transitions with seeded uniform sampling.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Create a buffer; `capacity` must be positive.
    pub fn new(capacity: usize, seed: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(DdpgError::invalid_parameter(
                "capacity".to_string(),
                "Capacity must be greater than 0".to_string(),
            ));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity.min(1 << 16)),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Store a transition, evicting the oldest one when full.
    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        let picked = self.sample_transitions(batch_size)?;
        TransitionBatch::from_transitions(&picked)
    }

    /// Same draw as [`ReplayBuffer::sample`], without stacking.
    pub fn sample_transitions(&mut self, batch_size: usize) -> Result<Vec<&Transition>> {
        if batch_size == 0 {
            return Err(DdpgError::invalid_parameter(
                "batch_size".to_string(),
                "must be greater than 0".to_string(),
            ));
        }
        if batch_size > self.buffer.len() {
            return Err(DdpgError::InsufficientSamples {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        Ok(indices.into_iter().map(|i| &self.buffer[i]).collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
