use std::path::Path;

use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::DdpgConfig;
use crate::checkpoint::{self, CheckpointPaths};
use crate::diagnostics::{self, NumericalIssue};
use crate::error::{DdpgError, Result};
use crate::loss::{Loss, MSE};
use crate::metrics::TrainingMetrics;
use crate::model::{Actor, Critic, Policy, ValueEstimator};
use crate::noise::OuNoise;
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerWrapper};
use crate::replay_buffer::{ReplayBuffer, Transition, TransitionBatch};

/// Losses and value statistics of one `learn` call.
///
/// Non-finite values are reported as-is; reacting to them is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LearnReport {
    pub critic_loss: f32,
    pub actor_loss: f32,
    /// Mean of `critic_local(s, a)` before the critic update
    pub mean_q: f32,
    /// Mean bootstrapped target `y`
    pub mean_target: f32,
}

impl LearnReport {
    pub fn is_finite(&self) -> bool {
        self.critic_loss.is_finite()
            && self.actor_loss.is_finite()
            && self.mean_q.is_finite()
            && self.mean_target.is_finite()
    }
}

/// Bootstrapped targets `y = r + γ · Q'(s', μ'(s')) · (1 − done)`.
///
/// Both networks are evaluated in inference mode, so `y` is a constant with
/// respect to every trainable parameter.
pub fn bootstrapped_targets<P, V>(
    policy: &P,
    critic: &V,
    batch: &TransitionBatch,
    gamma: f32,
) -> Result<Array1<f32>>
where
    P: Policy + ?Sized,
    V: ValueEstimator + ?Sized,
{
    let next_actions = policy.actions(batch.next_states.view())?;
    let next_values = critic.estimate(batch.next_states.view(), next_actions.view())?;
    if next_values.len() != batch.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} next-state values", batch.len()),
            format!("{} next-state values", next_values.len()),
        ));
    }

    Ok(Zip::from(&batch.rewards)
        .and(&next_values)
        .and(&batch.dones)
        .map_collect(|&r, &q, &done| r + gamma * q * (1.0 - done)))
}

/// Deep Deterministic Policy Gradient agent.
///
/// Owns the local and target actor/critic networks, their optimizers, the
/// replay memory and the exploration noise. All mutation goes through
/// [`act`](DdpgAgent::act), [`step`](DdpgAgent::step) and
/// [`learn`](DdpgAgent::learn); every call runs to completion on the calling
/// thread.
///
/// Learning is driven by `step`: once the memory holds more than
/// `batch_size` transitions, every `update_every`-th call runs
/// `updates_per_step` sample-and-learn rounds. Calling `step` more often
/// therefore also means learning more often.
///
/// # Example
///
/// ```rust
/// use ddpg::agent::{DdpgAgent, DdpgConfig};
/// use ndarray::Array1;
///
/// let config = DdpgConfig::new(4, 2, 42)
///     .hidden_sizes(vec![32], vec![32])
///     .batch_size(2);
/// let mut agent = DdpgAgent::new(config).unwrap();
///
/// let state = Array1::zeros(4);
/// let action = agent.act(state.view(), true).unwrap();
/// assert_eq!(action.len(), 2);
///
/// let next_state = Array1::from_elem(4, 0.1);
/// agent.step(state.view(), action.view(), 1.0, next_state.view(), false).unwrap();
/// ```
pub struct DdpgAgent {
    config: DdpgConfig,
    actor_local: Actor,
    actor_target: Actor,
    critic_local: Critic,
    critic_target: Critic,
    actor_optimizer: OptimizerWrapper,
    critic_optimizer: OptimizerWrapper,
    critic_clipper: GradientClipper,
    memory: ReplayBuffer,
    noise: OuNoise,
    noise_scale: f32,
    total_steps: usize,
    learn_steps: usize,
    metrics: TrainingMetrics,
}

impl DdpgAgent {
    /// Build an agent with freshly initialised networks.
    ///
    /// Target networks start as exact copies of the local ones.
    pub fn new(config: DdpgConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let (low, high) = (config.action_low, config.action_high);

        let actor_local = Actor::new(
            config.state_size,
            config.action_size,
            &config.actor_hidden_sizes,
            low,
            high,
            &mut rng,
        )?;
        let mut actor_target = Actor::new(
            config.state_size,
            config.action_size,
            &config.actor_hidden_sizes,
            low,
            high,
            &mut rng,
        )?;
        let critic_local = Critic::new(
            config.state_size,
            config.action_size,
            &config.critic_hidden_sizes,
            &mut rng,
        )?;
        let mut critic_target = Critic::new(
            config.state_size,
            config.action_size,
            &config.critic_hidden_sizes,
            &mut rng,
        )?;

        actor_target.network_mut().hard_update_from(actor_local.network())?;
        critic_target.network_mut().hard_update_from(critic_local.network())?;

        let actor_optimizer =
            OptimizerWrapper::Adam(Adam::default(&actor_local.network().layers, config.lr_actor));
        let critic_optimizer =
            OptimizerWrapper::Adam(Adam::default(&critic_local.network().layers, config.lr_critic));
        let critic_clipper = match config.critic_max_grad_norm {
            Some(max_norm) => GradientClipper::ClipByGlobalNorm { max_norm },
            None => GradientClipper::None,
        };

        let memory = ReplayBuffer::new(config.buffer_size, config.effective_replay_seed())?;
        let noise = OuNoise::with_params(
            config.action_size,
            config.ou_mu,
            config.ou_theta,
            config.ou_sigma,
            config.effective_noise_seed(),
        )?;

        info!(
            "Created DDPG agent: state_size={}, action_size={}, actor params={}, \
             critic params={}, device={:?}",
            config.state_size,
            config.action_size,
            actor_local.network().parameter_count(),
            critic_local.network().parameter_count(),
            config.device
        );

        Ok(DdpgAgent {
            noise_scale: config.initial_noise_scale,
            metrics: TrainingMetrics::new(config.metrics_history),
            config,
            actor_local,
            actor_target,
            critic_local,
            critic_target,
            actor_optimizer,
            critic_optimizer,
            critic_clipper,
            memory,
            noise,
            total_steps: 0,
            learn_steps: 0,
        })
    }

    /// Build an agent and restore the local actor and critic from `dir`.
    ///
    /// Targets are copied from the restored locals; optimizer state starts fresh.
    pub fn from_checkpoint<P: AsRef<Path>>(config: DdpgConfig, dir: P) -> Result<Self> {
        let mut agent = Self::new(config)?;
        let (actor, critic) = checkpoint::load(dir)?;

        agent.actor_local.network_mut().load_parameters(actor)?;
        agent.critic_local.network_mut().load_parameters(critic)?;
        agent.actor_target.network_mut().hard_update_from(agent.actor_local.network())?;
        agent.critic_target.network_mut().hard_update_from(agent.critic_local.network())?;
        Ok(agent)
    }

    /// `from_checkpoint` when the configuration names a checkpoint directory, `new` otherwise.
    pub fn from_config(config: DdpgConfig) -> Result<Self> {
        match config.checkpoint_dir.clone() {
            Some(dir) => Self::from_checkpoint(config, dir),
            None => Self::new(config),
        }
    }

    /// Persist the local actor and critic parameter sets into `dir`.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, dir: P) -> Result<CheckpointPaths> {
        checkpoint::save(dir, self.actor_local.network(), self.critic_local.network())
    }

    /// Action for a single state, optionally perturbed by exploration noise.
    ///
    /// The returned action always lies within the configured action bounds.
    pub fn act(&mut self, state: ArrayView1<f32>, explore: bool) -> Result<Array1<f32>> {
        let actions = self.act_batch(state.insert_axis(Axis(0)), explore)?;
        Ok(actions.index_axis_move(Axis(0), 0))
    }

    /// Actions for several sub-agents at once, one row per state.
    ///
    /// A single noise sample is drawn per call and shared by every row, and
    /// the noise scale decays once per call.
    pub fn act_batch(&mut self, states: ArrayView2<f32>, explore: bool) -> Result<Array2<f32>> {
        self.check_width("state", states.ncols(), self.config.state_size)?;
        let mut actions = self.actor_local.actions(states)?;

        if explore {
            let noise = self.noise.sample() * self.noise_scale;
            actions += &noise.insert_axis(Axis(0));
            self.noise_scale *= self.config.noise_decay;
        }

        let (low, high) = (self.config.action_low, self.config.action_high);
        actions.mapv_inplace(|a| a.clamp(low, high));
        Ok(actions)
    }

    /// Store one transition and learn if the cadence says so.
    ///
    /// Returns the report of the last learn call made, if any.
    pub fn step(
        &mut self,
        state: ArrayView1<f32>,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) -> Result<Option<LearnReport>> {
        self.check_width("state", state.len(), self.config.state_size)?;
        self.check_width("next_state", next_state.len(), self.config.state_size)?;
        self.check_width("action", action.len(), self.config.action_size)?;

        self.memory.add(Transition::new(state, action, reward, next_state, done));
        self.after_store()
    }

    /// Store one transition per sub-agent row, then apply the learn cadence once.
    pub fn step_batch(
        &mut self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        rewards: ArrayView1<f32>,
        next_states: ArrayView2<f32>,
        dones: &[bool],
    ) -> Result<Option<LearnReport>> {
        let n = states.nrows();
        if actions.nrows() != n
            || rewards.len() != n
            || next_states.nrows() != n
            || dones.len() != n
        {
            return Err(DdpgError::dimension_mismatch(
                format!("{} rows in every field", n),
                format!(
                    "actions {}, rewards {}, next_states {}, dones {}",
                    actions.nrows(),
                    rewards.len(),
                    next_states.nrows(),
                    dones.len()
                ),
            ));
        }
        self.check_width("state", states.ncols(), self.config.state_size)?;
        self.check_width("next_state", next_states.ncols(), self.config.state_size)?;
        self.check_width("action", actions.ncols(), self.config.action_size)?;

        for i in 0..n {
            self.memory.add(Transition::new(
                states.row(i),
                actions.row(i),
                rewards[i],
                next_states.row(i),
                dones[i],
            ));
        }
        self.after_store()
    }

    fn after_store(&mut self) -> Result<Option<LearnReport>> {
        self.total_steps += 1;
        if self.memory.len() <= self.config.batch_size
            || self.total_steps % self.config.update_every != 0
        {
            return Ok(None);
        }

        let mut report = None;
        for _ in 0..self.config.updates_per_step {
            let batch = self.memory.sample(self.config.batch_size)?;
            report = Some(self.learn(&batch)?);
        }
        Ok(report)
    }

    /// One DDPG update from `batch`: critic, then actor, then both targets.
    pub fn learn(&mut self, batch: &TransitionBatch) -> Result<LearnReport> {
        batch.validate(self.config.state_size, self.config.action_size)?;
        let n = batch.len();

        // ---------------------------- update critic ---------------------------- //
        let targets = bootstrapped_targets(
            &self.actor_target,
            &self.critic_target,
            batch,
            self.config.gamma,
        )?;

        let q_expected = self
            .critic_local
            .forward_train(batch.states.view(), batch.actions.view())?;
        let critic_loss = MSE.compute(q_expected.view(), targets.view())?;
        let loss_grad = MSE.gradient(q_expected.view(), targets.view())?;
        let (mut critic_grads, _) = self.critic_local.backward(loss_grad.view())?;
        self.critic_clipper.clip(&mut critic_grads);
        self.critic_optimizer
            .step(&mut self.critic_local.network_mut().layers, &critic_grads)?;

        // ---------------------------- update actor ----------------------------- //
        // dL/dQ for L = -mean(Q); only the action gradient leaves the critic.
        let predicted_actions = self.actor_local.forward_train(batch.states.view())?;
        let q_policy = self
            .critic_local
            .forward_train(batch.states.view(), predicted_actions.view())?;
        let actor_loss = -q_policy.sum() / n as f32;
        let policy_grad = Array1::from_elem(n, -1.0 / n as f32);
        let (_, action_grads) = self.critic_local.backward(policy_grad.view())?;
        let actor_grads = self.actor_local.backward(action_grads.view())?;
        self.actor_optimizer
            .step(&mut self.actor_local.network_mut().layers, &actor_grads)?;

        // ----------------------- update target networks ------------------------ //
        self.soft_update_targets(self.config.tau)?;

        self.critic_local.network_mut().clear_cache();
        self.actor_local.network_mut().clear_cache();
        self.learn_steps += 1;

        let report = LearnReport {
            critic_loss,
            actor_loss,
            mean_q: q_expected.sum() / n as f32,
            mean_target: targets.sum() / n as f32,
        };
        if report.is_finite() {
            debug!(
                "learn #{}: critic_loss={:.6}, actor_loss={:.6}, mean_q={:.4}",
                self.learn_steps, report.critic_loss, report.actor_loss, report.mean_q
            );
        } else {
            warn!("learn #{}: non-finite values in {:?}", self.learn_steps, report);
        }
        self.metrics.record(&report, self.noise_scale);
        Ok(report)
    }

    /// `target ← τ·local + (1−τ)·target` for the critic, then the actor.
    pub fn soft_update_targets(&mut self, tau: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&tau) {
            return Err(DdpgError::invalid_parameter(
                "tau".to_string(),
                format!("must be in [0, 1], got {}", tau),
            ));
        }
        let device = self.config.device;
        self.critic_target
            .network_mut()
            .soft_update_from(self.critic_local.network(), tau, device)?;
        self.actor_target
            .network_mut()
            .soft_update_from(self.actor_local.network(), tau, device)?;
        Ok(())
    }

    /// Reset the exploration process to its mean, typically at episode start.
    pub fn reset_noise(&mut self) {
        self.noise.reset();
    }

    /// NaN/Inf values in any of the four parameter sets.
    pub fn check_parameters(&self) -> Vec<NumericalIssue> {
        let mut issues = diagnostics::check_network("actor_local", self.actor_local.network());
        issues.extend(diagnostics::check_network("actor_target", self.actor_target.network()));
        issues.extend(diagnostics::check_network("critic_local", self.critic_local.network()));
        issues.extend(diagnostics::check_network("critic_target", self.critic_target.network()));
        issues
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    pub fn actor_local(&self) -> &Actor {
        &self.actor_local
    }

    pub fn actor_target(&self) -> &Actor {
        &self.actor_target
    }

    pub fn critic_local(&self) -> &Critic {
        &self.critic_local
    }

    pub fn critic_target(&self) -> &Critic {
        &self.critic_target
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    /// Number of `step`/`step_batch` calls so far.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Number of completed `learn` calls.
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    fn check_width(&self, what: &str, actual: usize, expected: usize) -> Result<()> {
        if actual != expected {
            return Err(DdpgError::dimension_mismatch(
                format!("{} of length {}", what, expected),
                format!("{} of length {}", what, actual),
            ));
        }
        Ok(())
    }
}
