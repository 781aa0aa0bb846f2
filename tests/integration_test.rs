use ddpg::agent::{DdpgAgent, DdpgConfig};
use ddpg::metrics::TrainingMetrics;
use ndarray::{array, Array1};

/// Point on a line that should be pushed towards the origin.
struct PointMass {
    position: f32,
    steps: usize,
}

impl PointMass {
    fn reset(&mut self, start: f32) -> Array1<f32> {
        self.position = start;
        self.steps = 0;
        array![self.position]
    }

    fn step(&mut self, action: f32) -> (Array1<f32>, f32, bool) {
        self.position = (self.position + 0.2 * action).clamp(-2.0, 2.0);
        self.steps += 1;
        let reward = -self.position * self.position;
        let done = self.steps >= 25 || self.position.abs() < 0.05;
        (array![self.position], reward, done)
    }
}

fn config() -> DdpgConfig {
    DdpgConfig::new(1, 1, 7)
        .hidden_sizes(vec![32, 32], vec![32, 32])
        .batch_size(32)
        .buffer_size(5_000)
        .tau(0.01)
        .noise(1.0, 0.995)
}

#[test]
fn test_end_to_end_training() {
    let mut agent = DdpgAgent::new(config()).unwrap();
    let mut env = PointMass { position: 0.0, steps: 0 };
    let mut reports = Vec::new();

    for episode in 0..20 {
        let start = if episode % 2 == 0 { 1.5 } else { -1.5 };
        let mut state = env.reset(start);
        agent.reset_noise();

        loop {
            let action = agent.act(state.view(), true).unwrap();
            assert!(action[0] >= -1.0 && action[0] <= 1.0);

            let (next_state, reward, done) = env.step(action[0]);
            if let Some(report) = agent
                .step(state.view(), action.view(), reward, next_state.view(), done)
                .unwrap()
            {
                reports.push(report);
            }
            state = next_state;
            if done {
                break;
            }
        }
    }

    assert!(!reports.is_empty());
    assert!(reports.iter().all(|r| r.is_finite()));
    assert!(agent.check_parameters().is_empty());
    assert_eq!(agent.learn_steps(), reports.len());
    assert!(agent.noise_scale() < 1.0);

    let metrics: &TrainingMetrics = agent.metrics();
    assert_eq!(metrics.len(), reports.len());
    assert!(metrics.avg_critic_loss(10).unwrap().is_finite());
}

#[test]
fn test_checkpoint_reload_reproduces_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = DdpgAgent::new(config().batch_size(4)).unwrap();
    let mut env = PointMass { position: 0.0, steps: 0 };

    let mut state = env.reset(1.0);
    for _ in 0..40 {
        let action = agent.act(state.view(), true).unwrap();
        let (next_state, reward, done) = env.step(action[0]);
        agent
            .step(state.view(), action.view(), reward, next_state.view(), done)
            .unwrap();
        state = if done { env.reset(-1.0) } else { next_state };
    }
    assert!(agent.learn_steps() > 0);

    agent.save_checkpoint(dir.path().join("run")).unwrap();
    let mut restored =
        DdpgAgent::from_config(config().checkpoint_dir(dir.path().join("run"))).unwrap();

    for x in [-1.5f32, -0.3, 0.0, 0.7, 1.9] {
        let s = array![x];
        assert_eq!(agent.act(s.view(), false).unwrap(), restored.act(s.view(), false).unwrap());
    }
}

#[test]
fn test_config_file_drives_agent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ddpg.json");
    config().action_bounds(-2.0, 2.0).to_json_file(&path).unwrap();

    let loaded = DdpgConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config().action_bounds(-2.0, 2.0));

    let mut agent = DdpgAgent::from_config(loaded).unwrap();
    let action = agent.act(array![0.5].view(), true).unwrap();
    assert!(action[0] >= -2.0 && action[0] <= 2.0);
}
