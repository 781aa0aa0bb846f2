//! Wall-clock cost of the DDPG update at the default network sizes.
//!
//! Run with `cargo bench --bench learn_step`.

use ddpg::agent::{DdpgAgent, DdpgConfig};
use ddpg::device::Device;
use ndarray::Array1;
use std::time::Instant;

const WARMUP_STEPS: usize = 256;
const TIMED_STEPS: usize = 200;

fn run(device: Device) {
    let config = DdpgConfig::new(33, 4, 0).device(device);
    let mut agent = DdpgAgent::new(config).expect("valid default config");

    let mut state = Array1::from_shape_fn(33, |i| (i as f32 * 0.1).sin());
    let mut step = |agent: &mut DdpgAgent, t: usize| {
        let action = agent.act(state.view(), true).expect("act");
        let next_state = state.mapv(|x| (x + 0.01 * t as f32).sin());
        let reward = -next_state[0].abs();
        agent
            .step(state.view(), action.view(), reward, next_state.view(), t % 100 == 99)
            .expect("step");
        state = next_state;
    };

    for t in 0..WARMUP_STEPS {
        step(&mut agent, t);
    }

    let start = Instant::now();
    for t in 0..TIMED_STEPS {
        step(&mut agent, WARMUP_STEPS + t);
    }
    let elapsed = start.elapsed();

    println!(
        "{:?}: {} act+step+learn iterations in {:.2?} ({:.3} ms/iter, {} learn calls)",
        device,
        TIMED_STEPS,
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / TIMED_STEPS as f64,
        agent.learn_steps()
    );
}

fn main() {
    println!("DDPG learn step benchmark (state 33, action 4, batch 128, hidden [400, 300])");
    println!("{}", "=".repeat(72));
    run(Device::Cpu);
    run(Device::Parallel);
}
