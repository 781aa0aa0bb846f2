use ndarray::Array1;

use crate::noise::OuNoise;

#[test]
fn test_noise_starts_at_mean() {
    let noise = OuNoise::with_params(3, 0.25, 0.15, 0.2, 0).unwrap();
    assert_eq!(noise.state(), &Array1::from_elem(3, 0.25));
    assert_eq!(noise.size(), 3);
}

#[test]
fn test_noise_is_temporally_correlated() {
    // With θ small the process moves in small increments around its previous value.
    let mut noise = OuNoise::with_params(1, 0.0, 0.01, 0.01, 4).unwrap();
    let mut previous = noise.sample()[0];
    for _ in 0..100 {
        let current = noise.sample()[0];
        assert!((current - previous).abs() < 0.1);
        previous = current;
    }
}

#[test]
fn test_noise_mean_reversion() {
    let mut noise = OuNoise::with_params(2, 0.0, 0.15, 0.2, 17).unwrap();
    let n = 20_000;
    let mut sum = Array1::<f32>::zeros(2);
    for _ in 0..n {
        sum += &noise.sample();
    }
    let mean = sum / n as f32;
    assert!(mean.iter().all(|m| m.abs() < 0.1), "long-run mean {:?}", mean);
}

#[test]
fn test_reset_then_replay_differs_from_fresh_instance() {
    // Reset restores the state, not the random stream.
    let mut a = OuNoise::new(2, 5).unwrap();
    let mut b = OuNoise::new(2, 5).unwrap();
    let first = a.sample();
    a.reset();
    assert_eq!(b.sample(), first);
    assert_ne!(a.sample(), first);
}
