use ndarray::{array, Array1, Array2};

use crate::activations::Activation;
use crate::layers::{DenseLayer, LayerGradients};
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerWrapper, SGD};

fn layer() -> DenseLayer {
    DenseLayer::from_parameters(
        array![[1.0, 2.0], [3.0, 4.0]],
        array![0.5, -0.5],
        Activation::Linear,
    )
    .unwrap()
}

fn gradients() -> Vec<LayerGradients> {
    vec![LayerGradients {
        weights: array![[0.1, -0.2], [0.0, 0.4]],
        biases: array![1.0, -1.0],
    }]
}

#[test]
fn test_sgd_step() {
    let mut layers = vec![layer()];
    let mut optimizer = SGD::new(0.5);
    optimizer.step(&mut layers, &gradients()).unwrap();

    let expected = array![[0.95, 2.1], [3.0, 3.8]];
    assert!(layers[0].weights.iter().zip(expected.iter()).all(|(a, b)| (a - b).abs() < 1e-6));
    assert!(layers[0].biases.iter().all(|b| b.abs() < 1e-6));
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut layers = vec![layer()];
    let before = layers[0].weights.clone();
    let lr = 0.01;
    let mut optimizer = OptimizerWrapper::Adam(Adam::default(&layers, lr));
    optimizer.step(&mut layers, &gradients()).unwrap();

    // After bias correction the first update is lr * sign(g) wherever g != 0.
    let delta = &before - &layers[0].weights;
    assert!((delta[(0, 0)] - lr).abs() < 1e-5);
    assert!((delta[(0, 1)] + lr).abs() < 1e-5);
    assert_eq!(delta[(1, 0)], 0.0);
    assert!((delta[(1, 1)] - lr).abs() < 1e-5);
    assert_eq!(optimizer.learning_rate(), lr);
}

#[test]
fn test_adam_keeps_moving_with_constant_gradient() {
    let mut layers = vec![layer()];
    let mut optimizer = Adam::default(&layers, 0.1);
    let grads = gradients();
    for _ in 0..10 {
        optimizer.step(&mut layers, &grads).unwrap();
    }
    assert_eq!(optimizer.t, 10);
    assert!((layers[0].biases[0] - (0.5 - 1.0)).abs() < 1e-3);
}

#[test]
fn test_layout_mismatch_rejected() {
    let mut layers = vec![layer()];
    let wrong = vec![LayerGradients {
        weights: Array2::zeros((3, 2)),
        biases: Array1::zeros(2),
    }];
    assert!(SGD::new(0.1).step(&mut layers, &wrong).is_err());
    assert!(Adam::default(&layers.clone(), 0.1).step(&mut layers, &[]).is_err());
}

#[test]
fn test_global_norm_clip_then_step() {
    let mut layers = vec![layer()];
    let mut grads = gradients();
    let clipper = GradientClipper::ClipByGlobalNorm { max_norm: 0.1 };
    clipper.clip(&mut grads);
    assert!(GradientClipper::global_norm(&grads) <= 0.1 + 1e-6);

    let before = layers[0].biases.clone();
    SGD::new(1.0).step(&mut layers, &grads).unwrap();
    let moved: f32 = (&before - &layers[0].biases).mapv(|d| d * d).sum().sqrt();
    assert!(moved <= 0.1 + 1e-6);
}
