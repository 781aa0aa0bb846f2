pub mod test_noise;
pub mod test_optimizer;
