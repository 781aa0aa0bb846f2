//! Detection of non-finite values in parameter sets.
//!
//! Nothing here repairs a network; it only reports, so the caller can decide
//! whether to abort a run.

use log::warn;

use crate::network::NeuralNetwork;

/// Kind of non-finite value found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    NaN,
    Infinity,
}

/// A non-finite value count in one tensor of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct NumericalIssue {
    pub network: String,
    pub layer: usize,
    pub tensor: &'static str,
    pub kind: IssueKind,
    pub count: usize,
}

/// Check every weight and bias of `network` for NaN and infinite values.
pub fn check_network(name: &str, network: &NeuralNetwork) -> Vec<NumericalIssue> {
    let mut issues = Vec::new();

    for (layer_idx, layer) in network.layers.iter().enumerate() {
        let tensors = [
            ("weights", layer.weights.iter().copied().collect::<Vec<_>>()),
            ("biases", layer.biases.to_vec()),
        ];
        for (tensor, values) in tensors {
            let nan_count = values.iter().filter(|v| v.is_nan()).count();
            let inf_count = values.iter().filter(|v| v.is_infinite()).count();

            if nan_count > 0 {
                warn!("{} layer {}: found {} NaN values in {}", name, layer_idx, nan_count, tensor);
                issues.push(NumericalIssue {
                    network: name.to_string(),
                    layer: layer_idx,
                    tensor,
                    kind: IssueKind::NaN,
                    count: nan_count,
                });
            }
            if inf_count > 0 {
                warn!(
                    "{} layer {}: found {} infinite values in {}",
                    name, layer_idx, inf_count, tensor
                );
                issues.push(NumericalIssue {
                    network: name.to_string(),
                    layer: layer_idx,
                    tensor,
                    kind: IssueKind::Infinity,
                    count: inf_count,
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use crate::layers::DenseLayer;
    use ndarray::array;

    #[test]
    fn test_reports_nan_and_inf() {
        let layer = DenseLayer::from_parameters(
            array![[f32::NAN, 1.0], [f32::INFINITY, f32::NAN]],
            array![0.0, f32::NEG_INFINITY],
            Activation::Linear,
        )
        .unwrap();
        let network = NeuralNetwork { layers: vec![layer] };

        let issues = check_network("critic", &network);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].kind, IssueKind::NaN);
        assert_eq!(issues[0].count, 2);
        assert_eq!(issues[2].tensor, "biases");
    }

    #[test]
    fn test_clean_network() {
        let layer =
            DenseLayer::from_parameters(array![[1.0]], array![0.0], Activation::Relu).unwrap();
        assert!(check_network("actor", &NeuralNetwork { layers: vec![layer] }).is_empty());
    }
}
