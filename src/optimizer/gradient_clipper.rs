use crate::layers::LayerGradients;

/// Gradient clipping methods
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum GradientClipper {
    /// Rescale all gradients so their joint L2 norm is at most `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    #[default]
    None,
}

impl GradientClipper {
    /// Clip `gradients` in place.
    pub fn clip(&self, gradients: &mut [LayerGradients]) {
        match *self {
            GradientClipper::ClipByGlobalNorm { max_norm } => {
                let norm = Self::global_norm(gradients);
                if norm > max_norm {
                    let scale = max_norm / norm;
                    for grads in gradients.iter_mut() {
                        grads.weights.mapv_inplace(|g| g * scale);
                        grads.biases.mapv_inplace(|g| g * scale);
                    }
                }
            }
            GradientClipper::None => {}
        }
    }

    /// Joint L2 norm of every weight and bias gradient
    pub fn global_norm(gradients: &[LayerGradients]) -> f32 {
        gradients
            .iter()
            .flat_map(|g| g.weights.iter().chain(g.biases.iter()))
            .map(|&x| x * x)
            .sum::<f32>()
            .sqrt()
    }
}
