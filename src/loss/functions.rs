use ndarray::{Array1, ArrayView1};

use crate::error::{DdpgError, Result};

/// Trait defining the interface for loss functions over a batch of scalar predictions
pub trait Loss: Send + Sync {
    /// Compute the loss for a batch of predictions and targets
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32>;

    /// Compute the gradient of the loss with respect to each prediction
    fn gradient(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<Array1<f32>>;
}

/// Mean Squared Error loss, `mean((p - t)^2)`
pub struct MSE;

impl Loss for MSE {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32> {
        check_shapes(predictions, targets)?;
        let diff = &predictions - &targets;
        Ok(diff.mapv(|d| d * d).sum() / predictions.len() as f32)
    }

    fn gradient(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<Array1<f32>> {
        check_shapes(predictions, targets)?;
        Ok((&predictions - &targets) * (2.0 / predictions.len() as f32))
    }
}

fn check_shapes(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<()> {
    if predictions.is_empty() || predictions.len() != targets.len() {
        return Err(DdpgError::dimension_mismatch(
            format!("{} non-empty targets", predictions.len()),
            format!("{} targets", targets.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_value_and_gradient() {
        let p = array![1.0, 3.0];
        let t = array![0.0, 1.0];
        assert_eq!(MSE.compute(p.view(), t.view()).unwrap(), 2.5);
        assert_eq!(MSE.gradient(p.view(), t.view()).unwrap(), array![1.0, 2.0]);
    }

    #[test]
    fn test_mse_shape_mismatch() {
        assert!(MSE.compute(array![1.0].view(), array![1.0, 2.0].view()).is_err());
    }
}
