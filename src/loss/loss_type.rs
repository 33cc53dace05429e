use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::{CrossEntropyLoss, MaeLoss, MseLoss};
use crate::math::matrix::Matrix;

/// Selects which loss function the training loop uses.
///
/// - `Mae`          — Mean absolute error.
/// - `Mse`          — Mean-squared error; pair with Sigmoid or Tanh output.
/// - `CrossEntropy` — Element-wise cross-entropy; pair with Sigmoid output
///   (or a softmax-normalized output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    Mae,
    Mse,
    CrossEntropy,
}

impl LossKind {
    /// Scalar loss for one sample: the mean over all elements.
    pub fn loss(self, predicted: &Matrix, expected: &Matrix) -> Result<f32> {
        match self {
            LossKind::Mae => MaeLoss::loss(predicted, expected),
            LossKind::Mse => MseLoss::loss(predicted, expected),
            LossKind::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    /// Writes the per-element gradient of the loss w.r.t. `predicted` into `out`.
    pub fn derivative(self, predicted: &Matrix, expected: &Matrix, out: &mut Matrix) -> Result<()> {
        match self {
            LossKind::Mae => MaeLoss::derivative(predicted, expected, out),
            LossKind::Mse => MseLoss::derivative(predicted, expected, out),
            LossKind::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected, out),
        }
    }
}
