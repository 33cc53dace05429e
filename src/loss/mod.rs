pub mod mse;
pub mod mae;
pub mod cross_entropy;
pub mod softmax;
pub mod loss_type;

pub use mse::MseLoss;
pub use mae::MaeLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use softmax::softmax;
pub use loss_type::LossKind;

use crate::error::{ensure_shape, Result};
use crate::math::matrix::Matrix;

/// Shape check shared by every loss: `pred` and `target` must match.
pub(crate) fn check_pair(op: &'static str, pred: &Matrix, target: &Matrix) -> Result<()> {
    ensure_shape(op, pred.shape(), target.shape())
}

/// Shape check for derivatives: `pred`, `target` and `out` must all match.
pub(crate) fn check_triple(
    op: &'static str,
    pred: &Matrix,
    target: &Matrix,
    out: &Matrix,
) -> Result<()> {
    check_pair(op, pred, target)?;
    ensure_shape(op, pred.shape(), out.shape())
}
