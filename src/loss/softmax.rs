use crate::error::{ensure_shape, Result};
use crate::math::matrix::Matrix;

/// Normalizes `input` into a probability distribution over all of its
/// elements, written into `out`.
///
/// The global max is subtracted before exponentiating so large logits do not
/// overflow.
pub fn softmax(input: &Matrix, out: &mut Matrix) -> Result<()> {
    ensure_shape("softmax", input.shape(), out.shape())?;

    let max = input.as_slice().iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0_f32;
    for (o, &x) in out.as_mut_slice().iter_mut().zip(input.as_slice()) {
        *o = (x - max).exp();
        sum += *o;
    }
    for o in out.as_mut_slice() {
        *o /= sum;
    }
    Ok(())
}
