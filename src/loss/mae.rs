use crate::error::Result;
use crate::loss::{check_pair, check_triple};
use crate::math::matrix::Matrix;

pub struct MaeLoss;

impl MaeLoss {
    /// Scalar MAE: mean(|predicted - expected|)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f32> {
        check_pair("mae", predicted, expected)?;
        let n = predicted.len() as f32;
        let sum = predicted.as_slice().iter().zip(expected.as_slice())
            .map(|(p, y)| (p - y).abs())
            .sum::<f32>();
        Ok(sum / n)
    }

    /// Per-output subgradient: sign(p - y)  (0 when equal)
    pub fn derivative(predicted: &Matrix, expected: &Matrix, out: &mut Matrix) -> Result<()> {
        check_triple("mae_derivative", predicted, expected, out)?;
        for ((o, p), y) in out.as_mut_slice().iter_mut().zip(predicted.as_slice()).zip(expected.as_slice()) {
            let diff = p - y;
            *o = if diff > 0.0 { 1.0 } else if diff < 0.0 { -1.0 } else { 0.0 };
        }
        Ok(())
    }
}
