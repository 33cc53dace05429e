use crate::error::Result;
use crate::loss::{check_pair, check_triple};
use crate::math::matrix::Matrix;

/// Element-wise (binary form) cross-entropy: `-mean(t · ln p)`.
pub struct CrossEntropyLoss;

/// Predictions are clamped to `[EPS, 1 - EPS]` before any log or division.
/// Chosen so that `1 - EPS` is still distinct from 1 in `f32`.
pub const EPS: f32 = 1e-7;

#[inline]
fn clamp_probability(p: f32) -> f32 {
    p.clamp(EPS, 1.0 - EPS)
}

impl CrossEntropyLoss {
    /// Scalar loss: L = -mean(expected[i] * ln(clamp(predicted[i])))
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f32> {
        check_pair("cross_entropy", predicted, expected)?;
        let n = predicted.len() as f32;
        let sum = predicted.as_slice().iter().zip(expected.as_slice())
            .map(|(&p, &y)| y * clamp_probability(p).ln())
            .sum::<f32>();
        Ok(-sum / n)
    }

    /// Per-output gradient w.r.t. the prediction: -expected[i] / clamp(predicted[i]),
    /// clamped over the same interval as `loss`.
    pub fn derivative(predicted: &Matrix, expected: &Matrix, out: &mut Matrix) -> Result<()> {
        check_triple("cross_entropy_derivative", predicted, expected, out)?;
        for ((o, &p), &y) in out.as_mut_slice().iter_mut().zip(predicted.as_slice()).zip(expected.as_slice()) {
            *o = -y / clamp_probability(p);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_matches_definition() {
        let p = Matrix::column(&[0.7, 0.3]).unwrap();
        let t = Matrix::column(&[1.0, 0.0]).unwrap();
        let expected = -(0.7_f32.ln()) / 2.0;
        assert!((CrossEntropyLoss::loss(&p, &t).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn loss_is_finite_at_the_boundaries() {
        let p = Matrix::column(&[0.0, 1.0]).unwrap();
        let t = Matrix::column(&[1.0, 1.0]).unwrap();
        assert!(CrossEntropyLoss::loss(&p, &t).unwrap().is_finite());
    }

    #[test]
    fn derivative_reads_target_and_clamps_both_ends() {
        let p = Matrix::column(&[0.5, 0.0, 1.0]).unwrap();
        let t = Matrix::column(&[0.0, 1.0, 1.0]).unwrap();
        let mut g = Matrix::create(3, 1).unwrap();
        CrossEntropyLoss::derivative(&p, &t, &mut g).unwrap();

        // Zero target yields zero gradient regardless of the prediction.
        assert_eq!(g.get(0, 0), Some(0.0));
        assert!((g.get(1, 0).unwrap() - (-1.0 / EPS)).abs() / (1.0 / EPS) < 1e-3);
        assert!((g.get(2, 0).unwrap() - (-1.0 / (1.0 - EPS))).abs() < 1e-5);
        assert!(g.as_slice().iter().all(|v| v.is_finite()));
    }
}
