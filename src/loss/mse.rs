use crate::error::Result;
use crate::loss::{check_pair, check_triple};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f32> {
        check_pair("mse", predicted, expected)?;
        let n = predicted.len() as f32;
        let sum = predicted.as_slice().iter().zip(expected.as_slice())
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f32>();
        Ok(sum / n)
    }

    /// Per-output gradient: 2·(predicted - expected)
    pub fn derivative(predicted: &Matrix, expected: &Matrix, out: &mut Matrix) -> Result<()> {
        check_triple("mse_derivative", predicted, expected, out)?;
        for ((o, p), y) in out.as_mut_slice().iter_mut().zip(predicted.as_slice()).zip(expected.as_slice()) {
            *o = 2.0 * (p - y);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_of_identical_matrices_is_zero() {
        let p = Matrix::from_data(&[vec![0.3, -1.2], vec![4.0, 0.0]]).unwrap();
        assert_eq!(MseLoss::loss(&p, &p).unwrap(), 0.0);
    }

    #[test]
    fn mse_is_mean_of_squares_and_non_negative() {
        let p = Matrix::column(&[0.7, 0.3]).unwrap();
        let t = Matrix::column(&[1.0, 0.0]).unwrap();
        let loss = MseLoss::loss(&p, &t).unwrap();
        assert!(loss >= 0.0);
        assert!((loss - 0.09).abs() < 1e-6);
    }

    #[test]
    fn mse_derivative_is_twice_the_difference() {
        let p = Matrix::column(&[0.7, 0.3, -1.0]).unwrap();
        let t = Matrix::column(&[1.0, 0.0, 1.0]).unwrap();
        let mut g = Matrix::create(3, 1).unwrap();
        MseLoss::derivative(&p, &t, &mut g).unwrap();
        for ((g, p), t) in g.as_slice().iter().zip(p.as_slice()).zip(t.as_slice()) {
            assert!((g - 2.0 * (p - t)).abs() < 1e-6);
        }
    }

    #[test]
    fn mse_rejects_mismatched_shapes() {
        let p = Matrix::create(2, 1).unwrap();
        let t = Matrix::create(3, 1).unwrap();
        assert!(MseLoss::loss(&p, &t).is_err());
        let mut g = Matrix::create(2, 1).unwrap();
        assert!(MseLoss::derivative(&p, &t, &mut g).is_err());
    }
}
