//! Matrix operations that write into a caller-supplied output.
//!
//! Every function validates shapes up front and returns `ShapeMismatch`
//! before touching `out`. None of them allocate.

use crate::error::{ensure_shape, NnError, Result};
use crate::math::matrix::Matrix;

/// `out = a · b`.
pub fn multiply(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
    if a.cols() != b.rows() {
        return Err(NnError::ShapeMismatch {
            op: "multiply",
            expected: (a.cols(), b.cols()),
            found: b.shape(),
        });
    }
    ensure_shape("multiply", (a.rows(), b.cols()), out.shape())?;

    for i in 0..a.rows() {
        for j in 0..b.cols() {
            let mut sum = 0.0_f32;
            for k in 0..a.cols() {
                // SAFETY: i < a.rows, k < a.cols == b.rows, j < b.cols.
                sum += unsafe { a.get_unchecked(i, k) * b.get_unchecked(k, j) };
            }
            // SAFETY: out is (a.rows, b.cols).
            unsafe { out.set_unchecked(i, j, sum) };
        }
    }

    Ok(())
}

pub fn add(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
    zip_with("add", a, b, out, |x, y| x + y)
}

pub fn subtract(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
    zip_with("subtract", a, b, out, |x, y| x - y)
}

/// Element-wise (Hadamard) product of two same-shape matrices.
pub fn hadamard(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<()> {
    zip_with("hadamard", a, b, out, |x, y| x * y)
}

/// `out = k · a`. Fails on a shape mismatch like the other ops.
pub fn scale(a: &Matrix, k: f32, out: &mut Matrix) -> Result<()> {
    ensure_shape("scale", a.shape(), out.shape())?;
    for (o, &x) in out.as_mut_slice().iter_mut().zip(a.as_slice()) {
        *o = x * k;
    }
    Ok(())
}

fn zip_with<F>(op: &'static str, a: &Matrix, b: &Matrix, out: &mut Matrix, f: F) -> Result<()>
where
    F: Fn(f32, f32) -> f32,
{
    ensure_shape(op, a.shape(), b.shape())?;
    ensure_shape(op, a.shape(), out.shape())?;

    for ((o, &x), &y) in out.as_mut_slice().iter_mut().zip(a.as_slice()).zip(b.as_slice()) {
        *o = f(x, y);
    }
    Ok(())
}
