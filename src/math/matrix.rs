use std::fmt;

use crate::error::{NnError, Result};

/// Number of `f32` values in one aligned lane.
pub const LANE_WIDTH: usize = 8;

/// Byte alignment of every matrix buffer.
pub const BUFFER_ALIGN: usize = 32;

/// One 32-byte aligned block of storage. A `Vec<Lane>` is a contiguous run of
/// `f32` whose first element sits on a 32-byte boundary.
#[derive(Clone, Copy, Default)]
#[repr(C, align(32))]
struct Lane([f32; LANE_WIDTH]);

const _: () = assert!(std::mem::size_of::<Lane>() == BUFFER_ALIGN);
const _: () = assert!(std::mem::align_of::<Lane>() == BUFFER_ALIGN);

/// Dense row-major `f32` matrix.
///
/// Element `(r, c)` lives at offset `r * stride + c`. The buffer always holds
/// at least `rows * stride` values and is released once, on drop.
pub struct Matrix {
    rows: usize,
    cols: usize,
    stride: usize,
    lanes: Vec<Lane>,
}

/// Summary of all elements of a matrix, computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatrixStats {
    pub min: f32,
    pub max: f32,
    pub sum: f32,
    pub mean: f32,
}

impl Matrix {
    /// Allocates a zero-filled `rows x cols` matrix.
    ///
    /// Fails on a zero dimension, on size overflow, or when the allocator
    /// cannot satisfy the request.
    pub fn create(rows: usize, cols: usize) -> Result<Matrix> {
        if rows == 0 || cols == 0 {
            return Err(NnError::InvalidDimensions { rows, cols });
        }
        let stride = cols;
        let elements = rows
            .checked_mul(stride)
            .filter(|n| n.checked_mul(std::mem::size_of::<f32>()).is_some())
            .ok_or(NnError::Overflow { rows, cols })?;

        let lane_count = elements.div_ceil(LANE_WIDTH);
        let mut lanes = Vec::new();
        lanes
            .try_reserve_exact(lane_count)
            .map_err(|_| NnError::AllocationFailed { elements })?;
        lanes.resize(lane_count, Lane::default());

        Ok(Matrix { rows, cols, stride, lanes })
    }

    pub fn create_with_value(rows: usize, cols: usize, value: f32) -> Result<Matrix> {
        let mut res = Matrix::create(rows, cols)?;
        res.fill(value);
        Ok(res)
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_data(data: &[Vec<f32>]) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());
        if data.iter().any(|row| row.len() != cols) {
            return Err(NnError::InvalidDimensions { rows, cols });
        }

        let mut res = Matrix::create(rows, cols)?;
        for (r, row) in data.iter().enumerate() {
            res.row_mut(r).copy_from_slice(row);
        }
        Ok(res)
    }

    /// Builds a `(values.len(), 1)` column vector.
    pub fn column(values: &[f32]) -> Result<Matrix> {
        let mut res = Matrix::create(values.len(), 1)?;
        res.as_mut_slice().copy_from_slice(values);
        Ok(res)
    }

    /// Deep copy of shape and contents.
    pub fn copy(&self) -> Result<Matrix> {
        let mut res = Matrix::create(self.rows, self.cols)?;
        res.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(res)
    }

    /// Overwrites `self` with the contents of a same-shaped `src`.
    pub fn copy_from(&mut self, src: &Matrix) -> Result<()> {
        crate::error::ensure_shape("copy_from", self.shape(), src.shape())?;
        self.as_mut_slice().copy_from_slice(src.as_slice());
        Ok(())
    }

    pub fn fill(&mut self, value: f32) {
        self.as_mut_slice().fill(value);
    }

    pub fn zero(&mut self) {
        self.fill(0.0);
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of logical elements (`rows * cols`).
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false: a matrix has at least one element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bounds-checked read. Returns `None` for an out-of-range index.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.as_slice()[row * self.stride + col])
    }

    /// Bounds-checked write. Leaves the matrix untouched on failure.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(NnError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let stride = self.stride;
        self.as_mut_slice()[row * stride + col] = value;
        Ok(())
    }

    /// Unchecked read for hot loops.
    ///
    /// # Safety
    ///
    /// The caller must guarantee `row < self.rows()` and `col < self.cols()`.
    /// Out-of-range indices are undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> f32 {
        debug_assert!(row < self.rows && col < self.cols);
        *self.as_slice().get_unchecked(row * self.stride + col)
    }

    /// Unchecked write for hot loops.
    ///
    /// # Safety
    ///
    /// The caller must guarantee `row < self.rows()` and `col < self.cols()`.
    /// Out-of-range indices are undefined behavior.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: f32) {
        debug_assert!(row < self.rows && col < self.cols);
        let stride = self.stride;
        *self.as_mut_slice().get_unchecked_mut(row * stride + col) = value;
    }

    /// The logical elements, row-major. With `stride == cols` this is the
    /// whole matrix in order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: `Lane` is `repr(C)` over `[f32; LANE_WIDTH]` with no padding,
        // and `lanes` holds at least `rows * stride` values.
        unsafe {
            std::slice::from_raw_parts(self.lanes.as_ptr().cast::<f32>(), self.rows * self.stride)
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: see `as_slice`; the exclusive borrow of `self` covers the buffer.
        unsafe {
            std::slice::from_raw_parts_mut(
                self.lanes.as_mut_ptr().cast::<f32>(),
                self.rows * self.stride,
            )
        }
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.stride;
        &self.as_slice()[start..start + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.stride;
        let cols = self.cols;
        &mut self.as_mut_slice()[start..start + cols]
    }

    /// Returns a new `(cols, rows)` matrix.
    pub fn transpose(&self) -> Result<Matrix> {
        let mut res = Matrix::create(self.cols, self.rows)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                // SAFETY: i < rows, j < cols, and `res` is (cols, rows).
                unsafe { res.set_unchecked(j, i, self.get_unchecked(i, j)) };
            }
        }
        Ok(res)
    }

    /// Min, max, sum and mean over all elements.
    pub fn stats(&self) -> MatrixStats {
        let values = self.as_slice();
        let first = values[0];
        let (min, max, sum) = values.iter().fold((first, first, 0.0_f32), |(lo, hi, sum), &v| {
            (lo.min(v), hi.max(v), sum + v)
        });
        MatrixStats {
            min,
            max,
            sum,
            mean: sum / values.len() as f32,
        }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("stride", &self.stride)
            .field("data", &self.as_slice())
            .finish()
    }
}

/// Pretty-printer: a header line, then one bracketed row per line with six
/// decimal digits.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix [{} x {}]:", self.rows, self.cols)?;
        for r in 0..self.rows {
            write!(f, "[")?;
            for (c, value) in self.row(r).iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value:.6}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_zeroed_and_aligned() {
        let m = Matrix::create(3, 5).unwrap();
        assert_eq!(m.shape(), (3, 5));
        assert_eq!(m.stride(), 5);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(m.as_slice().as_ptr() as usize % BUFFER_ALIGN, 0);
    }

    #[test]
    fn create_rejects_zero_and_overflowing_dimensions() {
        assert!(matches!(
            Matrix::create(0, 4),
            Err(NnError::InvalidDimensions { rows: 0, cols: 4 })
        ));
        assert!(matches!(Matrix::create(4, 0), Err(NnError::InvalidDimensions { .. })));
        assert!(matches!(
            Matrix::create(usize::MAX, 2),
            Err(NnError::Overflow { .. })
        ));
        assert!(matches!(
            Matrix::create(usize::MAX / 2, 1),
            Err(NnError::Overflow { .. })
        ));
    }

    #[test]
    fn create_with_value_and_zero() {
        for &(r, c) in &[(1, 1), (2, 7), (9, 3)] {
            let mut m = Matrix::create_with_value(r, c, 1.5).unwrap();
            assert!(m.as_slice().iter().all(|&v| v == 1.5));
            m.zero();
            assert!(m.as_slice().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn checked_access_does_not_mutate_on_failure() {
        let mut m = Matrix::create(2, 2).unwrap();
        m.set(1, 0, 4.0).unwrap();
        assert_eq!(m.get(1, 0), Some(4.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 2), None);

        let err = m.set(0, 2, 9.0).unwrap_err();
        assert!(matches!(err, NnError::IndexOutOfBounds { row: 0, col: 2, .. }));
        assert_eq!(m.as_slice(), &[0.0, 0.0, 4.0, 0.0]);
    }

    #[test]
    fn copy_is_deep() {
        let src = Matrix::from_data(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut dst = src.copy().unwrap();
        dst.set(0, 0, -1.0).unwrap();
        assert_eq!(src.get(0, 0), Some(1.0));
        assert_eq!(dst.as_slice(), &[-1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn copy_from_checks_shape() {
        let src = Matrix::column(&[1.0, 2.0, 3.0]).unwrap();
        let mut wrong = Matrix::create(2, 1).unwrap();
        assert!(wrong.copy_from(&src).is_err());
        let mut right = Matrix::create(3, 1).unwrap();
        right.copy_from(&src).unwrap();
        assert_eq!(right.as_slice(), src.as_slice());
    }

    #[test]
    fn from_data_rejects_ragged_rows() {
        assert!(Matrix::from_data(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::from_data(&[]).is_err());
    }

    #[test]
    fn transpose_swaps_axes() {
        let m = Matrix::from_data(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose().unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn stats_in_one_pass() {
        let m = Matrix::from_data(&[vec![-1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let s = m.stats();
        assert_eq!(s.min, -1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.sum, 8.0);
        assert_eq!(s.mean, 2.0);
    }

    #[test]
    fn display_uses_six_decimals() {
        let m = Matrix::from_data(&[vec![1.0, 0.5]]).unwrap();
        assert_eq!(m.to_string(), "Matrix [1 x 2]:\n[1.000000, 0.500000]\n");
    }
}
