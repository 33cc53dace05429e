use thiserror::Error;

/// Error type shared by every fallible operation in the crate.
#[derive(Error, Debug)]
pub enum NnError {
    #[error("invalid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("size overflow for a {rows}x{cols} matrix")]
    Overflow { rows: usize, cols: usize },

    #[error("allocation of {elements} elements failed")]
    AllocationFailed { elements: usize },

    #[error("index ({row}, {col}) out of bounds for a {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("shape mismatch in {op}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("gradient buffers are not allocated; call prepare_training first")]
    TrainingStateMissing,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;

/// Returns a `ShapeMismatch` unless `found == expected`.
pub(crate) fn ensure_shape(
    op: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<()> {
    if expected != found {
        return Err(NnError::ShapeMismatch { op, expected, found });
    }
    Ok(())
}
