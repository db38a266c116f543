//! Error type shared by the selection and history modules.

use thiserror::Error;

/// Errors raised by region growing, sampling and history commits.
///
/// Undo/redo past the ends of the history are not errors; they report
/// `None` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    /// Pixel index is not a multiple of 4 or lies past the end of the buffer
    #[error("invalid pixel index {index} (buffer length {len})")]
    InvalidPixelIndex { index: usize, len: usize },

    /// Tolerance is negative or NaN
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f64),

    /// Seed coordinate lies outside the raster
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} raster")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    /// Buffer length does not match the stated dimensions
    #[error("buffer of length {len} does not match {width}x{height} dimensions")]
    InvalidDimensions {
        width: usize,
        height: usize,
        len: usize,
    },

    /// SUBTRACT was committed without the pixel universe
    #[error("subtract action requires the pixel universe")]
    MissingUniverse,

    /// Configuration value rejected by `WandConfig::validate`
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Traversal stopped because its cancel token fired
    #[error("selection cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SelectionError>;

#[cfg(feature = "python")]
impl From<SelectionError> for pyo3::PyErr {
    fn from(err: SelectionError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
