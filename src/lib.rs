//! Wandmask: interactive mask editing for image annotation.
//!
//! Region-growing selection tools with Python bindings via PyO3 and WASM
//! bindings for JavaScript.
//!
//! ## Image Format
//! Images are packed RGBA `u8` buffers, row-major, 4 bytes per pixel.
//! Python callers pass (height, width, 4) arrays.
//!
//! A pixel is identified by the offset of its red channel in the buffer
//! (`(x + y * width) * 4`); a mask is a set of such offsets.
//!
//! ## Layout
//! - [`selection`]: magic wand flood fills, bottleneck shortest paths and
//!   the raster sampling they share
//! - [`mask`]: set algebra over masks, reversible actions and the
//!   undo/redo history
//! - [`session`]: one image plus its history, the unit a UI talks to

pub mod error;
pub mod mask;
pub mod selection;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, SelectionError};
pub use mask::{ActionType, Direction, Mask, MaskAction, MaskController, PixelIndex, Tool};
pub use selection::{
    floodfill, scribble_floodfill, shortest_paths, CancelToken, Color, FillOptions, Raster,
    TolerancePreview,
};
pub use session::{SelectionMode, SelectionSession, WandConfig};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::Array2;
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::SelectionError;
    use crate::mask::Mask;
    use crate::selection::{magic_wand, shortest_path, Raster};
    use crate::session::{SelectionMode, SelectionSession, WandConfig};

    fn sorted(mask: &Mask) -> Vec<usize> {
        let mut pixels: Vec<usize> = mask.iter().copied().collect();
        pixels.sort_unstable();
        pixels
    }

    /// Copy an (H, W, 4) array of any memory layout into a packed buffer.
    fn rgba_buffer(image: &PyReadonlyArray3<'_, u8>) -> PyResult<(Vec<u8>, usize, usize)> {
        let view = image.as_array();
        let (height, width, channels) = view.dim();
        if channels != 4 {
            return Err(SelectionError::InvalidDimensions {
                width,
                height,
                len: view.len(),
            }
            .into());
        }
        Ok((view.iter().copied().collect(), width, height))
    }

    fn to_grid<'py, T>(py: Python<'py>, values: Vec<T>, width: usize, height: usize) -> PyResult<Bound<'py, PyArray2<T>>>
    where
        T: numpy::Element,
    {
        let grid = Array2::from_shape_vec((height, width), values).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(grid.into_pyarray(py))
    }

    // ========================================================================
    // Magic Wand
    // ========================================================================

    /// Flood fill from (x, y) accepting neighbors within `tolerance` of the
    /// seed color.
    ///
    /// Returns the sorted red-channel offsets of the selected pixels.
    #[pyfunction]
    pub fn floodfill(image: PyReadonlyArray3<'_, u8>, x: usize, y: usize, tolerance: f64) -> PyResult<Vec<usize>> {
        let (pixels, width, height) = rgba_buffer(&image)?;
        let raster = Raster::new(&pixels, width, height)?;
        Ok(sorted(&magic_wand::floodfill(&raster, x, y, tolerance)?))
    }

    /// Flood fill whose reference colors include those under `scribble`.
    #[pyfunction]
    #[pyo3(signature = (image, x, y, tolerance, scribble=Vec::new()))]
    pub fn scribble_floodfill(
        image: PyReadonlyArray3<'_, u8>,
        x: usize,
        y: usize,
        tolerance: f64,
        scribble: Vec<usize>,
    ) -> PyResult<Vec<usize>> {
        let (pixels, width, height) = rgba_buffer(&image)?;
        let raster = Raster::new(&pixels, width, height)?;
        let scribble: Mask = scribble.into_iter().collect();
        Ok(sorted(&magic_wand::scribble_floodfill(&raster, x, y, tolerance, &scribble)?))
    }

    // ========================================================================
    // Shortest Paths
    // ========================================================================

    /// Squared bottleneck distance from (x, y) to every pixel as an (H, W)
    /// float array; unreachable pixels are `inf`.
    #[pyfunction]
    pub fn shortest_paths<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x: usize,
        y: usize,
        tolerance_limit: f64,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let (pixels, width, height) = rgba_buffer(&image)?;
        let raster = Raster::new(&pixels, width, height)?;
        let distances = shortest_path::shortest_paths(&raster, x, y, tolerance_limit)?;
        let values = distances
            .into_iter()
            .map(|d| d.map_or(f64::INFINITY, f64::from))
            .collect();
        to_grid(py, values, width, height)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Mask editing session over one image.
    ///
    /// Every editing method returns the resulting mask as sorted pixel
    /// offsets.
    #[pyclass(name = "Session")]
    pub struct PySession {
        inner: SelectionSession,
    }

    #[pymethods]
    impl PySession {
        /// `config` is an optional JSON object with `tolerance`,
        /// `preview_limit` and `cancel_check_interval`.
        #[new]
        #[pyo3(signature = (image, config=None))]
        fn new(image: PyReadonlyArray3<'_, u8>, config: Option<&str>) -> PyResult<Self> {
            let (pixels, width, height) = rgba_buffer(&image)?;
            let config = match config {
                Some(json) => WandConfig::from_json(json)?,
                None => WandConfig::default(),
            };
            Ok(Self {
                inner: SelectionSession::new(pixels, width, height, config)?,
            })
        }

        fn set_tolerance(&mut self, tolerance: f64) -> PyResult<()> {
            Ok(self.inner.set_tolerance(tolerance)?)
        }

        /// `mode` is "add" or "subtract".
        #[pyo3(signature = (x, y, mode="add", stroke=Vec::new()))]
        fn magic_wand(&mut self, x: usize, y: usize, mode: &str, stroke: Vec<usize>) -> PyResult<Vec<usize>> {
            let mode: SelectionMode = mode.parse()?;
            let stroke: Mask = stroke.into_iter().collect();
            Ok(sorted(self.inner.magic_wand(x, y, mode, &stroke)?))
        }

        fn paint(&mut self, pixels: Vec<usize>) -> PyResult<Vec<usize>> {
            let pixels: Mask = pixels.into_iter().collect();
            Ok(sorted(self.inner.paint(&pixels)?))
        }

        fn erase(&mut self, pixels: Vec<usize>) -> PyResult<Vec<usize>> {
            let pixels: Mask = pixels.into_iter().collect();
            Ok(sorted(self.inner.erase(&pixels)?))
        }

        fn invert(&mut self) -> PyResult<Vec<usize>> {
            Ok(sorted(self.inner.invert()?))
        }

        fn clear(&mut self) -> PyResult<Vec<usize>> {
            Ok(sorted(self.inner.clear()?))
        }

        /// Returns False when there is nothing to undo.
        fn undo(&mut self) -> bool {
            self.inner.undo().is_some()
        }

        /// Returns False when there is nothing to redo.
        fn redo(&mut self) -> bool {
            self.inner.redo().is_some()
        }

        fn save(&mut self) {
            self.inner.save();
        }

        fn is_saved(&self) -> bool {
            self.inner.is_saved()
        }

        fn mask(&self) -> Vec<usize> {
            sorted(self.inner.mask())
        }

        /// Current mask as an (H, W) array, 255 where selected.
        fn bitmap<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u8>>> {
            to_grid(py, self.inner.bitmap()?, self.inner.width(), self.inner.height())
        }
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    #[pymodule]
    pub fn wandmask(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(floodfill, m)?)?;
        m.add_function(wrap_pyfunction!(scribble_floodfill, m)?)?;
        m.add_function(wrap_pyfunction!(shortest_paths, m)?)?;
        m.add_class::<PySession>()?;
        Ok(())
    }
}
