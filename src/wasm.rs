//! WebAssembly exports for browser annotation front ends.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! Images arrive as flat RGBA byte arrays (`width * height * 4`). Masks
//! cross the boundary as sorted `Uint32Array`s of red-channel offsets.
//! Errors surface as thrown strings.

use wasm_bindgen::prelude::*;

use crate::error::SelectionError;
use crate::mask::Mask;
use crate::selection::raster::{coord_to_data_array_indices, Raster};
use crate::selection::{magic_wand, shortest_path, TolerancePreview};
use crate::session::{SelectionMode, SelectionSession, WandConfig};

fn to_js(err: SelectionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn sorted(mask: &Mask) -> Vec<u32> {
    let mut pixels: Vec<u32> = mask.iter().map(|&p| p as u32).collect();
    pixels.sort_unstable();
    pixels
}

fn to_mask(pixels: &[u32]) -> Mask {
    pixels.iter().map(|&p| p as usize).collect()
}

// ============================================================================
// Magic Wand
// ============================================================================

/// Flood fill from (x, y) accepting neighbors within `tolerance` of the seed.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Sorted red-channel offsets of the selected pixels
#[wasm_bindgen]
pub fn floodfill_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    tolerance: f64,
) -> Result<Vec<u32>, JsValue> {
    let raster = Raster::new(data, width, height).map_err(to_js)?;
    let mask = magic_wand::floodfill(&raster, x, y, tolerance).map_err(to_js)?;
    Ok(sorted(&mask))
}

/// Flood fill whose reference colors include the pixels under `scribble`.
#[wasm_bindgen]
pub fn scribble_floodfill_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    tolerance: f64,
    scribble: &[u32],
) -> Result<Vec<u32>, JsValue> {
    let raster = Raster::new(data, width, height).map_err(to_js)?;
    let mask = magic_wand::scribble_floodfill(&raster, x, y, tolerance, &to_mask(scribble)).map_err(to_js)?;
    Ok(sorted(&mask))
}

// ============================================================================
// Shortest Paths
// ============================================================================

/// Squared bottleneck distance from (x, y) to every pixel, one entry per
/// pixel. Unreachable pixels are `Infinity`.
#[wasm_bindgen]
pub fn shortest_paths_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    tolerance_limit: f64,
) -> Result<Vec<f64>, JsValue> {
    let raster = Raster::new(data, width, height).map_err(to_js)?;
    let distances = shortest_path::shortest_paths(&raster, x, y, tolerance_limit).map_err(to_js)?;
    Ok(distances
        .into_iter()
        .map(|d| d.map_or(f64::INFINITY, f64::from))
        .collect())
}

/// Offsets of the red, green, blue and alpha bytes of (x, y).
#[wasm_bindgen]
pub fn coord_to_data_array_index_wasm(x: usize, y: usize, width: usize) -> Vec<u32> {
    coord_to_data_array_indices(x, y, width)
        .iter()
        .map(|&i| i as u32)
        .collect()
}

// ============================================================================
// Session
// ============================================================================

/// Mask editing session over one image.
#[wasm_bindgen]
pub struct WandSession {
    inner: SelectionSession,
    preview: Option<TolerancePreview>,
}

#[wasm_bindgen]
impl WandSession {
    /// `config` is an optional JSON object; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(data: Vec<u8>, width: usize, height: usize, config: Option<String>) -> Result<WandSession, JsValue> {
        let config = match config {
            Some(json) => WandConfig::from_json(&json).map_err(to_js)?,
            None => WandConfig::default(),
        };
        let inner = SelectionSession::new(data, width, height, config).map_err(to_js)?;
        Ok(WandSession { inner, preview: None })
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), JsValue> {
        self.inner.set_tolerance(tolerance).map_err(to_js)
    }

    /// `mode` is "add" or "subtract"; `stroke` holds the pixels dragged over.
    pub fn magic_wand(&mut self, x: usize, y: usize, mode: &str, stroke: &[u32]) -> Result<Vec<u32>, JsValue> {
        let mode: SelectionMode = mode.parse().map_err(to_js)?;
        let mask = self.inner.magic_wand(x, y, mode, &to_mask(stroke)).map_err(to_js)?;
        Ok(sorted(mask))
    }

    pub fn paint(&mut self, pixels: &[u32]) -> Result<Vec<u32>, JsValue> {
        let mask = self.inner.paint(&to_mask(pixels)).map_err(to_js)?;
        Ok(sorted(mask))
    }

    pub fn erase(&mut self, pixels: &[u32]) -> Result<Vec<u32>, JsValue> {
        let mask = self.inner.erase(&to_mask(pixels)).map_err(to_js)?;
        Ok(sorted(mask))
    }

    pub fn invert(&mut self) -> Result<Vec<u32>, JsValue> {
        Ok(sorted(self.inner.invert().map_err(to_js)?))
    }

    pub fn clear(&mut self) -> Result<Vec<u32>, JsValue> {
        Ok(sorted(self.inner.clear().map_err(to_js)?))
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.inner.undo().is_some()
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.inner.redo().is_some()
    }

    pub fn save(&mut self) {
        self.inner.save();
    }

    pub fn is_saved(&self) -> bool {
        self.inner.is_saved()
    }

    pub fn mask(&self) -> Vec<u32> {
        sorted(self.inner.mask())
    }

    /// One byte per pixel, 255 where selected.
    pub fn bitmap(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.bitmap().map_err(to_js)
    }

    /// Start a tolerance preview seeded at (x, y), replacing any open one.
    pub fn begin_preview(&mut self, x: usize, y: usize) -> Result<(), JsValue> {
        self.preview = Some(self.inner.begin_preview(x, y).map_err(to_js)?);
        Ok(())
    }

    /// Move the preview slider; returns the current preview mask.
    pub fn preview_tolerance(&mut self, tolerance: f64) -> Result<Vec<u32>, JsValue> {
        let preview = self
            .preview
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no preview in progress"))?;
        preview.set_tolerance(tolerance).map_err(to_js)?;
        Ok(sorted(preview.mask()))
    }

    /// Commit the open preview and close it.
    pub fn commit_preview(&mut self, mode: &str) -> Result<Vec<u32>, JsValue> {
        let mode: SelectionMode = mode.parse().map_err(to_js)?;
        let preview = self
            .preview
            .take()
            .ok_or_else(|| JsValue::from_str("no preview in progress"))?;
        Ok(sorted(self.inner.commit_preview(&preview, mode).map_err(to_js)?))
    }

    pub fn cancel_preview(&mut self) {
        self.preview = None;
    }
}
