//! Editing session for one image.
//!
//! A [`SelectionSession`] owns the pixels, the pixel universe and the mask
//! history for a single image. The UI layer translates gestures into calls
//! on the session: a click or stroke with the magic wand, a paint or erase
//! stroke, invert, clear, undo and redo. Each call returns the new mask for
//! rendering.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};
use crate::mask::{set_ops, ActionType, Mask, MaskAction, MaskController, Tool};
use crate::selection::cancel::{CancelToken, FillOptions, DEFAULT_CHECK_INTERVAL};
use crate::selection::raster::{self, Raster};
use crate::selection::{magic_wand, TolerancePreview};

/// Tunables for a session. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandConfig {
    /// Magic wand tolerance (Euclidean RGB distance)
    pub tolerance: f64,
    /// Largest tolerance the preview slider can reach
    pub preview_limit: f64,
    /// Pixels processed between cancellation checks
    pub cancel_check_interval: usize,
}

impl Default for WandConfig {
    fn default() -> Self {
        Self {
            tolerance: 32.0,
            preview_limit: 128.0,
            cancel_check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl WandConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| SelectionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        magic_wand::tolerance_sq(self.tolerance)?;
        magic_wand::tolerance_sq(self.preview_limit)?;
        if self.cancel_check_interval == 0 {
            return Err(SelectionError::InvalidConfig(
                "cancel_check_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn fill_options(&self, cancel: Option<CancelToken>) -> FillOptions {
        FillOptions {
            cancel,
            check_interval: self.cancel_check_interval,
        }
    }
}

/// Whether a wand gesture grows or shrinks the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Add,
    Subtract,
}

impl SelectionMode {
    pub fn action_type(self) -> ActionType {
        match self {
            SelectionMode::Add => ActionType::Add,
            SelectionMode::Subtract => ActionType::Subtract,
        }
    }
}

impl FromStr for SelectionMode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(SelectionMode::Add),
            "subtract" => Ok(SelectionMode::Subtract),
            other => Err(SelectionError::InvalidConfig(format!("unknown selection mode '{other}'"))),
        }
    }
}

/// Pixels, universe and mask history of one image being edited.
#[derive(Debug)]
pub struct SelectionSession {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    universe: Mask,
    controller: MaskController,
    config: WandConfig,
    cancel: Option<CancelToken>,
}

impl SelectionSession {
    /// Start a session with an empty mask.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, config: WandConfig) -> Result<Self> {
        Self::with_mask(pixels, width, height, config, Mask::new())
    }

    /// Start a session from a previously stored mask, which counts as saved.
    ///
    /// Every index in `initial` must address a pixel of the image.
    pub fn with_mask(
        pixels: Vec<u8>,
        width: usize,
        height: usize,
        config: WandConfig,
        initial: Mask,
    ) -> Result<Self> {
        let raster = Raster::new(&pixels, width, height)?;
        for &index in &initial {
            raster::check_pixel_index(&raster, index)?;
        }
        config.validate()?;
        let universe = raster::universe(width, height)?;
        log::debug!("session opened for {}x{} image", width, height);

        Ok(Self {
            pixels,
            width,
            height,
            universe,
            controller: MaskController::new(initial),
            config,
            cancel: None,
        })
    }

    pub fn raster(&self) -> Raster<'_> {
        Raster::new_unchecked(&self.pixels, self.width, self.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn config(&self) -> &WandConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WandConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<()> {
        magic_wand::tolerance_sq(tolerance)?;
        self.config.tolerance = tolerance;
        Ok(())
    }

    /// Token checked by subsequent fills; cancelling it aborts a running fill.
    pub fn set_cancel_token(&mut self, cancel: Option<CancelToken>) {
        self.cancel = cancel;
    }

    pub fn universe(&self) -> &Mask {
        &self.universe
    }

    pub fn controller(&self) -> &MaskController {
        &self.controller
    }

    pub fn mask(&self) -> &Mask {
        self.controller.mask()
    }

    /// Current mask as one byte per pixel, ready for encoding.
    pub fn bitmap(&self) -> Result<Vec<u8>> {
        raster::mask_to_bitmap(self.controller.mask(), self.width, self.height)
    }

    /// Magic wand gesture at (x, y).
    ///
    /// `stroke` holds the pixels the pointer crossed while held down. If it
    /// covers anything besides the seed, the scribble fill is used with the
    /// stroke as extra references; otherwise the basic flood fill.
    pub fn magic_wand(&mut self, x: usize, y: usize, mode: SelectionMode, stroke: &Mask) -> Result<&Mask> {
        let options = self.config.fill_options(self.cancel.clone());
        let tolerance = self.config.tolerance;
        let raster = self.raster();
        raster::check_coord(&raster, x, y)?;
        let seed = raster::pixel_index_of(x, y, self.width);

        let (tool, delta) = if stroke.iter().any(|&p| p != seed) {
            let delta = magic_wand::scribble_floodfill_with(&raster, x, y, tolerance, stroke, &options)?;
            (Tool::Scribble, delta)
        } else {
            let delta = magic_wand::floodfill_with(&raster, x, y, tolerance, &options)?;
            (Tool::MagicWand, delta)
        };

        self.commit(MaskAction::new(mode.action_type(), tool, delta))
    }

    /// Paintbrush stroke: select exactly the painted pixels.
    pub fn paint(&mut self, pixels: &Mask) -> Result<&Mask> {
        let pixels = set_ops::intersection(pixels, &self.universe);
        self.commit(MaskAction::new(ActionType::Add, Tool::Paintbrush, pixels))
    }

    /// Eraser stroke: deselect exactly the painted pixels.
    pub fn erase(&mut self, pixels: &Mask) -> Result<&Mask> {
        self.commit(MaskAction::new(ActionType::Subtract, Tool::Eraser, pixels.clone()))
    }

    pub fn invert(&mut self) -> Result<&Mask> {
        self.commit(MaskAction::invert(self.universe.clone()))
    }

    pub fn clear(&mut self) -> Result<&Mask> {
        self.commit(MaskAction::clear(self.controller.mask()))
    }

    pub fn undo(&mut self) -> Option<&MaskAction> {
        self.controller.undo()
    }

    pub fn redo(&mut self) -> Option<&MaskAction> {
        self.controller.redo()
    }

    /// Mark the current mask as persisted.
    pub fn save(&mut self) {
        self.controller.save();
    }

    pub fn is_saved(&self) -> bool {
        self.controller.is_saved()
    }

    /// Precompute a tolerance preview seeded at (x, y) up to the configured limit.
    pub fn begin_preview(&self, x: usize, y: usize) -> Result<TolerancePreview> {
        let options = self.config.fill_options(self.cancel.clone());
        TolerancePreview::compute(&self.raster(), x, y, self.config.preview_limit, &options)
    }

    /// Commit the preview mask at its current tolerance.
    pub fn commit_preview(&mut self, preview: &TolerancePreview, mode: SelectionMode) -> Result<&Mask> {
        let delta = preview.mask().clone();
        self.commit(MaskAction::new(mode.action_type(), Tool::MagicWand, delta))
    }

    fn commit(&mut self, action: MaskAction) -> Result<&Mask> {
        self.controller.do_action(action, Some(&self.universe))?;
        Ok(self.controller.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE_PIXELS: [usize; 13] = [8, 24, 28, 36, 48, 56, 64, 76, 96, 100, 112, 116, 152];

    fn fixture() -> Vec<u8> {
        let mut data = vec![0u8; 11 * 4 * 4];
        for &red in &WHITE_PIXELS {
            data[red..red + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
        data
    }

    fn session() -> SelectionSession {
        let config = WandConfig {
            tolerance: 1.0,
            ..WandConfig::default()
        };
        SelectionSession::new(fixture(), 11, 4, config).unwrap()
    }

    fn set(items: &[usize]) -> Mask {
        items.iter().copied().collect()
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config = WandConfig::from_json(r#"{"tolerance": 12.5}"#).unwrap();
        assert_eq!(config.tolerance, 12.5);
        assert_eq!(config.preview_limit, WandConfig::default().preview_limit);
        assert_eq!(config.cancel_check_interval, DEFAULT_CHECK_INTERVAL);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            WandConfig::from_json(r#"{"tolerance": -2}"#),
            Err(SelectionError::InvalidTolerance(_))
        ));
        assert!(matches!(
            WandConfig::from_json(r#"{"cancel_check_interval": 0}"#),
            Err(SelectionError::InvalidConfig(_))
        ));
        assert!(matches!(
            WandConfig::from_json("not json"),
            Err(SelectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("add".parse::<SelectionMode>().unwrap(), SelectionMode::Add);
        assert_eq!("subtract".parse::<SelectionMode>().unwrap(), SelectionMode::Subtract);
        assert!("invert".parse::<SelectionMode>().is_err());
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        assert!(matches!(
            SelectionSession::new(vec![0; 10], 2, 2, WandConfig::default()),
            Err(SelectionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_initial_mask_must_lie_in_image() {
        let s = SelectionSession::with_mask(fixture(), 11, 4, WandConfig::default(), set(&[0, 172])).unwrap();
        assert_eq!(s.mask(), &set(&[0, 172]));
        assert!(s.is_saved());

        assert_eq!(
            SelectionSession::with_mask(fixture(), 11, 4, WandConfig::default(), set(&[0, 176])).unwrap_err(),
            SelectionError::InvalidPixelIndex { index: 176, len: 176 }
        );
        assert!(matches!(
            SelectionSession::with_mask(fixture(), 11, 4, WandConfig::default(), set(&[6])),
            Err(SelectionError::InvalidPixelIndex { index: 6, .. })
        ));
    }

    #[test]
    fn test_seed_outside_image() {
        let mut s = session();
        assert!(matches!(
            s.magic_wand(usize::MAX / 2, 0, SelectionMode::Add, &Mask::new()),
            Err(SelectionError::OutOfBounds { .. })
        ));
        assert!(matches!(
            s.magic_wand(3, usize::MAX, SelectionMode::Add, &set(&[0])),
            Err(SelectionError::OutOfBounds { .. })
        ));
        assert!(s.mask().is_empty());
        assert!(s.controller().history().is_empty());
    }

    #[test]
    fn test_click_uses_basic_fill() {
        let mut s = session();
        let seed = raster::pixel_index_of(8, 2, 11);
        s.magic_wand(8, 2, SelectionMode::Add, &set(&[seed])).unwrap();
        assert_eq!(s.mask().len(), 11);
        assert_eq!(s.controller().history()[0].tool(), Tool::MagicWand);
    }

    #[test]
    fn test_stroke_uses_scribble_fill() {
        let mut s = session();
        // Stroke from a black pixel across a white one
        let stroke = set(&[raster::pixel_index_of(6, 1, 11), raster::pixel_index_of(7, 0, 11)]);
        s.magic_wand(6, 1, SelectionMode::Add, &stroke).unwrap();
        assert_eq!(s.controller().history()[0].tool(), Tool::Scribble);
        // White references let the fill cross into white pixels
        assert!(s.mask().contains(&raster::pixel_index_of(7, 0, 11)));
        assert!(s.mask().len() > 2);
    }

    #[test]
    fn test_subtract_then_undo() {
        let mut s = session();
        s.magic_wand(8, 2, SelectionMode::Add, &Mask::new()).unwrap();
        s.magic_wand(6, 1, SelectionMode::Add, &Mask::new()).unwrap();
        assert_eq!(s.mask().len(), 13);

        s.magic_wand(8, 2, SelectionMode::Subtract, &Mask::new()).unwrap();
        assert_eq!(s.mask(), &set(&[68, 72]));

        s.undo().unwrap();
        assert_eq!(s.mask().len(), 13);
    }

    #[test]
    fn test_paint_erase_invert_clear() {
        let mut s = session();
        s.paint(&set(&[0, 4, 8, 9999 * 4])).unwrap();
        assert_eq!(s.mask(), &set(&[0, 4, 8]));

        s.erase(&set(&[4])).unwrap();
        assert_eq!(s.mask(), &set(&[0, 8]));

        s.invert().unwrap();
        assert_eq!(s.mask().len(), 44 - 2);
        assert!(!s.mask().contains(&0));

        s.clear().unwrap();
        assert!(s.mask().is_empty());

        s.undo().unwrap();
        assert_eq!(s.mask().len(), 42);
        s.undo().unwrap();
        assert_eq!(s.mask(), &set(&[0, 8]));
    }

    #[test]
    fn test_save_tracking() {
        let mut s = session();
        assert!(s.is_saved());
        s.paint(&set(&[0])).unwrap();
        assert!(!s.is_saved());
        s.save();
        assert!(s.is_saved());
        s.undo();
        assert!(!s.is_saved());
        s.redo();
        assert!(s.is_saved());
    }

    #[test]
    fn test_preview_commit() {
        let mut s = session();
        let mut preview = s.begin_preview(8, 2).unwrap();
        preview.set_tolerance(0.0).unwrap();
        assert_eq!(preview.mask().len(), 11);

        s.commit_preview(&preview, SelectionMode::Add).unwrap();
        assert_eq!(s.mask().len(), 11);
        assert_eq!(s.controller().history()[0].tool(), Tool::MagicWand);
    }

    #[test]
    fn test_bitmap() {
        let mut s = session();
        s.paint(&set(&[4])).unwrap();
        let bitmap = s.bitmap().unwrap();
        assert_eq!(bitmap.len(), 44);
        assert_eq!(bitmap[1], 255);
        assert_eq!(bitmap.iter().filter(|&&v| v > 0).count(), 1);
    }

    #[test]
    fn test_cancelled_wand_leaves_mask_untouched() {
        let mut s = session();
        let token = CancelToken::new();
        token.cancel();
        s.set_cancel_token(Some(token));
        assert_eq!(
            s.magic_wand(8, 2, SelectionMode::Add, &Mask::new()).unwrap_err(),
            SelectionError::Cancelled
        );
        assert!(s.mask().is_empty());
        assert!(s.controller().history().is_empty());
    }
}
