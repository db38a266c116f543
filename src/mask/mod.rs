//! Mask editing: set algebra, reversible actions and the history controller.
//!
//! A mask is the set of selected pixels, each identified by the offset of
//! its red channel in the RGBA buffer. Region growing produces short-lived
//! delta sets; only [`MaskController`] owns and mutates the live mask.

use std::collections::HashSet;

pub mod action;
pub mod controller;
pub mod set_ops;

pub use action::{ActionType, Direction, MaskAction, Tool};
pub use controller::MaskController;

/// Offset of a pixel's red channel in a packed RGBA buffer; always a multiple of 4.
pub type PixelIndex = usize;

/// Set of selected pixels.
pub type Mask = HashSet<PixelIndex>;
