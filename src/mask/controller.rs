//! Edit history for a mask with undo, redo and save tracking.

use super::action::{ActionType, Direction, MaskAction};
use super::set_ops;
use super::Mask;
use crate::error::{Result, SelectionError};

/// Owns the current mask and the ordered log of applied actions.
///
/// `present` counts the actions currently applied, so `history[..present]`
/// is the applied prefix and `history[present..]` the redo tail. A new
/// commit truncates the redo tail.
#[derive(Debug, Clone)]
pub struct MaskController {
    mask: Mask,
    history: Vec<MaskAction>,
    present: usize,
    saved: usize,
    saved_mask: Mask,
}

impl Default for MaskController {
    fn default() -> Self {
        Self::new(Mask::new())
    }
}

impl MaskController {
    /// Start a history from `initial`, which counts as saved.
    pub fn new(initial: Mask) -> Self {
        Self {
            saved_mask: initial.clone(),
            mask: initial,
            history: Vec::new(),
            present: 0,
            saved: 0,
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn history(&self) -> &[MaskAction] {
        &self.history
    }

    /// Index of the most recently applied action, `None` when nothing is applied.
    pub fn cursor(&self) -> Option<usize> {
        self.present.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.present > 0
    }

    pub fn can_redo(&self) -> bool {
        self.present < self.history.len()
    }

    /// Normalize `action` against the current mask, append it and apply it.
    ///
    /// `universe` is every pixel index of the raster; it is required for
    /// subtract actions and ignored otherwise.
    pub fn do_action(&mut self, action: MaskAction, universe: Option<&Mask>) -> Result<&MaskAction> {
        let action = self.normalize(action, universe)?;

        if self.present < self.history.len() {
            log::debug!("discarding {} redo entries", self.history.len() - self.present);
            self.history.truncate(self.present);
        }
        log::debug!(
            "commit {} ({}) with {} changed pixels",
            action.action_type(),
            action.tool(),
            action.changed_pixels().len()
        );

        self.history.push(action);
        let index = self.present;
        self.mask = self.history[index].apply(Direction::Forward, &self.mask);
        self.present += 1;
        Ok(&self.history[index])
    }

    /// Undo the most recent action. `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<&MaskAction> {
        self.step(Direction::Backward)
    }

    /// Reapply the next undone action. `None` if there is nothing to redo.
    pub fn redo(&mut self) -> Option<&MaskAction> {
        self.step(Direction::Forward)
    }

    /// Mark the current position as saved.
    /// Should be called after the mask has been persisted.
    pub fn save(&mut self) {
        self.saved = self.present;
        self.saved_mask = self.mask.clone();
        log::debug!("saved at position {}", self.saved);
    }

    pub fn is_saved(&self) -> bool {
        self.saved == self.present && set_ops::equal(&self.saved_mask, &self.mask)
    }

    fn normalize(&self, action: MaskAction, universe: Option<&Mask>) -> Result<MaskAction> {
        let normalized = match action.action_type() {
            // Only record pixels that were not selected yet
            ActionType::Add => MaskAction::new(
                ActionType::Add,
                action.tool(),
                set_ops::difference(action.changed_pixels(), &self.mask),
            ),
            // Only record selected pixels inside the raster
            ActionType::Subtract => {
                let universe = universe.ok_or(SelectionError::MissingUniverse)?;
                let in_raster = set_ops::intersection(action.changed_pixels(), universe);
                MaskAction::new(
                    ActionType::Subtract,
                    action.tool(),
                    set_ops::intersection(&in_raster, &self.mask),
                )
            }
            ActionType::Clear => MaskAction::new(ActionType::Clear, action.tool(), self.mask.clone()),
            ActionType::Invert => action,
        };
        Ok(normalized)
    }

    fn step(&mut self, direction: Direction) -> Option<&MaskAction> {
        let index = match direction {
            Direction::Forward if self.present < self.history.len() => self.present,
            Direction::Backward if self.present > 0 => self.present - 1,
            _ => {
                log::trace!("no history to move {:?}", direction);
                return None;
            }
        };

        let action = &self.history[index];
        self.mask = action.apply(direction, &self.mask);
        self.present = match direction {
            Direction::Forward => index + 1,
            Direction::Backward => index,
        };
        Some(action)
    }
}
