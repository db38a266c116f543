//! Reversible mask edit records.
//!
//! A [`MaskAction`] describes one edit to the selection and knows how to
//! apply itself in either direction. The controller stores them in its
//! history log.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::set_ops;
use super::Mask;
use crate::error::SelectionError;

/// Kind of set operation an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Add,
    Subtract,
    Invert,
    Clear,
}

/// Tool that produced an action. Provenance only, never changes the algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "magic wand")]
    MagicWand,
    #[serde(rename = "scribble magic wand")]
    Scribble,
    #[serde(rename = "paintbrush")]
    Paintbrush,
    #[serde(rename = "erase")]
    Eraser,
    #[serde(rename = "invert")]
    Invert,
    #[serde(rename = "clear")]
    Clear,
}

/// Direction to move through the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Add => "add",
            ActionType::Subtract => "subtract",
            ActionType::Invert => "invert",
            ActionType::Clear => "clear",
        }
    }
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::MagicWand => "magic wand",
            Tool::Scribble => "scribble magic wand",
            Tool::Paintbrush => "paintbrush",
            Tool::Eraser => "erase",
            Tool::Invert => "invert",
            Tool::Clear => "clear",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ActionType::Add),
            "subtract" => Ok(ActionType::Subtract),
            "invert" => Ok(ActionType::Invert),
            "clear" => Ok(ActionType::Clear),
            other => Err(SelectionError::InvalidConfig(format!("unknown action '{other}'"))),
        }
    }
}

impl FromStr for Tool {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magic wand" => Ok(Tool::MagicWand),
            "scribble magic wand" => Ok(Tool::Scribble),
            "paintbrush" => Ok(Tool::Paintbrush),
            "erase" => Ok(Tool::Eraser),
            "invert" => Ok(Tool::Invert),
            "clear" => Ok(Tool::Clear),
            other => Err(SelectionError::InvalidConfig(format!("unknown tool '{other}'"))),
        }
    }
}

/// One reversible edit of the mask.
///
/// | action   | forward                   | backward                  |
/// |----------|---------------------------|---------------------------|
/// | Add      | mask ∪ changed            | mask \ changed            |
/// | Subtract | mask \ changed            | mask ∪ changed            |
/// | Invert   | mask △ changed (universe) | mask △ changed            |
/// | Clear    | ∅                         | changed (pre-clear mask)  |
///
/// Add/Subtract payloads must be normalized against the mask they are
/// applied to for the two directions to be exact inverses;
/// [`MaskController::do_action`](super::MaskController::do_action) does that.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskAction {
    action_type: ActionType,
    tool: Tool,
    changed_pixels: Mask,
}

impl MaskAction {
    pub fn new(action_type: ActionType, tool: Tool, changed_pixels: Mask) -> Self {
        Self {
            action_type,
            tool,
            changed_pixels,
        }
    }

    /// Invert action over the full pixel universe.
    pub fn invert(universe: Mask) -> Self {
        Self::new(ActionType::Invert, Tool::Invert, universe)
    }

    /// Clear action capturing the mask it will clear.
    pub fn clear(current_mask: &Mask) -> Self {
        Self::new(ActionType::Clear, Tool::Clear, current_mask.clone())
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn changed_pixels(&self) -> &Mask {
        &self.changed_pixels
    }

    /// Does or undoes the action against `current_mask`.
    pub fn apply(&self, direction: Direction, current_mask: &Mask) -> Mask {
        match (self.action_type, direction) {
            (ActionType::Add, Direction::Forward) | (ActionType::Subtract, Direction::Backward) => {
                set_ops::union(current_mask, &self.changed_pixels)
            }
            (ActionType::Add, Direction::Backward) | (ActionType::Subtract, Direction::Forward) => {
                set_ops::difference(current_mask, &self.changed_pixels)
            }
            (ActionType::Invert, _) => set_ops::symmetric_difference(current_mask, &self.changed_pixels),
            (ActionType::Clear, Direction::Forward) => Mask::new(),
            (ActionType::Clear, Direction::Backward) => self.changed_pixels.clone(),
        }
    }
}
