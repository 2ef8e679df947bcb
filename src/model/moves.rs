use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a dragged task lands relative to the task it was dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DropPosition {
    /// Sibling, immediately before the target
    Before,
    /// Sibling, immediately after the target
    After,
    /// Last child of the target
    Inside,
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropPosition::Before => write!(f, "before"),
            DropPosition::After => write!(f, "after"),
            DropPosition::Inside => write!(f, "inside"),
        }
    }
}

impl FromStr for DropPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(DropPosition::Before),
            "after" => Ok(DropPosition::After),
            "inside" | "into" => Ok(DropPosition::Inside),
            _ => Err(format!(
                "invalid drop position: {} (expected before, after, inside)",
                s
            )),
        }
    }
}

/// One normalized drag-and-drop move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub dragged_id: u64,
    pub target_id: u64,
    pub position: DropPosition,
}

impl MoveRequest {
    pub fn new(dragged_id: u64, target_id: u64, position: DropPosition) -> Self {
        MoveRequest {
            dragged_id,
            target_id,
            position,
        }
    }
}
