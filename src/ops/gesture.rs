//! Translation of raw tree-widget drop events into [`MoveRequest`]s.
//!
//! The tree widget identifies nodes by string keys (the task ID) and reports
//! where a node was dropped as a position path (`"0-2-1"`: index 1 under
//! index 2 under top-level index 0) plus a flat drop position. The offset
//! between the two says which side of the target the node landed on.

use serde::Deserialize;

use crate::model::moves::{DropPosition, MoveRequest};

/// Error type for drop-gesture translation
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    #[error("invalid node key: {0:?}")]
    BadKey(String),
    #[error("invalid node position path: {0:?}")]
    BadPath(String),
}

/// A drop event as the tree widget reports it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropGesture {
    /// Key of the node being dragged
    pub drag_key: String,
    /// Key of the node it was dropped on
    pub drop_key: String,
    /// Position path of the drop node, e.g. `"0-1-2"`
    pub drop_pos: String,
    /// Flat drop position reported by the widget
    pub drop_position: i64,
    /// True when dropped in the gap between nodes rather than on a node
    pub drop_to_gap: bool,
}

impl DropGesture {
    /// Normalize into a move. A drop onto the node body nests the dragged
    /// task inside it. A gap drop lands before the target when the offset
    /// from the target's own index is -1, after it otherwise.
    pub fn to_move(&self) -> Result<MoveRequest, GestureError> {
        let dragged_id = parse_key(&self.drag_key)?;
        let target_id = parse_key(&self.drop_key)?;
        let target_index = last_path_index(&self.drop_pos)?;

        let position = if !self.drop_to_gap {
            DropPosition::Inside
        } else if self.drop_position - target_index == -1 {
            DropPosition::Before
        } else {
            DropPosition::After
        };
        Ok(MoveRequest::new(dragged_id, target_id, position))
    }
}

fn parse_key(key: &str) -> Result<u64, GestureError> {
    key.trim()
        .parse()
        .map_err(|_| GestureError::BadKey(key.to_string()))
}

fn last_path_index(path: &str) -> Result<i64, GestureError> {
    path.rsplit('-')
        .next()
        .and_then(|seg| seg.parse::<i64>().ok())
        .ok_or_else(|| GestureError::BadPath(path.to_string()))
}
