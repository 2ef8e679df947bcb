use std::fmt;

use crate::model::moves::{DropPosition, MoveRequest};
use crate::model::task::{Forest, TaskNode};
use crate::ops::forest::{detach, find_task, subtree_contains};

/// Which side of a move referred to a missing task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRole {
    Dragged,
    Target,
}

impl fmt::Display for MoveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRole::Dragged => write!(f, "dragged"),
            MoveRole::Target => write!(f, "target"),
        }
    }
}

/// Error type for reorder operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("{role} task not found: {id}")]
    NotFound { role: MoveRole, id: u64 },
    #[error("cannot drop task {dragged} {position} task {target}: target is inside the dragged subtree")]
    InvalidMove {
        dragged: u64,
        target: u64,
        position: DropPosition,
    },
}

/// Apply one drag-and-drop move to a forest, returning the new forest.
///
/// The dragged task travels with its whole subtree. Every other task keeps
/// its payload and its order relative to its siblings. The input is never
/// modified, and on error nothing is returned but the error.
///
/// Dropping a task onto itself is rejected like any other drop into its own
/// subtree, whatever the position.
pub fn reorder(forest: &[TaskNode], mv: &MoveRequest) -> Result<Forest, ReorderError> {
    let dragged = find_task(forest, mv.dragged_id).ok_or(ReorderError::NotFound {
        role: MoveRole::Dragged,
        id: mv.dragged_id,
    })?;
    if find_task(forest, mv.target_id).is_none() {
        return Err(ReorderError::NotFound {
            role: MoveRole::Target,
            id: mv.target_id,
        });
    }
    if subtree_contains(dragged, mv.target_id) {
        return Err(ReorderError::InvalidMove {
            dragged: mv.dragged_id,
            target: mv.target_id,
            position: mv.position,
        });
    }

    let mut pruned = forest.to_vec();
    let mut slot = detach(&mut pruned, mv.dragged_id);
    if slot.is_none() {
        return Err(ReorderError::NotFound {
            role: MoveRole::Dragged,
            id: mv.dragged_id,
        });
    }
    if !splice(&mut pruned, mv.target_id, mv.position, &mut slot) {
        return Err(ReorderError::NotFound {
            role: MoveRole::Target,
            id: mv.target_id,
        });
    }
    Ok(pruned)
}

/// Insert the subtree held in `slot` relative to `target_id`. Returns false
/// if the target is not in this part of the forest (`slot` is left intact).
fn splice(
    tasks: &mut Vec<TaskNode>,
    target_id: u64,
    position: DropPosition,
    slot: &mut Option<TaskNode>,
) -> bool {
    if let Some(idx) = tasks.iter().position(|t| t.id == target_id) {
        let Some(subtree) = slot.take() else {
            return false;
        };
        match position {
            DropPosition::Before => tasks.insert(idx, subtree),
            DropPosition::After => tasks.insert(idx + 1, subtree),
            DropPosition::Inside => tasks[idx].sub_tasks.push(subtree),
        }
        return true;
    }
    tasks
        .iter_mut()
        .any(|t| splice(&mut t.sub_tasks, target_id, position, slot))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
