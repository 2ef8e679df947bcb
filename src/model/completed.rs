use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::task::TaskNode;

/// A task taken off the board when it was completed, with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub completed_at: DateTime<Utc>,
    /// Parent the task had when it was completed; None for a top-level task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    pub task: TaskNode,
}
