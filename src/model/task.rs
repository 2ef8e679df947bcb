use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Task status, as shown on the "tasks by status" board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    InProgress,
    NextToDo,
    Ready,
    OnHold,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::InProgress,
        TaskStatus::NextToDo,
        TaskStatus::Ready,
        TaskStatus::OnHold,
    ];

    /// Wire name (`IN_PROGRESS`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::NextToDo => "NEXT_TO_DO",
            TaskStatus::Ready => "READY",
            TaskStatus::OnHold => "ON_HOLD",
        }
    }

    /// Single character marker used in tree listings
    pub fn marker(self) -> char {
        match self {
            TaskStatus::InProgress => '>',
            TaskStatus::NextToDo => '!',
            TaskStatus::Ready => ' ',
            TaskStatus::OnHold => '~',
        }
    }

    /// Parse a status from its wire name or a loose CLI spelling
    /// (`in-progress`, `next`, `ready`, `hold`).
    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        let norm = s.trim().to_ascii_uppercase().replace('-', "_");
        match norm.as_str() {
            "IN_PROGRESS" | "ACTIVE" => Some(TaskStatus::InProgress),
            "NEXT_TO_DO" | "NEXT" => Some(TaskStatus::NextToDo),
            "READY" => Some(TaskStatus::Ready),
            "ON_HOLD" | "HOLD" => Some(TaskStatus::OnHold),
            _ => None,
        }
    }
}

/// One task in a project's hierarchy.
///
/// Only `id` and `sub_tasks` carry structure. Everything else is payload that
/// tree operations move around but never rewrite. Attributes this type does
/// not know about are kept in `extra`, in their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    /// Label IDs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<u64>,
    /// Direct sub-tasks, in display order
    #[serde(default)]
    pub sub_tasks: Vec<TaskNode>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// The top-level tasks of a project, in display order
pub type Forest = Vec<TaskNode>;

impl TaskNode {
    /// Create a bare task with no payload beyond its name
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        TaskNode {
            id,
            name: name.into(),
            status: None,
            owner: None,
            assignees: Vec::new(),
            due_date: None,
            due_time: None,
            duration: None,
            recurrence_rule: None,
            labels: Vec::new(),
            sub_tasks: Vec::new(),
            extra: IndexMap::new(),
        }
    }

    /// Builder-style helper for assembling trees in code and tests
    pub fn with_children(mut self, children: Vec<TaskNode>) -> Self {
        self.sub_tasks = children;
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.sub_tasks.iter().map(TaskNode::subtree_len).sum::<usize>()
    }
}
