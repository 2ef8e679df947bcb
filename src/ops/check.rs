use serde::Serialize;

use crate::model::task::TaskNode;
use crate::ops::forest::{count_nodes, duplicate_ids, walk};

/// Result of validating one project's forest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub task_count: usize,
    /// IDs that appear more than once
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_ids: Vec<u64>,
    /// IDs of tasks with an unparseable due date
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bad_due_dates: Vec<u64>,
}

impl CheckResult {
    pub fn valid(&self) -> bool {
        self.duplicate_ids.is_empty()
    }
}

/// Validate a forest. Duplicate IDs make it invalid; bad dates are warnings.
pub fn check_forest(tasks: &[TaskNode]) -> CheckResult {
    let mut bad_due_dates = Vec::new();
    walk(tasks, &mut |task, _| {
        if let Some(ref date) = task.due_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                bad_due_dates.push(task.id);
            }
        }
    });

    CheckResult {
        task_count: count_nodes(tasks),
        duplicate_ids: duplicate_ids(tasks),
        bad_due_dates,
    }
}
