use crate::model::task::{TaskNode, TaskStatus};
use crate::ops::forest::walk;

/// A task pulled out of the tree for a flat listing
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTask<'a> {
    pub task: &'a TaskNode,
    /// Nesting depth in the source forest (0 = top-level)
    pub depth: usize,
}

/// Tasks that have a due date, soonest first.
///
/// Ties on date are broken by due time (tasks without a time sort first on
/// their day), then by tree order.
pub fn tasks_by_due(tasks: &[TaskNode]) -> Vec<FlatTask<'_>> {
    let mut out = Vec::new();
    walk(tasks, &mut |task, depth| {
        if task.due_date.is_some() {
            out.push(FlatTask { task, depth });
        }
    });
    // Stable sort keeps tree order for exact ties
    out.sort_by(|a, b| {
        (&a.task.due_date, &a.task.due_time).cmp(&(&b.task.due_date, &b.task.due_time))
    });
    out
}

/// Tasks grouped by status in board order. Tasks with no status come last,
/// under `None`. Empty groups are omitted.
pub fn tasks_by_status(tasks: &[TaskNode]) -> Vec<(Option<TaskStatus>, Vec<FlatTask<'_>>)> {
    let mut groups: Vec<(Option<TaskStatus>, Vec<FlatTask<'_>>)> = TaskStatus::ALL
        .iter()
        .map(|s| (Some(*s), Vec::new()))
        .collect();
    groups.push((None, Vec::new()));

    walk(tasks, &mut |task, depth| {
        if let Some(group) = groups.iter_mut().find(|(s, _)| *s == task.status) {
            group.1.push(FlatTask { task, depth });
        }
    });

    groups.retain(|(_, members)| !members.is_empty());
    groups
}
