use std::collections::BTreeSet;

use crate::model::task::TaskNode;

/// Where a task sits in its forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    /// Parent task ID, or None for a top-level task
    pub parent_id: Option<u64>,
    /// Index within the parent's sub-task list (or the top-level list)
    pub sibling_index: usize,
    /// Nesting depth (0 = top-level)
    pub depth: usize,
}

/// Find a task by ID anywhere in the forest.
pub fn find_task(tasks: &[TaskNode], task_id: u64) -> Option<&TaskNode> {
    for task in tasks {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task(&task.sub_tasks, task_id) {
            return Some(t);
        }
    }
    None
}

/// Find a task by ID anywhere in the forest, return mutable ref.
pub fn find_task_mut(tasks: &mut [TaskNode], task_id: u64) -> Option<&mut TaskNode> {
    for task in tasks.iter_mut() {
        if task.id == task_id {
            return Some(task);
        }
        if let Some(t) = find_task_mut(&mut task.sub_tasks, task_id) {
            return Some(t);
        }
    }
    None
}

/// Locate a task: its parent, index among siblings, and depth.
pub fn find_location(tasks: &[TaskNode], task_id: u64) -> Option<TaskLocation> {
    locate_in(tasks, task_id, None, 0)
}

fn locate_in(
    tasks: &[TaskNode],
    task_id: u64,
    parent_id: Option<u64>,
    depth: usize,
) -> Option<TaskLocation> {
    for (i, task) in tasks.iter().enumerate() {
        if task.id == task_id {
            return Some(TaskLocation {
                parent_id,
                sibling_index: i,
                depth,
            });
        }
        if let Some(loc) = locate_in(&task.sub_tasks, task_id, Some(task.id), depth + 1) {
            return Some(loc);
        }
    }
    None
}

/// Whether `task_id` is `root` itself or anywhere beneath it.
pub fn subtree_contains(root: &TaskNode, task_id: u64) -> bool {
    root.id == task_id || find_task(&root.sub_tasks, task_id).is_some()
}

/// Total number of tasks in the forest, at every depth.
pub fn count_nodes(tasks: &[TaskNode]) -> usize {
    tasks.iter().map(TaskNode::subtree_len).sum()
}

/// Every task ID in the forest, depth-first pre-order.
pub fn collect_ids(tasks: &[TaskNode]) -> Vec<u64> {
    let mut ids = Vec::new();
    for_each_task(tasks, &mut |t| ids.push(t.id));
    ids
}

/// Largest task ID in the forest (0 when empty).
pub fn max_id(tasks: &[TaskNode]) -> u64 {
    let mut max = 0;
    for_each_task(tasks, &mut |t| max = max.max(t.id));
    max
}

/// IDs that occur more than once, ascending.
pub fn duplicate_ids(tasks: &[TaskNode]) -> Vec<u64> {
    duplicate_ids_across(tasks)
}

/// IDs that occur more than once across several separate trees.
pub fn duplicate_ids_across<'a>(roots: impl IntoIterator<Item = &'a TaskNode>) -> Vec<u64> {
    let mut seen = BTreeSet::new();
    let mut dups = BTreeSet::new();
    for root in roots {
        for_each_task(std::slice::from_ref(root), &mut |t| {
            if !seen.insert(t.id) {
                dups.insert(t.id);
            }
        });
    }
    dups.into_iter().collect()
}

/// Remove the task with `task_id`, together with its subtree, from whichever
/// sibling list holds it.
pub fn detach(tasks: &mut Vec<TaskNode>, task_id: u64) -> Option<TaskNode> {
    if let Some(idx) = tasks.iter().position(|t| t.id == task_id) {
        return Some(tasks.remove(idx));
    }
    tasks
        .iter_mut()
        .find_map(|t| detach(&mut t.sub_tasks, task_id))
}

/// Depth-first pre-order walk, passing each task with its depth.
pub fn walk<'a>(tasks: &'a [TaskNode], f: &mut dyn FnMut(&'a TaskNode, usize)) {
    walk_at(tasks, 0, f);
}

fn walk_at<'a>(tasks: &'a [TaskNode], depth: usize, f: &mut dyn FnMut(&'a TaskNode, usize)) {
    for task in tasks {
        f(task, depth);
        walk_at(&task.sub_tasks, depth + 1, f);
    }
}

pub fn for_each_task(tasks: &[TaskNode], f: &mut dyn FnMut(&TaskNode)) {
    for task in tasks {
        f(task);
        for_each_task(&task.sub_tasks, f);
    }
}
