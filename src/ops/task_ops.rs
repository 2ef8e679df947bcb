use chrono::{DateTime, Utc};

use crate::model::completed::CompletedTask;
use crate::model::task::{TaskNode, TaskStatus};
use crate::ops::forest::{collect_ids, detach, find_location, find_task, find_task_mut, max_id};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(u64),
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("invalid due date: {0} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),
    #[error("invalid due time: {0} (expected HH:MM)")]
    InvalidDueTime(String),
    #[error("no task IDs left: the project already uses the largest possible ID")]
    IdsExhausted,
    #[error("task {0} is not in the completed list")]
    NotCompleted(u64),
    #[error("cannot restore: task IDs {0:?} are already on the board")]
    IdConflict(Vec<u64>),
}

/// Fields for a new task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub parent_id: Option<u64>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// One past the largest ID on the board or in the completed list.
pub fn next_id(forest: &[TaskNode], completed: &[CompletedTask]) -> Result<u64, TaskError> {
    let done = completed
        .iter()
        .map(|c| max_id(std::slice::from_ref(&c.task)))
        .max()
        .unwrap_or(0);
    max_id(forest)
        .max(done)
        .checked_add(1)
        .ok_or(TaskError::IdsExhausted)
}

/// Add a task at the end of the top-level list, or as the last sub-task of
/// `parent_id`. Returns the assigned ID. Completed tasks keep their IDs
/// reserved.
pub fn add_task(
    forest: &mut Vec<TaskNode>,
    completed: &[CompletedTask],
    new: NewTask,
) -> Result<u64, TaskError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(TaskError::EmptyName);
    }
    if let Some(ref date) = new.due_date {
        validate_due_date(date)?;
    }
    if let Some(ref time) = new.due_time {
        validate_due_time(time)?;
    }

    let id = next_id(forest, completed)?;
    let mut task = TaskNode::new(id, name);
    task.status = new.status;
    task.due_date = new.due_date;
    task.due_time = new.due_time;

    match new.parent_id {
        Some(parent_id) => {
            let parent =
                find_task_mut(forest, parent_id).ok_or(TaskError::NotFound(parent_id))?;
            parent.sub_tasks.push(task);
        }
        None => forest.push(task),
    }
    Ok(id)
}

/// Change a task's name.
pub fn rename_task(forest: &mut [TaskNode], task_id: u64, name: &str) -> Result<(), TaskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskError::EmptyName);
    }
    let task = find_task_mut(forest, task_id).ok_or(TaskError::NotFound(task_id))?;
    task.name = name.to_string();
    Ok(())
}

/// Set (or clear) a task's status.
pub fn set_status(
    forest: &mut [TaskNode],
    task_id: u64,
    status: Option<TaskStatus>,
) -> Result<(), TaskError> {
    let task = find_task_mut(forest, task_id).ok_or(TaskError::NotFound(task_id))?;
    task.status = status;
    Ok(())
}

/// Delete a task together with all of its sub-tasks. Returns the removed
/// subtree.
pub fn delete_task(forest: &mut Vec<TaskNode>, task_id: u64) -> Result<TaskNode, TaskError> {
    detach(forest, task_id).ok_or(TaskError::NotFound(task_id))
}

// ---------------------------------------------------------------------------
// Completed tasks
// ---------------------------------------------------------------------------

/// Take a task and its subtree off the board into the completed list.
/// Returns how many tasks moved.
pub fn complete_task(
    forest: &mut Vec<TaskNode>,
    completed: &mut Vec<CompletedTask>,
    task_id: u64,
    at: DateTime<Utc>,
) -> Result<usize, TaskError> {
    let parent_id = find_location(forest, task_id)
        .ok_or(TaskError::NotFound(task_id))?
        .parent_id;
    let task = detach(forest, task_id).ok_or(TaskError::NotFound(task_id))?;
    let moved = task.subtree_len();
    completed.push(CompletedTask {
        completed_at: at,
        parent_id,
        task,
    });
    Ok(moved)
}

/// Put a completed task back on the board: as the last sub-task of its old
/// parent when that parent is still there, else at the end of the top level.
/// Returns the parent it went back under.
pub fn uncomplete_task(
    forest: &mut Vec<TaskNode>,
    completed: &mut Vec<CompletedTask>,
    task_id: u64,
) -> Result<Option<u64>, TaskError> {
    let idx = completed
        .iter()
        .position(|c| c.task.id == task_id)
        .ok_or(TaskError::NotCompleted(task_id))?;

    let clashes: Vec<u64> = collect_ids(std::slice::from_ref(&completed[idx].task))
        .into_iter()
        .filter(|id| find_task(forest, *id).is_some())
        .collect();
    if !clashes.is_empty() {
        return Err(TaskError::IdConflict(clashes));
    }

    let entry = completed.remove(idx);
    match entry.parent_id.and_then(|p| find_task_mut(forest, p)) {
        Some(parent) => {
            parent.sub_tasks.push(entry.task);
            Ok(Some(parent.id))
        }
        None => {
            forest.push(entry.task);
            Ok(None)
        }
    }
}

/// Completed tasks, most recently completed first. With a query, only
/// entries where some task in the subtree has a matching name (ignoring
/// case).
pub fn search_completed<'a>(
    completed: &'a [CompletedTask],
    query: Option<&str>,
) -> Vec<&'a CompletedTask> {
    let needle = query.map(str::to_lowercase);
    let mut hits: Vec<&CompletedTask> = completed
        .iter()
        .filter(|c| {
            needle
                .as_deref()
                .is_none_or(|n| subtree_name_matches(&c.task, n))
        })
        .collect();
    hits.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    hits
}

fn subtree_name_matches(task: &TaskNode, needle: &str) -> bool {
    task.name.to_lowercase().contains(needle)
        || task.sub_tasks.iter().any(|t| subtree_name_matches(t, needle))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_due_date(date: &str) -> Result<(), TaskError> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| TaskError::InvalidDueDate(date.to_string()))
}

fn validate_due_time(time: &str) -> Result<(), TaskError> {
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| TaskError::InvalidDueTime(time.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::forest::fixtures::*;
    use chrono::TimeZone;

    fn named(name: &str) -> NewTask {
        NewTask {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_task_top_level() {
        let mut forest = abcd();
        let id = add_task(&mut forest, &[], named("E")).unwrap();
        assert_eq!(id, 5);
        assert_eq!(shape(&forest), "A[B, C], D, E");
    }

    #[test]
    fn test_add_task_under_parent() {
        let mut forest = abcd();
        let id = add_task(
            &mut forest,
            &[],
            NewTask {
                name: "E".into(),
                parent_id: Some(2),
                status: Some(TaskStatus::Ready),
                due_date: Some("2020-04-30".into()),
                due_time: Some("18:00".into()),
            },
        )
        .unwrap();
        assert_eq!(shape(&forest), "A[B[E], C], D");
        let task = find_task(&forest, id).unwrap();
        assert_eq!(task.status, Some(TaskStatus::Ready));
        assert_eq!(task.due_time.as_deref(), Some("18:00"));
    }

    #[test]
    fn test_add_task_into_empty_forest() {
        let mut forest = Vec::new();
        assert_eq!(add_task(&mut forest, &[], named("first")).unwrap(), 1);
    }

    #[test]
    fn test_add_task_rejects_bad_input() {
        let mut forest = abcd();
        assert!(matches!(add_task(&mut forest, &[], named("  ")), Err(TaskError::EmptyName)));
        let bad_parent = NewTask {
            parent_id: Some(77),
            ..named("x")
        };
        assert!(matches!(add_task(&mut forest, &[], bad_parent), Err(TaskError::NotFound(77))));
        let bad_date = NewTask {
            due_date: Some("2020-13-01".into()),
            ..named("x")
        };
        assert!(matches!(
            add_task(&mut forest, &[], bad_date),
            Err(TaskError::InvalidDueDate(_))
        ));
        let bad_time = NewTask {
            due_time: Some("25:00".into()),
            ..named("x")
        };
        assert!(matches!(
            add_task(&mut forest, &[], bad_time),
            Err(TaskError::InvalidDueTime(_))
        ));
        assert_eq!(shape(&forest), "A[B, C], D");
    }

    #[test]
    fn test_rename_and_status() {
        let mut forest = abcd();
        rename_task(&mut forest, 3, "C prime").unwrap();
        set_status(&mut forest, 3, Some(TaskStatus::OnHold)).unwrap();
        let c = find_task(&forest, 3).unwrap();
        assert_eq!(c.name, "C prime");
        assert_eq!(c.status, Some(TaskStatus::OnHold));
        set_status(&mut forest, 3, None).unwrap();
        assert_eq!(find_task(&forest, 3).unwrap().status, None);
        assert!(rename_task(&mut forest, 9, "x").is_err());
    }

    #[test]
    fn test_delete_task_removes_subtree() {
        let mut forest = abcd();
        let removed = delete_task(&mut forest, 1).unwrap();
        assert_eq!(removed.subtree_len(), 3);
        assert_eq!(shape(&forest), "D");
        assert!(matches!(delete_task(&mut forest, 1), Err(TaskError::NotFound(1))));
    }

    #[test]
    fn test_next_id_runs_out() {
        let mut forest = vec![TaskNode::new(u64::MAX, "big")];
        assert!(matches!(next_id(&forest, &[]), Err(TaskError::IdsExhausted)));
        assert!(matches!(
            add_task(&mut forest, &[], named("one more")),
            Err(TaskError::IdsExhausted)
        ));
        assert_eq!(forest.len(), 1);
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_completed_ids_stay_reserved() {
        let mut forest = abcd();
        let mut done = Vec::new();
        complete_task(&mut forest, &mut done, 4, at(9)).unwrap();
        assert_eq!(max_id(&forest), 3);
        assert_eq!(add_task(&mut forest, &done, named("E")).unwrap(), 5);
    }

    #[test]
    fn test_complete_and_uncomplete_subtask() {
        let mut forest = abcd();
        let mut done = Vec::new();
        assert_eq!(complete_task(&mut forest, &mut done, 2, at(9)).unwrap(), 1);
        assert_eq!(shape(&forest), "A[C], D");
        assert_eq!(done[0].parent_id, Some(1));
        assert_eq!(done[0].completed_at, at(9));

        assert_eq!(uncomplete_task(&mut forest, &mut done, 2).unwrap(), Some(1));
        assert_eq!(shape(&forest), "A[C, B], D");
        assert!(done.is_empty());
    }

    #[test]
    fn test_complete_takes_whole_subtree() {
        let mut forest = abcd();
        let mut done = Vec::new();
        assert_eq!(complete_task(&mut forest, &mut done, 1, at(9)).unwrap(), 3);
        assert_eq!(shape(&forest), "D");
        assert_eq!(shape(std::slice::from_ref(&done[0].task)), "A[B, C]");
        assert!(matches!(
            complete_task(&mut forest, &mut done, 2, at(10)),
            Err(TaskError::NotFound(2))
        ));
    }

    #[test]
    fn test_uncomplete_without_parent_goes_top_level() {
        let mut forest = abcd();
        let mut done = Vec::new();
        complete_task(&mut forest, &mut done, 3, at(9)).unwrap();
        delete_task(&mut forest, 1).unwrap();
        assert_eq!(uncomplete_task(&mut forest, &mut done, 3).unwrap(), None);
        assert_eq!(shape(&forest), "D, C");
    }

    #[test]
    fn test_uncomplete_rejects_unknown_and_clashing() {
        let mut forest = abcd();
        let mut done = Vec::new();
        assert!(matches!(
            uncomplete_task(&mut forest, &mut done, 4),
            Err(TaskError::NotCompleted(4))
        ));

        complete_task(&mut forest, &mut done, 4, at(9)).unwrap();
        forest.push(leaf(4, "D again"));
        assert!(matches!(
            uncomplete_task(&mut forest, &mut done, 4),
            Err(TaskError::IdConflict(ref ids)) if ids == &vec![4]
        ));
        assert_eq!(done.len(), 1);
        assert_eq!(shape(&forest), "A[B, C], D again");
    }

    #[test]
    fn test_search_completed_newest_first() {
        let mut forest = abcd();
        let mut done = Vec::new();
        complete_task(&mut forest, &mut done, 1, at(8)).unwrap();
        complete_task(&mut forest, &mut done, 4, at(11)).unwrap();

        let ids: Vec<u64> = search_completed(&done, None).iter().map(|c| c.task.id).collect();
        assert_eq!(ids, vec![4, 1]);

        let hits = search_completed(&done, Some("c"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].task.id, 1);
        assert!(search_completed(&done, Some("zzz")).is_empty());
    }
}
