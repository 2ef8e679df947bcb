use serde::Serialize;

use crate::model::completed::CompletedTask;
use crate::model::config::ProjectConfig;
use crate::model::task::{TaskNode, TaskStatus};
use crate::ops::query::FlatTask;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectInfoJson {
    pub id: String,
    pub name: String,
    pub tasks: usize,
}

#[derive(Serialize)]
pub struct StatusGroupJson<'a> {
    pub status: Option<TaskStatus>,
    pub tasks: Vec<FlatTaskJson<'a>>,
}

#[derive(Serialize)]
pub struct FlatTaskJson<'a> {
    pub id: u64,
    pub name: &'a str,
    pub depth: usize,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<&'a str>,
    #[serde(rename = "dueTime", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<&'a str>,
}

pub fn flat_task_to_json<'a>(flat: &FlatTask<'a>) -> FlatTaskJson<'a> {
    FlatTaskJson {
        id: flat.task.id,
        name: &flat.task.name,
        depth: flat.depth,
        due_date: flat.task.due_date.as_deref(),
        due_time: flat.task.due_time.as_deref(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_marker(status: Option<TaskStatus>) -> char {
    status.map_or(' ', TaskStatus::marker)
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &TaskNode) -> String {
    let due = match (&task.due_date, &task.due_time) {
        (Some(d), Some(t)) => format!(" (due {} {})", d, t),
        (Some(d), None) => format!(" (due {})", d),
        _ => String::new(),
    };
    format!(
        "[{}] {} {}{}",
        status_marker(task.status),
        task.id,
        task.name,
        due
    )
}

/// Format a task with its sub-tasks, indented
pub fn format_task_tree(task: &TaskNode, indent: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", "  ".repeat(indent), format_task_line(task))];
    for sub in &task.sub_tasks {
        lines.extend(format_task_tree(sub, indent + 1));
    }
    lines
}

/// Format a whole forest
pub fn format_forest(tasks: &[TaskNode]) -> Vec<String> {
    tasks.iter().flat_map(|t| format_task_tree(t, 0)).collect()
}

/// Format a flat listing, indenting nothing but showing depth as dots
pub fn format_flat_line(flat: &FlatTask<'_>) -> String {
    format!("{}{}", ".".repeat(flat.depth), format_task_line(flat.task))
}

/// Format a project listing line
pub fn format_project_line(project: &ProjectConfig, task_count: usize) -> String {
    format!(
        "{:<12} {} ({} task{})",
        project.id,
        project.name,
        task_count,
        if task_count == 1 { "" } else { "s" }
    )
}

/// A completed entry: when it was done, then its task tree
pub fn format_completed(done: &CompletedTask) -> Vec<String> {
    let mut header = done.completed_at.format("%Y-%m-%d %H:%M").to_string();
    if let Some(parent) = done.parent_id {
        header.push_str(&format!(" (from {})", parent));
    }
    let mut lines = vec![header];
    lines.extend(format_task_tree(&done.task, 1));
    lines
}

/// Group heading for the by-status view
pub fn format_status_heading(status: Option<TaskStatus>) -> String {
    match status {
        Some(s) => format!("== {} ==", s.as_str()),
        None => "== NO STATUS ==".to_string(),
    }
}

/// Parse a CLI status argument; `none` clears the status
pub fn parse_status_arg(s: &str) -> Result<Option<TaskStatus>, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    TaskStatus::parse_status(s).map(Some).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: in-progress, next, ready, hold, none)",
            s
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;

    fn sample() -> Vec<TaskNode> {
        let mut a = TaskNode::new(1, "Plan trip");
        a.status = Some(TaskStatus::InProgress);
        let mut b = TaskNode::new(2, "Book flights");
        b.due_date = Some("2020-06-01".into());
        b.due_time = Some("09:00".into());
        let mut c = TaskNode::new(3, "Pack");
        c.status = Some(TaskStatus::OnHold);
        c.due_date = Some("2020-06-10".into());
        a.sub_tasks = vec![b, c];
        vec![a, TaskNode::new(4, "Water plants")]
    }

    #[test]
    fn forest_tree_output() {
        assert_snapshot!(format_forest(&sample()).join("\n"), @r"
        [>] 1 Plan trip
          [ ] 2 Book flights (due 2020-06-01 09:00)
          [~] 3 Pack (due 2020-06-10)
        [ ] 4 Water plants
        ");
    }

    #[test]
    fn completed_entry_output() {
        let done = CompletedTask {
            completed_at: Utc.with_ymd_and_hms(2020, 6, 2, 18, 5, 0).unwrap(),
            parent_id: Some(7),
            task: sample().remove(0),
        };
        assert_snapshot!(format_completed(&done).join("\n"), @r"
        2020-06-02 18:05 (from 7)
          [>] 1 Plan trip
            [ ] 2 Book flights (due 2020-06-01 09:00)
            [~] 3 Pack (due 2020-06-10)
        ");
    }

    #[test]
    fn test_flat_line_shows_depth() {
        let forest = sample();
        let flat = FlatTask {
            task: &forest[0].sub_tasks[1],
            depth: 1,
        };
        assert_eq!(format_flat_line(&flat), ".[~] 3 Pack (due 2020-06-10)");
    }

    #[test]
    fn test_project_line_pluralizes() {
        let p = ProjectConfig {
            id: "chores".into(),
            name: "Chores".into(),
            file: "projects/chores.json".into(),
        };
        assert_eq!(format_project_line(&p, 1), "chores       Chores (1 task)");
        assert_eq!(format_project_line(&p, 3), "chores       Chores (3 tasks)");
    }

    #[test]
    fn test_parse_status_arg() {
        assert_eq!(parse_status_arg("none"), Ok(None));
        assert_eq!(parse_status_arg("ready"), Ok(Some(TaskStatus::Ready)));
        assert!(parse_status_arg("done").is_err());
    }
}
