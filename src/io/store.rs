use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::lock::{LockError, ProjectLock};
use crate::io::recovery::{self, RecoveryEntry};
use crate::model::completed::CompletedTask;
use crate::model::config::ProjectConfig;
use crate::model::journal::Journal;
use crate::model::moves::MoveRequest;
use crate::model::task::{Forest, TaskNode};
use crate::ops::forest::duplicate_ids_across;
use crate::ops::reorder::{ReorderError, reorder};
use crate::ops::task_ops::TaskError;

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("refusing to save project with duplicate task IDs: {0:?}")]
    Invalid(Vec<u64>),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Everything stored for one project: the board and the completed list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectTasks {
    pub forest: Forest,
    pub completed: Vec<CompletedTask>,
}

impl ProjectTasks {
    /// IDs used more than once, counting the board and the completed list
    /// together.
    pub fn duplicate_ids(&self) -> Vec<u64> {
        duplicate_ids_across(
            self.forest
                .iter()
                .chain(self.completed.iter().map(|c| &c.task)),
        )
    }
}

/// Where projects live.
pub trait TaskStore {
    fn load_forest(&self, project_id: &str) -> Result<Forest, StoreError>;

    fn load_completed(&self, project_id: &str) -> Result<Vec<CompletedTask>, StoreError>;

    /// Load a project, run `edit` on it, and save the result, as one step:
    /// no other update to the same project starts after this one has loaded
    /// and before it has saved. Nothing is saved when `edit` fails.
    fn update<T, F>(&self, project_id: &str, edit: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ProjectTasks) -> Result<T, StoreError>;

    /// Replace a project's whole forest.
    fn save_forest(&self, project_id: &str, forest: &[TaskNode]) -> Result<(), StoreError> {
        self.update(project_id, |tasks| {
            tasks.forest = forest.to_vec();
            Ok(())
        })
    }
}

/// Apply one move to a project and save it. Returns the saved forest.
///
/// Nothing is saved when the move is rejected.
pub fn apply_move(
    store: &impl TaskStore,
    project_id: &str,
    mv: &MoveRequest,
) -> Result<Forest, StoreError> {
    store.update(project_id, |tasks| {
        tasks.forest = reorder(&tasks.forest, mv)?;
        Ok(tasks.forest.clone())
    })
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each project as JSON files under `bujo/`: the forest in the
/// project's `file`, completed tasks beside it.
pub struct FileStore<'a> {
    journal: &'a Journal,
}

impl<'a> FileStore<'a> {
    pub fn new(journal: &'a Journal) -> Self {
        FileStore { journal }
    }

    fn project(&self, project_id: &str) -> Result<&'a ProjectConfig, StoreError> {
        self.journal
            .config
            .project(project_id)
            .ok_or_else(|| StoreError::UnknownProject(project_id.to_string()))
    }

    fn forest_path(&self, project: &ProjectConfig) -> PathBuf {
        self.journal.bujo_dir.join(&project.file)
    }

    fn completed_path(&self, project: &ProjectConfig) -> PathBuf {
        self.journal.bujo_dir.join(project.completed_file())
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, StoreError> {
        let mut text = if self.journal.config.store.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        text.push('\n');
        Ok(text)
    }

    /// Write one file atomically. On failure the content goes to the
    /// recovery log before the error is returned.
    fn write_file(&self, project_id: &str, path: &Path, content: String) -> Result<(), StoreError> {
        let written = match path.parent() {
            Some(dir) => fs::create_dir_all(dir),
            None => Ok(()),
        }
        .and_then(|_| recovery::atomic_write(path, content.as_bytes()));

        if let Err(e) = written {
            recovery::log_recovery(
                &self.journal.bujo_dir,
                &RecoveryEntry::unsaved(project_id, &e, content),
            );
            return Err(StoreError::WriteError {
                path: path.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }
}

/// A file that does not exist yet reads as empty.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

impl TaskStore for FileStore<'_> {
    fn load_forest(&self, project_id: &str) -> Result<Forest, StoreError> {
        let project = self.project(project_id)?;
        read_json_or_default(&self.forest_path(project))
    }

    fn load_completed(&self, project_id: &str) -> Result<Vec<CompletedTask>, StoreError> {
        let project = self.project(project_id)?;
        read_json_or_default(&self.completed_path(project))
    }

    fn update<T, F>(&self, project_id: &str, edit: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ProjectTasks) -> Result<T, StoreError>,
    {
        let project = self.project(project_id)?;
        let timeout = Duration::from_millis(self.journal.config.store.lock_timeout_ms);
        let _lock = ProjectLock::acquire(&self.journal.bujo_dir, project_id, timeout)?;

        let before = ProjectTasks {
            forest: self.load_forest(project_id)?,
            completed: self.load_completed(project_id)?,
        };
        let mut tasks = before.clone();
        let out = edit(&mut tasks)?;

        let dups = tasks.duplicate_ids();
        if !dups.is_empty() {
            return Err(StoreError::Invalid(dups));
        }

        let forest_changed = tasks.forest != before.forest;
        let completed_changed = tasks.completed != before.completed;
        // Whichever file gains tasks is written first: an interrupted update
        // may leave a task in both files, never in neither.
        let completed_first = tasks.completed.len() > before.completed.len();

        if completed_changed && completed_first {
            let content = self.to_json(&tasks.completed)?;
            self.write_file(project_id, &self.completed_path(project), content)?;
        }
        if forest_changed {
            let content = self.to_json(&tasks.forest)?;
            self.write_file(project_id, &self.forest_path(project), content)?;
        }
        if completed_changed && !completed_first {
            let content = self.to_json(&tasks.completed)?;
            self.write_file(project_id, &self.completed_path(project), content)?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
