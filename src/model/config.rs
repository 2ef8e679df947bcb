use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Configuration from journal.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    pub journal: JournalInfo,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub id: String,
    pub name: String,
    /// Forest file, relative to `bujo/`
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long an update waits for another writer on the same project
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Pretty-print forest files
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            lock_timeout_ms: default_lock_timeout_ms(),
            pretty: true,
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl JournalConfig {
    /// Look up a project by ID
    pub fn project(&self, project_id: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.id == project_id)
    }
}

impl ProjectConfig {
    /// Completed-task file, next to the forest file:
    /// `projects/home.json` keeps its completed tasks in
    /// `projects/home.completed.json`.
    pub fn completed_file(&self) -> String {
        match self.file.strip_suffix(".json") {
            Some(stem) => format!("{}.completed.json", stem),
            None => format!("{}.completed.json", self.file),
        }
    }

    /// Check the id and the file path. Both end up in paths under `bujo/`,
    /// so neither may point outside it.
    pub fn validate(&self) -> Result<(), String> {
        validate_project_id(&self.id)?;
        validate_project_file(&self.file)
            .map_err(|e| format!("project \"{}\": {}", self.id, e))
    }
}

/// Validate that a project ID is lowercase alphanumeric with hyphens only.
pub fn validate_project_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("project id cannot be empty".to_string());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "invalid project id \"{}\": use lowercase with hyphens (e.g. \"home-chores\")",
            id
        ));
    }
    Ok(())
}

/// A forest file must be a relative path that stays inside `bujo/`.
fn validate_project_file(file: &str) -> Result<(), String> {
    let path = Path::new(file);
    if file.is_empty() || path.file_name().is_none() {
        return Err(format!("invalid file \"{}\"", file));
    }
    let inside = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        return Err(format!(
            "file \"{}\" must be a relative path inside bujo/",
            file
        ));
    }
    Ok(())
}
