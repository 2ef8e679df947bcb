use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::JournalConfig;
use crate::model::journal::Journal;

/// Error type for journal I/O operations
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("not a bujo journal: no bujo/journal.toml found")]
    NotAJournal,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse journal.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit journal.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("invalid journal.toml: {0}")]
    InvalidProject(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the journal by walking up from the given directory, looking for
/// a `bujo/` subdirectory holding `journal.toml`.
pub fn discover_journal(start: &Path) -> Result<PathBuf, JournalError> {
    let mut current = start.to_path_buf();
    loop {
        let bujo_dir = current.join("bujo");
        if bujo_dir.is_dir() && bujo_dir.join("journal.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(JournalError::NotAJournal);
        }
    }
}

/// Load the journal rooted at `root` (the parent of `bujo/`).
pub fn load_journal(root: &Path) -> Result<Journal, JournalError> {
    let bujo_dir = root.join("bujo");
    if !bujo_dir.is_dir() {
        return Err(JournalError::NotAJournal);
    }

    let config_path = bujo_dir.join("journal.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| JournalError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: JournalConfig = toml::from_str(&config_text)?;
    for project in &config.projects {
        project.validate().map_err(JournalError::InvalidProject)?;
    }

    Ok(Journal {
        root: root.to_path_buf(),
        bujo_dir,
        config,
    })
}
