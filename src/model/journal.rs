use std::path::PathBuf;

use super::config::JournalConfig;

/// A discovered bujo journal (forests are loaded on demand through the store)
#[derive(Debug, Clone)]
pub struct Journal {
    /// Root directory of the journal (parent of `bujo/`)
    pub root: PathBuf,
    /// Path to the `bujo/` directory
    pub bujo_dir: PathBuf,
    /// Parsed journal.toml
    pub config: JournalConfig,
}
