use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::{ArrayOfTables, DocumentMut, Item, Table, value};

use crate::io::journal_io::JournalError;
use crate::io::recovery::atomic_write;
use crate::model::config::ProjectConfig;

fn config_path(bujo_dir: &Path) -> PathBuf {
    bujo_dir.join("journal.toml")
}

/// journal.toml as an editable document. Comments and layout are kept.
pub fn read_config_doc(bujo_dir: &Path) -> Result<DocumentMut, JournalError> {
    let path = config_path(bujo_dir);
    let text = fs::read_to_string(&path).map_err(|source| JournalError::ReadError { path, source })?;
    Ok(text.parse()?)
}

pub fn write_config_doc(bujo_dir: &Path, doc: &DocumentMut) -> Result<(), JournalError> {
    atomic_write(&config_path(bujo_dir), doc.to_string().as_bytes())?;
    Ok(())
}

pub fn set_journal_name(doc: &mut DocumentMut, name: &str) {
    if !doc.contains_key("journal") {
        doc["journal"] = Item::Table(Table::new());
    }
    doc["journal"]["name"] = value(name);
}

/// IDs of the `[[projects]]` entries already in the document
pub fn project_ids(doc: &DocumentMut) -> Vec<String> {
    doc.get("projects")
        .and_then(Item::as_array_of_tables)
        .map(|projects| {
            projects
                .iter()
                .filter_map(|t| t.get("id").and_then(Item::as_str).map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Append a `[[projects]]` entry. Returns false, leaving the document alone,
/// when a project with the same id is already listed.
pub fn add_project_to_config(doc: &mut DocumentMut, project: &ProjectConfig) -> bool {
    if project_ids(doc).contains(&project.id) {
        return false;
    }
    if !doc.contains_key("projects") {
        doc["projects"] = Item::ArrayOfTables(ArrayOfTables::new());
    }
    let Some(projects) = doc["projects"].as_array_of_tables_mut() else {
        return false;
    };

    let mut table = Table::new();
    table["id"] = value(&project.id);
    table["name"] = value(&project.name);
    table["file"] = value(&project.file);
    projects.push(table);
    true
}
