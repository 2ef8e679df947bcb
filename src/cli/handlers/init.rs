use std::fs;
use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::{config_io, journal_io};
use crate::model::config::{ProjectConfig, validate_project_id};
use toml_edit::{DocumentMut, Item};

const JOURNAL_TOML_TEMPLATE: &str = r##"[journal]
name = ""

[store]
# How long a save waits (ms) for another save to the same project
lock_timeout_ms = 5000
# Pretty-print project files
pretty = true

# --- Projects ---
# Add projects with [[projects]] entries, or use: bujo init --force --project <id> "name"
#
# [[projects]]
# id = "example"
# name = "Example Project"
# file = "projects/example.json"
"##;

const EMPTY_FOREST: &str = "[]\n";

/// Infer a journal name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse --project pairs from the flat Vec<String> produced by clap.
fn parse_project_pairs(args: &[String]) -> Vec<(&str, &str)> {
    args.chunks(2)
        .filter_map(|chunk| match chunk {
            [id, name] => Some((id.as_str(), name.as_str())),
            _ => None,
        })
        .collect()
}

/// The current journal name in a config document, if it has one
fn existing_name(doc: &DocumentMut) -> Option<String> {
    doc.get("journal")
        .and_then(|j| j.get("name"))
        .and_then(Item::as_str)
        .filter(|n| !n.is_empty())
        .map(String::from)
}

pub fn cmd_init(args: InitArgs, journal_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match journal_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let bujo_dir = root.join("bujo");
    let existing = bujo_dir.join("journal.toml").exists();

    if existing && !args.force {
        return Err("journal already exists in ./bujo/ (use --force to reinitialize)".into());
    }

    if let Some(parent) = root.parent() {
        if let Ok(parent_root) = journal_io::discover_journal(parent) {
            eprintln!("Note: parent journal found at {}/bujo/", parent_root.display());
        }
    }

    let pairs = parse_project_pairs(&args.project);
    let mut seen_ids = std::collections::HashSet::new();
    for (id, _) in &pairs {
        validate_project_id(id)?;
        if !seen_ids.insert(*id) {
            return Err(format!("duplicate project id \"{}\"", id).into());
        }
    }

    let projects: Vec<ProjectConfig> = pairs
        .iter()
        .map(|(id, pname)| ProjectConfig {
            id: id.to_string(),
            name: pname.to_string(),
            file: format!("projects/{}.json", id),
        })
        .collect();

    fs::create_dir_all(bujo_dir.join("projects"))?;

    // --force edits the existing config in place
    let mut doc: DocumentMut = if existing {
        config_io::read_config_doc(&bujo_dir)?
    } else {
        JOURNAL_TOML_TEMPLATE.parse()?
    };

    let name = match args.name.or_else(|| existing_name(&doc)) {
        Some(name) => name,
        None => root
            .file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string()),
    };
    config_io::set_journal_name(&mut doc, &name);

    let added: Vec<&ProjectConfig> = projects
        .iter()
        .filter(|p| config_io::add_project_to_config(&mut doc, p))
        .collect();
    config_io::write_config_doc(&bujo_dir, &doc)?;

    // Existing forests survive --force
    for project in &added {
        let path = bujo_dir.join(&project.file);
        if !path.exists() {
            fs::write(path, EMPTY_FOREST)?;
        }
    }

    println!("Initialized bujo journal: {}", name);
    for project in &added {
        println!("  project: {} ({})", project.name, project.id);
    }
    if added.len() < projects.len() {
        println!("  ({} project(s) already listed, left as is)", projects.len() - added.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::JournalConfig;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("my-bullet-journal"), "My Bullet Journal");
        assert_eq!(infer_name("notes"), "Notes");
    }

    #[test]
    fn test_parse_project_pairs() {
        let args = vec![
            "chores".to_string(),
            "Chores".to_string(),
            "work".to_string(),
            "Day Job".to_string(),
        ];
        assert_eq!(
            parse_project_pairs(&args),
            vec![("chores", "Chores"), ("work", "Day Job")]
        );
    }

    #[test]
    fn test_template_parses_as_config() {
        let mut doc: DocumentMut = JOURNAL_TOML_TEMPLATE.parse().unwrap();
        assert_eq!(existing_name(&doc), None);
        config_io::set_journal_name(&mut doc, "Home");
        let text = doc.to_string();
        assert!(text.contains("# --- Projects ---"));

        let config: JournalConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.journal.name, "Home");
        assert_eq!(config.store.lock_timeout_ms, 5000);
        assert!(config.store.pretty);
    }

    fn init_args(name: Option<&str>, project: &[&str], force: bool) -> InitArgs {
        InitArgs {
            name: name.map(String::from),
            project: project.iter().map(|s| s.to_string()).collect(),
            force,
        }
    }

    #[test]
    fn test_init_then_force_adds_projects() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap();

        cmd_init(init_args(Some("Home"), &["chores", "Chores"], false), Some(dir)).unwrap();
        fs::write(tmp.path().join("bujo/projects/chores.json"), "[{\"id\": 1, \"name\": \"x\"}]").unwrap();

        assert!(cmd_init(init_args(None, &[], false), Some(dir)).is_err());
        cmd_init(
            init_args(None, &["chores", "Again", "work", "Work"], true),
            Some(dir),
        )
        .unwrap();

        let text = fs::read_to_string(tmp.path().join("bujo/journal.toml")).unwrap();
        assert!(text.contains("# --- Projects ---"));
        let config: JournalConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.journal.name, "Home");
        let ids: Vec<&str> = config.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["chores", "work"]);
        assert_eq!(config.projects[0].name, "Chores");

        // Forest written before --force is untouched
        let chores = fs::read_to_string(tmp.path().join("bujo/projects/chores.json")).unwrap();
        assert!(chores.contains("\"x\""));
        assert!(tmp.path().join("bujo/projects/work.json").exists());
    }
}
