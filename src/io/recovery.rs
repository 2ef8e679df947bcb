use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

const LOG_FILE: &str = ".recovery.log";

/// Written once, when the log is created.
const FILE_HEADER: &str = "\
<!-- bujo recovery log: append-only
     Forests that could not be saved, and subtrees removed with `bujo rm`,
     are kept here as JSON. View with: bujo recovery
     Safe to delete if stale. -->

---
";

/// What a recovery entry preserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryKind {
    /// A whole forest whose save failed
    Unsaved,
    /// A subtree removed by a delete
    Deleted,
}

impl fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryKind::Unsaved => write!(f, "unsaved"),
            RecoveryKind::Deleted => write!(f, "deleted"),
        }
    }
}

impl RecoveryKind {
    fn parse_kind(s: &str) -> Option<Self> {
        match s {
            "unsaved" => Some(RecoveryKind::Unsaved),
            "deleted" => Some(RecoveryKind::Deleted),
            _ => None,
        }
    }
}

/// One block of the recovery log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: RecoveryKind,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// JSON text of the preserved tasks
    pub body: String,
}

impl RecoveryEntry {
    /// A forest that could not be written to `project`'s file
    pub fn unsaved(project: &str, error: impl fmt::Display, forest_json: String) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            kind: RecoveryKind::Unsaved,
            project: project.to_string(),
            task_id: None,
            error: Some(error.to_string()),
            body: forest_json,
        }
    }

    /// A subtree rooted at `task_id` that was deleted from `project`
    pub fn deleted(project: &str, task_id: u64, subtree_json: String) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            kind: RecoveryKind::Deleted,
            project: project.to_string(),
            task_id: Some(task_id),
            error: None,
            body: subtree_json,
        }
    }

    /// `chores` or `chores#7`
    pub fn subject(&self) -> String {
        match self.task_id {
            Some(id) => format!("{}#{}", self.project, id),
            None => self.project.clone(),
        }
    }

    pub fn timestamp_str(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn to_markdown(&self) -> String {
        let mut out = format!("## {} {} {}\n", self.timestamp_str(), self.kind, self.subject());
        if let Some(ref err) = self.error {
            out.push_str(&format!("error: {}\n", err));
        }
        out.push_str("\n```json\n");
        out.push_str(self.body.trim_end());
        out.push_str("\n```\n\n---\n");
        out
    }
}

pub fn recovery_log_path(bujo_dir: &Path) -> PathBuf {
    bujo_dir.join(LOG_FILE)
}

/// Replace `path` with `content` through a temp file in the same directory,
/// so readers see either the old file or the new one.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Append an entry. A failure here is reported on stderr and otherwise
/// ignored: the caller is usually already handling a worse error.
pub fn log_recovery(bujo_dir: &Path, entry: &RecoveryEntry) {
    if let Err(e) = append_entry(bujo_dir, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(bujo_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(bujo_dir);
    let fresh = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut block = String::new();
    if fresh {
        block.push_str(FILE_HEADER);
    }
    block.push_str(&entry.to_markdown());
    file.write_all(block.as_bytes())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Entries in the log, newest first, keeping at most `limit`.
pub fn read_recovery_entries(bujo_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let Ok(content) = std::fs::read_to_string(recovery_log_path(bujo_dir)) else {
        return Vec::new();
    };

    let mut entries = parse_entries(&content);
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(mut entry) = line.strip_prefix("## ").and_then(parse_header) else {
            continue;
        };

        let mut body: Vec<&str> = Vec::new();
        let mut in_body = false;
        for line in lines.by_ref() {
            match (in_body, line) {
                (false, "---") => break,
                (false, "```json") => in_body = true,
                (true, "```") => in_body = false,
                (true, _) => body.push(line),
                (false, _) => {
                    if let Some(err) = line.strip_prefix("error: ") {
                        entry.error = Some(err.to_string());
                    }
                }
            }
        }
        entry.body = body.join("\n");
        entries.push(entry);
    }

    entries
}

/// `<timestamp> <kind> <project>[#<task id>]`, with an empty body
fn parse_header(header: &str) -> Option<RecoveryEntry> {
    let mut parts = header.split_whitespace();
    let timestamp = DateTime::parse_from_rfc3339(parts.next()?)
        .ok()?
        .with_timezone(&Utc);
    let kind = RecoveryKind::parse_kind(parts.next()?)?;
    let subject = parts.next()?;
    let (project, task_id) = match subject.split_once('#') {
        Some((project, id)) => (project, Some(id.parse().ok()?)),
        None => (subject, None),
    };
    Some(RecoveryEntry {
        timestamp,
        kind,
        project: project.to_string(),
        task_id,
        error: None,
        body: String::new(),
    })
}
