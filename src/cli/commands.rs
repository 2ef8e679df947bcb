use clap::{Args, Parser, Subcommand};

use crate::model::moves::DropPosition;

#[derive(Parser)]
#[command(name = "bujo", about = concat!("bujo v", env!("CARGO_PKG_VERSION"), " - task trees you can rearrange"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different journal directory
    #[arg(short = 'C', long = "journal-dir", global = true)]
    pub journal_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new journal in the current directory
    Init(InitArgs),
    /// List projects
    Projects,
    /// Show a project's task tree
    Show(ShowArgs),
    /// Add a task (top-level, or under --parent)
    Add(AddArgs),
    /// Move a task before, after, or inside another task
    Mv(MvArgs),
    /// Apply a drop event from the tree widget (JSON file, or - for stdin)
    Drop(DropArgs),
    /// Set or clear a task's status
    Status(StatusArgs),
    /// Rename a task
    Rename(RenameArgs),
    /// Delete a task and all of its sub-tasks
    Rm(TaskArgs),
    /// Mark a task done, moving it and its sub-tasks to the completed list
    Complete(TaskArgs),
    /// Put a completed task back on the board
    Uncomplete(TaskArgs),
    /// List completed tasks, most recent first
    Completed(CompletedArgs),
    /// List tasks with a due date, soonest first
    Order(ProjectArgs),
    /// List tasks grouped by status
    ByStatus(ProjectArgs),
    /// Validate every project's task tree
    Check,
    /// Replace a project's tasks with the contents of a JSON file
    Import(ImportArgs),
    /// Show the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Journal name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Create a project: --project <id> "name" (repeatable)
    #[arg(long, num_args = 2, value_names = ["ID", "NAME"], action = clap::ArgAction::Append)]
    pub project: Vec<String>,
    /// Update an existing journal: rename it and add any new projects
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Project ID
    pub project: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Project ID
    pub project: String,
    /// Show only this task's subtree
    pub id: Option<u64>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Project ID
    pub project: String,
    /// Task name
    pub name: String,
    /// Add as the last sub-task of this task
    #[arg(long)]
    pub parent: Option<u64>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Due time (HH:MM)
    #[arg(long)]
    pub time: Option<String>,
    /// Initial status (in-progress, next, ready, hold)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Project ID
    pub project: String,
    /// Task to move
    pub id: u64,
    /// Where to drop it: before, after, inside
    pub position: DropPosition,
    /// Task to drop it on
    pub target: u64,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Project ID
    pub project: String,
    /// Task ID
    pub id: u64,
    /// New status (in-progress, next, ready, hold, none)
    pub status: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Project ID
    pub project: String,
    /// Task ID
    pub id: u64,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct DropArgs {
    /// Project ID
    pub project: String,
    /// JSON drop event, or - to read it from stdin
    pub gesture: String,
}

#[derive(Args)]
pub struct TaskArgs {
    /// Project ID
    pub project: String,
    /// Task ID
    pub id: u64,
}

#[derive(Args)]
pub struct CompletedArgs {
    /// Project ID
    pub project: String,
    /// Only entries with a task whose name contains TEXT
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Project ID
    pub project: String,
    /// JSON file holding an array of tasks, or - for stdin
    pub file: String,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show only the N most recent entries
    #[arg(long)]
    pub limit: Option<usize>,
}
