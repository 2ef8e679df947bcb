mod init;
pub use init::cmd_init;

use std::io::Read;
use std::path::PathBuf;

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::journal_io::{self, JournalError};
use crate::io::recovery::{self, RecoveryEntry};
use crate::io::store::{FileStore, TaskStore, apply_move};
use crate::model::journal::Journal;
use crate::model::moves::MoveRequest;
use crate::model::task::{Forest, TaskNode};
use crate::ops::forest::{count_nodes, find_task};
use crate::ops::gesture::DropGesture;
use crate::ops::task_ops::{self, NewTask};
use crate::ops::{check, query};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let command = cli.command;

    // Init needs no existing journal
    if let Commands::Init(args) = command {
        return cmd_init(args, cli.journal_dir.as_deref());
    }
    let journal = load_journal(cli.journal_dir.as_deref())?;

    match command {
        // Handled above
        Commands::Init(_) => Ok(()),

        // Read commands
        Commands::Projects => cmd_projects(&journal, json),
        Commands::Show(args) => cmd_show(&journal, args, json),
        Commands::Order(args) => cmd_order(&journal, args, json),
        Commands::ByStatus(args) => cmd_by_status(&journal, args, json),
        Commands::Check => cmd_check(&journal, json),
        Commands::Recovery(args) => cmd_recovery(&journal, args, json),
        Commands::Completed(args) => cmd_completed(&journal, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&journal, args, json),
        Commands::Mv(args) => cmd_mv(&journal, args, json),
        Commands::Drop(args) => cmd_drop(&journal, args, json),
        Commands::Status(args) => cmd_status(&journal, args),
        Commands::Rename(args) => cmd_rename(&journal, args),
        Commands::Rm(args) => cmd_rm(&journal, args),
        Commands::Complete(args) => cmd_complete(&journal, args),
        Commands::Uncomplete(args) => cmd_uncomplete(&journal, args),
        Commands::Import(args) => cmd_import(&journal, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_journal(journal_dir: Option<&str>) -> Result<Journal, JournalError> {
    let start = match journal_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let root = journal_io::discover_journal(&start)?;
    journal_io::load_journal(&root)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// A file path, or `-` for stdin
fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("could not read stdin: {}", e))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", path, e))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_projects(journal: &Journal, json: bool) -> CmdResult {
    let store = FileStore::new(journal);
    let mut infos = Vec::new();
    for project in &journal.config.projects {
        let forest = store.load_forest(&project.id)?;
        infos.push((project, count_nodes(&forest)));
    }

    if json {
        let out: Vec<ProjectInfoJson> = infos
            .iter()
            .map(|(p, n)| ProjectInfoJson {
                id: p.id.clone(),
                name: p.name.clone(),
                tasks: *n,
            })
            .collect();
        return print_json(&out);
    }

    for (project, n) in &infos {
        println!("{}", format_project_line(project, *n));
    }
    Ok(())
}

fn cmd_show(journal: &Journal, args: ShowArgs, json: bool) -> CmdResult {
    let forest = FileStore::new(journal).load_forest(&args.project)?;
    let tasks: &[TaskNode] = match args.id {
        Some(id) => std::slice::from_ref(
            find_task(&forest, id).ok_or_else(|| format!("task not found: {}", id))?,
        ),
        None => &forest,
    };

    if json {
        return print_json(tasks);
    }
    for line in format_forest(tasks) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_order(journal: &Journal, args: ProjectArgs, json: bool) -> CmdResult {
    let forest = FileStore::new(journal).load_forest(&args.project)?;
    let ordered = query::tasks_by_due(&forest);

    if json {
        let out: Vec<FlatTaskJson> = ordered.iter().map(flat_task_to_json).collect();
        return print_json(&out);
    }
    for flat in &ordered {
        println!("{}", format_flat_line(flat));
    }
    Ok(())
}

fn cmd_by_status(journal: &Journal, args: ProjectArgs, json: bool) -> CmdResult {
    let forest = FileStore::new(journal).load_forest(&args.project)?;
    let groups = query::tasks_by_status(&forest);

    if json {
        let out: Vec<StatusGroupJson> = groups
            .iter()
            .map(|(status, members)| StatusGroupJson {
                status: *status,
                tasks: members.iter().map(flat_task_to_json).collect(),
            })
            .collect();
        return print_json(&out);
    }

    for (i, (status, members)) in groups.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", format_status_heading(*status));
        for flat in members {
            println!("{}", format_task_line(flat.task));
        }
    }
    Ok(())
}

fn cmd_check(journal: &Journal, json: bool) -> CmdResult {
    let store = FileStore::new(journal);
    let mut results = Vec::new();
    for project in &journal.config.projects {
        let forest = store.load_forest(&project.id)?;
        results.push((project.id.clone(), check::check_forest(&forest)));
    }

    if json {
        let mut out = serde_json::Map::new();
        for (id, r) in &results {
            out.insert(id.clone(), serde_json::to_value(r)?);
        }
        print_json(&out)?;
    } else {
        for (id, r) in &results {
            if r.valid() && r.bad_due_dates.is_empty() {
                println!("{}: ok ({} tasks)", id, r.task_count);
                continue;
            }
            if !r.duplicate_ids.is_empty() {
                println!("{}: duplicate task IDs: {:?}", id, r.duplicate_ids);
            }
            if !r.bad_due_dates.is_empty() {
                println!("{}: warning: bad due dates on tasks {:?}", id, r.bad_due_dates);
            }
        }
    }

    if results.iter().all(|(_, r)| r.valid()) {
        Ok(())
    } else {
        Err("check failed".into())
    }
}

fn cmd_recovery(journal: &Journal, args: RecoveryArgs, json: bool) -> CmdResult {
    let entries = recovery::read_recovery_entries(&journal.bujo_dir, args.limit);

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        println!("{} {} {}", entry.timestamp_str(), entry.kind, entry.subject());
        if let Some(ref err) = entry.error {
            println!("  error: {}", err);
        }
    }
    Ok(())
}

fn cmd_completed(journal: &Journal, args: CompletedArgs, json: bool) -> CmdResult {
    let completed = FileStore::new(journal).load_completed(&args.project)?;
    let hits = task_ops::search_completed(&completed, args.search.as_deref());

    if json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        match args.search {
            Some(q) => println!("no completed tasks match '{}'", q),
            None => println!("no completed tasks"),
        }
        return Ok(());
    }
    for done in hits {
        for line in format_completed(done) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(journal: &Journal, args: AddArgs, json: bool) -> CmdResult {
    let status = match args.status.as_deref() {
        Some(s) => parse_status_arg(s)?,
        None => None,
    };
    let new = NewTask {
        name: args.name,
        parent_id: args.parent,
        status,
        due_date: args.due,
        due_time: args.time,
    };
    let id = FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::add_task(&mut tasks.forest, &tasks.completed, new)?)
    })?;

    if json {
        return print_json(&serde_json::json!({ "id": id }));
    }
    println!("{}", id);
    Ok(())
}

fn cmd_mv(journal: &Journal, args: MvArgs, json: bool) -> CmdResult {
    let mv = MoveRequest::new(args.id, args.target, args.position);
    let forest = apply_move(&FileStore::new(journal), &args.project, &mv)?;

    if json {
        return print_json(&forest);
    }
    println!("moved {} {} {}", args.id, args.position, args.target);
    Ok(())
}

fn cmd_drop(journal: &Journal, args: DropArgs, json: bool) -> CmdResult {
    let text = read_input(&args.gesture)?;
    let gesture: DropGesture = serde_json::from_str(&text)
        .map_err(|e| format!("could not parse drop event: {}", e))?;
    let mv = gesture.to_move()?;
    let forest = apply_move(&FileStore::new(journal), &args.project, &mv)?;

    if json {
        return print_json(&forest);
    }
    println!("moved {} {} {}", mv.dragged_id, mv.position, mv.target_id);
    Ok(())
}

fn cmd_status(journal: &Journal, args: StatusArgs) -> CmdResult {
    let status = parse_status_arg(&args.status)?;
    FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::set_status(&mut tasks.forest, args.id, status)?)
    })?;
    Ok(())
}

fn cmd_rename(journal: &Journal, args: RenameArgs) -> CmdResult {
    FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::rename_task(&mut tasks.forest, args.id, &args.name)?)
    })?;
    Ok(())
}

fn cmd_rm(journal: &Journal, args: TaskArgs) -> CmdResult {
    let removed = FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::delete_task(&mut tasks.forest, args.id)?)
    })?;
    let body = serde_json::to_string_pretty(&removed)?;
    recovery::log_recovery(
        &journal.bujo_dir,
        &RecoveryEntry::deleted(&args.project, args.id, body),
    );
    let n = removed.subtree_len();
    println!("deleted {} ({} task{})", args.id, n, plural(n));
    Ok(())
}

fn cmd_complete(journal: &Journal, args: TaskArgs) -> CmdResult {
    let n = FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::complete_task(
            &mut tasks.forest,
            &mut tasks.completed,
            args.id,
            Utc::now(),
        )?)
    })?;
    println!("completed {} ({} task{})", args.id, n, plural(n));
    Ok(())
}

fn cmd_uncomplete(journal: &Journal, args: TaskArgs) -> CmdResult {
    let parent = FileStore::new(journal).update(&args.project, |tasks| {
        Ok(task_ops::uncomplete_task(
            &mut tasks.forest,
            &mut tasks.completed,
            args.id,
        )?)
    })?;
    match parent {
        Some(p) => println!("restored {} under {}", args.id, p),
        None => println!("restored {}", args.id),
    }
    Ok(())
}

fn cmd_import(journal: &Journal, args: ImportArgs) -> CmdResult {
    let text = read_input(&args.file)?;
    let forest: Forest =
        serde_json::from_str(&text).map_err(|e| format!("could not parse {}: {}", args.file, e))?;
    FileStore::new(journal).save_forest(&args.project, &forest)?;
    println!(
        "imported {} tasks into {}",
        count_nodes(&forest),
        args.project
    );
    Ok(())
}
