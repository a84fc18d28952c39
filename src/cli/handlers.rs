use std::error::Error;
use std::fs;
use std::process::Command;

use chrono::Utc;

use crate::cli::output;
use crate::io::git;
use crate::io::store::TaskSet;
use crate::model::config::Config;
use crate::model::query::Query;
use crate::model::task::{Status, Task};
use crate::ops::filter;

/// Statuses shown by the default listing
const NEXT_STATUSES: &[Status] = &[Status::Pending, Status::Active];
/// Everything still open, paused included
const OPEN_STATUSES: &[Status] = &[Status::Pending, Status::Active, Status::Paused];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a task from the effective query's assignment fields.
fn task_from_query(effective: &Query, status: Status) -> Result<Task, Box<dyn Error>> {
    let summary = effective.summary();
    if summary.is_empty() {
        return Err("a summary is required".into());
    }
    let mut task = Task::new(status, summary);
    task.tags = effective.tags.clone();
    task.project = effective.project.clone();
    if let Some(priority) = effective.priority {
        task.priority = priority;
    }
    task.notes = effective.note.clone();
    Ok(task)
}

/// Insert a new task, save once, commit once.
fn persist_new(
    config: &Config,
    set: &mut TaskSet,
    task: Task,
    verb: &str,
) -> Result<Task, Box<dyn Error>> {
    let task = set.load_task(task);
    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("{} {}", verb, task))?;
    Ok(task)
}

/// Apply a status change to every task named in the query, then save and
/// commit once for the whole batch.
fn set_status_for_ids(
    config: &Config,
    query: &Query,
    status: Status,
    verb: &str,
) -> Result<(), Box<dyn Error>> {
    if query.ids.is_empty() {
        return Err(format!("{} requires at least one task id", query.cmd).into());
    }
    let mut set = TaskSet::load(config)?;
    let mut lines = Vec::new();
    for &id in &query.ids {
        let task = set.get_mut(id)?;
        task.status = status;
        if status == Status::Resolved {
            task.resolved = Some(Utc::now());
        }
        task.write_pending = true;
        lines.push(task.to_string());
    }
    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("{} {}", verb, lines.join(", ")))?;
    Ok(())
}

/// Shared body of the status listings.
fn show_by_status(
    config: &Config,
    context: &Query,
    query: &Query,
    statuses: &[Status],
) -> Result<(), Box<dyn Error>> {
    let effective = query.with_context(context);
    let set = TaskSet::load(config)?;
    let mut tasks = filter::select(set.tasks(), statuses, &effective);
    filter::sort_for_display(&mut tasks);
    output::display_tasks(&tasks);
    Ok(())
}

/// Pull http(s) URLs out of free text.
fn extract_urls(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(['(', ')', ',', '.', ';']))
        .filter(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(|word| word.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

pub fn cmd_next(config: &Config, context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    show_by_status(config, context, query, NEXT_STATUSES)
}

pub fn cmd_show_open(
    config: &Config,
    context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    show_by_status(config, context, query, OPEN_STATUSES)
}

pub fn cmd_show_active(
    config: &Config,
    context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    show_by_status(config, context, query, &[Status::Active])
}

pub fn cmd_show_paused(
    config: &Config,
    context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    show_by_status(config, context, query, &[Status::Paused])
}

pub fn cmd_show_templates(
    config: &Config,
    context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    show_by_status(config, context, query, &[Status::Template])
}

pub fn cmd_show_resolved(
    config: &Config,
    context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    let effective = query.with_context(context);
    let set = TaskSet::load(config)?;
    let mut tasks = filter::select(set.tasks(), &[Status::Resolved], &effective);
    filter::sort_by_resolved(&mut tasks);
    output::display_tasks(&tasks);
    Ok(())
}

pub fn cmd_show_unorganised(
    config: &Config,
    _context: &Query,
    query: &Query,
) -> Result<(), Box<dyn Error>> {
    // The inbox view: pending tasks nobody has classified yet. The saved
    // context is not merged here.
    let set = TaskSet::load(config)?;
    let mut tasks: Vec<&Task> = set
        .tasks()
        .iter()
        .filter(|t| t.status == Status::Pending)
        .filter(|t| t.project.is_none() && t.tags.is_empty())
        .filter(|t| filter::matches(t, query))
        .collect();
    filter::sort_for_display(&mut tasks);
    output::display_tasks(&tasks);
    Ok(())
}

pub fn cmd_show_projects(
    config: &Config,
    _context: &Query,
    _query: &Query,
) -> Result<(), Box<dyn Error>> {
    let set = TaskSet::load(config)?;
    let mut rows: Vec<(String, usize, usize)> = Vec::new();
    for task in set.tasks() {
        let Some(project) = &task.project else {
            continue;
        };
        let pos = match rows.iter().position(|(name, _, _)| name == project) {
            Some(pos) => pos,
            None => {
                rows.push((project.clone(), 0, 0));
                rows.len() - 1
            }
        };
        match task.status {
            Status::Pending | Status::Active | Status::Paused => rows[pos].1 += 1,
            Status::Resolved => rows[pos].2 += 1,
            Status::Template | Status::Deleted => {}
        }
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    output::display_projects(&rows);
    Ok(())
}

pub fn cmd_show_tags(
    config: &Config,
    _context: &Query,
    _query: &Query,
) -> Result<(), Box<dyn Error>> {
    let set = TaskSet::load(config)?;
    let mut tags: Vec<&str> = set
        .tasks()
        .iter()
        .filter(|t| OPEN_STATUSES.contains(&t.status))
        .flat_map(|t| t.tags.iter().map(|tag| tag.as_str()))
        .collect();
    tags.sort_unstable();
    tags.dedup();
    output::display_tags(&tags);
    Ok(())
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

pub fn cmd_add(config: &Config, context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    let effective = query.with_context(context);
    let task = task_from_query(&effective, Status::Pending)?;
    let mut set = TaskSet::load(config)?;
    let task = persist_new(config, &mut set, task, "Added")?;
    println!("{}", task);
    Ok(())
}

pub fn cmd_template(config: &Config, context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    // Without a summary this is the listing form.
    if query.text.is_empty() {
        return cmd_show_templates(config, context, query);
    }
    let effective = query.with_context(context);
    let task = task_from_query(&effective, Status::Template)?;
    let mut set = TaskSet::load(config)?;
    let task = persist_new(config, &mut set, task, "Added template")?;
    println!("{}", task);
    Ok(())
}

/// Record something that already happened: the task is created resolved.
pub fn cmd_log(config: &Config, context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    let effective = query.with_context(context);
    let mut task = task_from_query(&effective, Status::Resolved)?;
    task.resolved = Some(Utc::now());
    let mut set = TaskSet::load(config)?;
    let task = persist_new(config, &mut set, task, "Logged")?;
    println!("{}", task);
    Ok(())
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

pub fn cmd_start(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    set_status_for_ids(config, query, Status::Active, "Started")
}

pub fn cmd_stop(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    set_status_for_ids(config, query, Status::Paused, "Stopped")
}

pub fn cmd_done(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    set_status_for_ids(config, query, Status::Resolved, "Resolved")
}

pub fn cmd_remove(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    set_status_for_ids(config, query, Status::Deleted, "Removed")
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

pub fn cmd_modify(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    if query.ids.is_empty() {
        return Err("modify requires at least one task id".into());
    }
    if query.tags.is_empty()
        && query.anti_tags.is_empty()
        && query.project.is_none()
        && query.priority.is_none()
    {
        return Err("modify requires at least one change (+tag, -tag, project:, P0-P3)".into());
    }
    let mut set = TaskSet::load(config)?;
    let mut lines = Vec::new();
    for &id in &query.ids {
        let task = set.get_mut(id)?;
        for tag in &query.tags {
            if !task.tags.contains(tag) {
                task.tags.push(tag.clone());
            }
        }
        task.tags.retain(|tag| !query.anti_tags.contains(tag));
        if let Some(project) = &query.project {
            task.project = Some(project.clone());
        }
        if let Some(priority) = query.priority {
            task.priority = priority;
        }
        task.write_pending = true;
        lines.push(task.to_string());
    }
    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("Modified {}", lines.join(", ")))?;
    Ok(())
}

pub fn cmd_edit(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    let &[id] = query.ids.as_slice() else {
        return Err("edit requires exactly one task id".into());
    };
    let mut set = TaskSet::load(config)?;

    let text = {
        let task = set.get(id)?;
        toml::to_string_pretty(task)?
    };
    let file = tempfile::Builder::new()
        .prefix("stint-edit-")
        .suffix(".toml")
        .tempfile()?;
    fs::write(file.path(), &text)?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor).arg(file.path()).status()?;
    if !status.success() {
        return Err(format!("{} exited with failure, task unchanged", editor).into());
    }

    let edited: Task = toml::from_str(&fs::read_to_string(file.path())?)?;
    let task = set.get_mut(id)?;
    // identity and creation time are not editable
    task.summary = edited.summary;
    task.tags = edited.tags;
    task.project = edited.project;
    task.priority = edited.priority;
    task.notes = edited.notes;
    task.status = edited.status;
    task.resolved = edited.resolved;
    task.write_pending = true;
    let line = task.to_string();

    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("Edited {}", line))?;
    Ok(())
}

pub fn cmd_note(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    if query.ids.is_empty() {
        return Err("note requires at least one task id".into());
    }
    let mut set = TaskSet::load(config)?;

    // Without text, show the notes instead of appending.
    if query.text.is_empty() {
        for &id in &query.ids {
            output::display_notes(set.get(id)?);
        }
        return Ok(());
    }

    let addition = query.summary();
    let mut lines = Vec::new();
    for &id in &query.ids {
        let task = set.get_mut(id)?;
        if task.notes.is_empty() {
            task.notes = addition.clone();
        } else {
            task.notes = format!("{}\n{}", task.notes, addition);
        }
        task.write_pending = true;
        lines.push(task.to_string());
    }
    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("Noted {}", lines.join(", ")))?;
    Ok(())
}

pub fn cmd_open(config: &Config, _context: &Query, query: &Query) -> Result<(), Box<dyn Error>> {
    if query.ids.is_empty() {
        return Err("open requires at least one task id".into());
    }
    let set = TaskSet::load(config)?;
    let mut opened = 0;
    for &id in &query.ids {
        let task = set.get(id)?;
        let text = format!("{} {}", task.summary, task.notes);
        for url in extract_urls(&text) {
            open::that(&url)?;
            opened += 1;
        }
    }
    if opened == 0 {
        return Err("no URLs found in the given tasks".into());
    }
    Ok(())
}
