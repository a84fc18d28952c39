use colored::Colorize;

use crate::model::task::{Priority, Status, Task};

/// Render one listing line: id, priority, summary, then tags and project.
fn task_line(task: &Task) -> String {
    let id = match task.id {
        Some(id) => format!("{:>4}", id),
        None => "    ".to_string(),
    };
    let priority = match task.priority {
        Priority::P0 => task.priority.to_string().red().bold().to_string(),
        Priority::P1 => task.priority.to_string().yellow().to_string(),
        Priority::P2 => task.priority.to_string(),
        Priority::P3 => task.priority.to_string().dimmed().to_string(),
    };
    let summary = match task.status {
        Status::Active => task.summary.green().to_string(),
        Status::Paused => task.summary.dimmed().to_string(),
        _ => task.summary.clone(),
    };

    let mut line = format!("{}  {}  {}", id, priority, summary);
    for tag in &task.tags {
        line.push_str(&format!(" {}", format!("+{}", tag).cyan()));
    }
    if let Some(project) = &task.project {
        line.push_str(&format!(" {}", format!("project:{}", project).blue()));
    }
    line
}

/// Print a task listing, one line per task. An empty listing prints nothing.
pub fn display_tasks(tasks: &[&Task]) {
    for task in tasks {
        println!("{}", task_line(task));
    }
}

/// Print the per-project open/resolved breakdown.
pub fn display_projects(rows: &[(String, usize, usize)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
    for (name, open, resolved) in rows {
        println!(
            "{:<width$}  {} open, {} resolved",
            name,
            open,
            resolved,
            width = width
        );
    }
}

/// Print the distinct tags in use.
pub fn display_tags(tags: &[&str]) {
    for tag in tags {
        println!("+{}", tag);
    }
}

/// Print a task's summary header and its notes.
pub fn display_notes(task: &Task) {
    println!("{}", task_line(task));
    if !task.notes.is_empty() {
        for line in task.notes.lines() {
            println!("    {}", line);
        }
    }
}
