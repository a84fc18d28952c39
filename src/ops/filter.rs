use crate::model::query::Query;
use crate::model::task::{Status, Task};

/// True when the task satisfies every constraint the query carries.
/// An empty query matches everything.
pub fn matches(task: &Task, query: &Query) -> bool {
    if !query.ids.is_empty() {
        match task.id {
            Some(id) if query.ids.contains(&id) => {}
            _ => return false,
        }
    }
    for tag in &query.tags {
        if !task.tags.contains(tag) {
            return false;
        }
    }
    for tag in &query.anti_tags {
        if task.tags.contains(tag) {
            return false;
        }
    }
    if let Some(project) = &query.project {
        if task.project.as_deref() != Some(project.as_str()) {
            return false;
        }
    }
    if let Some(priority) = query.priority {
        if task.priority != priority {
            return false;
        }
    }
    if !query.text.is_empty() {
        let summary = task.summary.to_lowercase();
        for word in &query.text {
            if !summary.contains(&word.to_lowercase()) {
                return false;
            }
        }
    }
    true
}

/// Tasks in any of the given statuses that match the query.
pub fn select<'a>(tasks: &'a [Task], statuses: &[Status], query: &Query) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| statuses.contains(&t.status))
        .filter(|t| matches(t, query))
        .collect()
}

/// Display order for open-task listings: most urgent priority first, oldest
/// first within a priority.
pub fn sort_for_display(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created.cmp(&b.created))
    });
}

/// Display order for resolved listings: newest resolution first.
pub fn sort_by_resolved(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| b.resolved.cmp(&a.resolved));
}
