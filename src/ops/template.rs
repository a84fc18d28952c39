use crate::io::store::TaskSet;
use crate::model::task::{Status, Task};

/// Error type for template resolution
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("no template task with summary \"{summary}\"")]
    NotFound { summary: String },
}

/// Find the template task whose summary exactly matches the request.
///
/// Matching is case-sensitive with no fuzzy fallback. The scan runs in the
/// store's canonical order, so when several templates share a summary the
/// one with the lowest short ID wins.
pub fn find_template<'a>(set: &'a TaskSet, summary: &str) -> Result<&'a Task, TemplateError> {
    set.tasks()
        .iter()
        .filter(|t| t.status == Status::Template)
        .find(|t| t.summary == summary)
        .ok_or_else(|| TemplateError::NotFound {
            summary: summary.to_string(),
        })
}

/// Build a new pending task by copying classification fields from a
/// template. Exactly tags, project, priority, and notes are inherited;
/// summary, status, and the resolved timestamp are always fresh.
pub fn build_from_template(summary: &str, template: &Task) -> Task {
    let mut task = Task::new(Status::Pending, summary.to_string());
    task.tags = template.tags.clone();
    task.project = template.project.clone();
    task.priority = template.priority;
    task.notes = template.notes.clone();
    task
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use pretty_assertions::assert_eq;

    fn template(summary: &str) -> Task {
        let mut task = Task::new(Status::Template, summary.to_string());
        task.tags = vec!["hr".to_string()];
        task.project = Some("Hiring".to_string());
        task.priority = Priority::P1;
        task.notes = "ask about notice period".to_string();
        task
    }

    #[test]
    fn test_find_template_exact_match() {
        let set = TaskSet::from_tasks(vec![
            template("Interview"),
            template("Lift"),
            Task::new(Status::Pending, "Interview".to_string()),
        ]);
        let found = find_template(&set, "Interview").unwrap();
        assert_eq!(found.summary, "Interview");
        assert_eq!(found.status, Status::Template);
    }

    #[test]
    fn test_find_template_case_sensitive() {
        let set = TaskSet::from_tasks(vec![template("Interview")]);
        assert!(find_template(&set, "interview").is_err());
        assert!(find_template(&set, "Interview ").is_err());
    }

    #[test]
    fn test_find_template_not_found_names_summary() {
        let set = TaskSet::from_tasks(vec![]);
        let err = find_template(&set, "Workout").unwrap_err();
        assert!(err.to_string().contains("Workout"));
    }

    #[test]
    fn test_find_template_ignores_non_templates() {
        let set = TaskSet::from_tasks(vec![Task::new(Status::Pending, "Interview".to_string())]);
        assert!(find_template(&set, "Interview").is_err());
    }

    #[test]
    fn test_duplicate_summaries_lowest_id_wins() {
        let mut first = template("Interview");
        first.id = Some(2);
        first.notes = "first".to_string();
        let mut second = template("Interview");
        second.id = Some(5);
        second.notes = "second".to_string();
        // Insertion order deliberately reversed; canonical order decides.
        let set = TaskSet::from_tasks(vec![second, first]);
        let found = find_template(&set, "Interview").unwrap();
        assert_eq!(found.id, Some(2));
        assert_eq!(found.notes, "first");
    }

    #[test]
    fn test_build_copies_exactly_the_classification_fields() {
        let tpl = template("Interview");
        let task = build_from_template("Jane Doe", &tpl);

        assert_eq!(task.summary, "Jane Doe");
        assert_eq!(task.status, Status::Pending);
        assert!(task.write_pending);
        assert_eq!(task.tags, tpl.tags);
        assert_eq!(task.project, tpl.project);
        assert_eq!(task.priority, tpl.priority);
        assert_eq!(task.notes, tpl.notes);
        // fresh identity and timestamps
        assert_ne!(task.uuid, tpl.uuid);
        assert!(task.id.is_none());
        assert!(task.resolved.is_none());
    }

    #[test]
    fn test_build_is_summary_independent() {
        let tpl = template("Lift");
        for summary in ["Deadlift (225 lbs)", "", "Lift"] {
            let task = build_from_template(summary, &tpl);
            assert_eq!(task.status, Status::Pending);
            assert_eq!(task.tags, tpl.tags);
            assert_eq!(task.priority, tpl.priority);
        }
    }
}
