use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::config::Config;
use crate::model::task::Task;

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not serialize {what}: {source}")]
    Serialize {
        what: String,
        source: toml::ser::Error,
    },
    #[error("no task with id {0}")]
    TaskNotFound(u64),
}

/// On-disk shape of the ID-index file (ids.toml). Maps short numeric IDs
/// (as table keys) to task uuids. Kept in insertion order so the file is
/// stable across rewrites.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IdIndex {
    #[serde(default)]
    ids: IndexMap<String, Uuid>,
}

/// The loaded task collection.
///
/// Canonical order: tasks carrying a short ID first, ascending; ID-less
/// tasks after, by creation time then uuid. Scans over `tasks()` (template
/// lookup included) are therefore deterministic.
#[derive(Debug)]
pub struct TaskSet {
    tasks: Vec<Task>,
    tasks_dir: PathBuf,
    ids_file: PathBuf,
}

impl TaskSet {
    /// Load every task file under `<repo>/tasks/` and attach short IDs from
    /// the index file.
    pub fn load(config: &Config) -> Result<TaskSet, StoreError> {
        let tasks_dir = config.repo.join("tasks");
        let mut tasks = Vec::new();

        if tasks_dir.is_dir() {
            let entries = fs::read_dir(&tasks_dir).map_err(|e| StoreError::Read {
                path: tasks_dir.clone(),
                source: e,
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| StoreError::Read {
                    path: tasks_dir.clone(),
                    source: e,
                })?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                    continue;
                }
                let text = fs::read_to_string(&path).map_err(|e| StoreError::Read {
                    path: path.clone(),
                    source: e,
                })?;
                let task: Task =
                    toml::from_str(&text).map_err(|e| StoreError::Parse { path, source: e })?;
                tasks.push(task);
            }
        }

        let index = read_id_index(&config.ids_file);
        for task in &mut tasks {
            if !task.status.bears_id() {
                continue;
            }
            let id = index
                .ids
                .iter()
                .find(|(_, uuid)| **uuid == task.uuid)
                .and_then(|(id, _)| id.parse().ok());
            task.id = id;
        }

        let mut set = TaskSet {
            tasks,
            tasks_dir,
            ids_file: config.ids_file.clone(),
        };
        // A task file may exist without an index entry (fresh machine, or a
        // reassigned index); give those an ID now so they stay addressable.
        let missing: Vec<Uuid> = set
            .tasks
            .iter()
            .filter(|t| t.status.bears_id() && t.id.is_none())
            .map(|t| t.uuid)
            .collect();
        for uuid in missing {
            let id = set.next_free_id();
            if let Some(task) = set.tasks.iter_mut().find(|t| t.uuid == uuid) {
                task.id = Some(id);
            }
        }
        set.sort();
        Ok(set)
    }

    /// All tasks in canonical order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Find a task by short ID.
    pub fn get(&self, id: u64) -> Result<&Task, StoreError> {
        self.tasks
            .iter()
            .find(|t| t.id == Some(id))
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Find a task by short ID, mutably.
    pub fn get_mut(&mut self, id: u64) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Insert a new task into the set, assigning the lowest free short ID
    /// when its status bears one. Returns the task as stored.
    pub fn load_task(&mut self, mut task: Task) -> Task {
        if task.status.bears_id() && task.id.is_none() {
            task.id = Some(self.next_free_id());
        }
        task.write_pending = true;
        self.tasks.push(task.clone());
        self.sort();
        task
    }

    /// Write every write-pending task to disk and rewrite the ID index from
    /// the current open set. Tasks whose status no longer bears an ID give
    /// their short ID back here.
    pub fn save_pending_changes(&mut self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.tasks_dir).map_err(|e| StoreError::Write {
            path: self.tasks_dir.clone(),
            source: e,
        })?;

        for task in &mut self.tasks {
            if !task.status.bears_id() {
                task.id = None;
            }
        }

        for task in &mut self.tasks {
            if !task.write_pending {
                continue;
            }
            let text = toml::to_string_pretty(&*task).map_err(|e| StoreError::Serialize {
                what: format!("task {}", task.uuid),
                source: e,
            })?;
            let path = self.tasks_dir.join(format!("{}.toml", task.uuid));
            fs::write(&path, text).map_err(|e| StoreError::Write { path, source: e })?;
            task.write_pending = false;
        }

        self.sort();
        self.write_id_index()
    }

    fn write_id_index(&self) -> Result<(), StoreError> {
        let mut index = IdIndex::default();
        for task in &self.tasks {
            if let Some(id) = task.id {
                index.ids.insert(id.to_string(), task.uuid);
            }
        }
        if let Some(parent) = self.ids_file.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let text = toml::to_string_pretty(&index).map_err(|e| StoreError::Serialize {
            what: "id index".to_string(),
            source: e,
        })?;
        fs::write(&self.ids_file, text).map_err(|e| StoreError::Write {
            path: self.ids_file.clone(),
            source: e,
        })
    }

    fn next_free_id(&self) -> u64 {
        let used: HashSet<u64> = self.tasks.iter().filter_map(|t| t.id).collect();
        let mut id = 1;
        while used.contains(&id) {
            id += 1;
        }
        id
    }

    fn sort(&mut self) {
        self.tasks.sort_by(|a, b| match (a.id, b.id) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created.cmp(&b.created).then_with(|| a.uuid.cmp(&b.uuid)),
        });
    }

    /// Build a TaskSet directly from tasks, for tests that never touch disk.
    #[cfg(test)]
    pub(crate) fn from_tasks(tasks: Vec<Task>) -> TaskSet {
        let mut set = TaskSet {
            tasks,
            tasks_dir: PathBuf::new(),
            ids_file: PathBuf::new(),
        };
        set.sort();
        set
    }
}

/// Read the ID index; missing or corrupt files start fresh (IDs are a local
/// convenience, the uuid in the task file is the durable identity).
fn read_id_index(path: &Path) -> IdIndex {
    let Ok(text) = fs::read_to_string(path) else {
        return IdIndex::default();
    };
    match toml::from_str(&text) {
        Ok(index) => index,
        Err(e) => {
            eprintln!(
                "warning: could not parse {} ({}); short ids will be reassigned",
                path.display(),
                e
            );
            IdIndex::default()
        }
    }
}
