use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::query::Query;

/// Persisted application state. The `context` query is merged into every
/// request that does not set ignore-context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub context: Query,
}

/// Read the state file. A missing or malformed file yields the default
/// empty state rather than an error; dispatch must work on a fresh machine.
pub fn read_state(path: &Path) -> State {
    let Ok(content) = fs::read_to_string(path) else {
        return State::default();
    };
    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            eprintln!(
                "warning: could not parse {} ({}); ignoring saved context",
                path.display(),
                e
            );
            State::default()
        }
    }
}

/// Write the state file, creating parent directories as needed.
pub fn write_state(path: &Path, state: &State) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content)
}
