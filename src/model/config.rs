use std::path::PathBuf;

/// Error resolving startup configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot determine home directory (HOME is unset)")]
    NoHome,
}

/// Process-wide, read-only configuration. Resolved once at startup and
/// passed by reference to every handler.
#[derive(Debug, Clone)]
pub struct Config {
    /// Git-backed task repo directory
    pub repo: PathBuf,
    /// Persisted context state file (JSON)
    pub state_file: PathBuf,
    /// Per-machine short-ID index file (TOML); deliberately outside the
    /// repo so IDs are not synced between machines
    pub ids_file: PathBuf,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::resolve(
            std::env::var("STINT_REPO").ok(),
            std::env::var("STINT_STATE_FILE").ok(),
            std::env::var("STINT_IDS_FILE").ok(),
            std::env::var("XDG_CACHE_HOME").ok(),
            std::env::var("HOME").ok(),
        )
    }

    fn resolve(
        repo: Option<String>,
        state_file: Option<String>,
        ids_file: Option<String>,
        xdg_cache: Option<String>,
        home: Option<String>,
    ) -> Result<Config, ConfigError> {
        let home = home.map(PathBuf::from);

        let repo = match repo {
            Some(dir) => PathBuf::from(dir),
            None => home.clone().ok_or(ConfigError::NoHome)?.join(".stint"),
        };

        // Both fallbacks live under the cache dir, so compute it lazily:
        // explicit paths must not require HOME to be set.
        let cache_dir = |home: &Option<PathBuf>| -> Result<PathBuf, ConfigError> {
            let base = match &xdg_cache {
                Some(dir) => PathBuf::from(dir),
                None => home.clone().ok_or(ConfigError::NoHome)?.join(".cache"),
            };
            Ok(base.join("stint"))
        };

        let state_file = match state_file {
            Some(path) => PathBuf::from(path),
            None => cache_dir(&home)?.join("state.json"),
        };
        let ids_file = match ids_file {
            Some(path) => PathBuf::from(path),
            None => cache_dir(&home)?.join("ids.toml"),
        };

        Ok(Config {
            repo,
            state_file,
            ids_file,
        })
    }
}
