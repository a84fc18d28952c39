use std::fs;
use std::path::Path;
use std::process::Command;

/// Error type for git operations
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("could not run git: {0}")]
    Io(#[from] std::io::Error),
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Create the repo directory and initialize git in it on first use.
pub fn ensure_repo(repo: &Path) -> Result<(), GitError> {
    fs::create_dir_all(repo)?;
    if repo.join(".git").exists() {
        return Ok(());
    }
    run(repo, &["init", "--quiet"])
}

/// Stage the whole working tree and commit it with the given message.
/// Commits are per-operation; there is no partial staging.
pub fn commit(repo: &Path, message: &str) -> Result<(), GitError> {
    run(repo, &["add", "-A"])?;
    run(repo, &["commit", "--quiet", "-m", message])
}

fn run(repo: &Path, args: &[&str]) -> Result<(), GitError> {
    let output = Command::new("git").args(args).current_dir(repo).output()?;
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
