//! Integration tests for the `st` CLI.
//!
//! Each test creates a temp repo + cache directory, runs `st` as a
//! subprocess with env-pointed paths, and verifies stdout, stored task
//! files, and git history.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use stint::io::store::TaskSet;
use stint::model::config::Config;
use stint::model::task::{Priority, Status, Task};
use tempfile::TempDir;

struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    fn new() -> TestEnv {
        TestEnv {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn repo(&self) -> PathBuf {
        self.tmp.path().join("repo")
    }

    fn state_file(&self) -> PathBuf {
        self.tmp.path().join("cache/state.json")
    }

    fn ids_file(&self) -> PathBuf {
        self.tmp.path().join("cache/ids.toml")
    }

    fn config(&self) -> Config {
        Config {
            repo: self.repo(),
            state_file: self.state_file(),
            ids_file: self.ids_file(),
        }
    }

    /// Load the stored task set for direct field assertions.
    fn tasks(&self) -> Vec<Task> {
        TaskSet::load(&self.config()).unwrap().tasks().to_vec()
    }

    fn task_by_summary(&self, summary: &str) -> Task {
        self.tasks()
            .into_iter()
            .find(|t| t.summary == summary)
            .unwrap_or_else(|| panic!("no stored task with summary {:?}", summary))
    }

    fn commit_count(&self) -> usize {
        let output = Command::new("git")
            .args(["log", "--format=%H"])
            .current_dir(self.repo())
            .output()
            .expect("failed to run git log");
        String::from_utf8_lossy(&output.stdout).lines().count()
    }
}

/// Get the path to the built `st` binary.
fn st_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("st");
    path
}

/// Run `st` with the given args, returning (stdout, stderr, success).
fn run_st(env: &TestEnv, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(st_bin())
        .args(args)
        .current_dir(env.tmp.path())
        .env("HOME", env.tmp.path())
        .env("STINT_REPO", env.repo())
        .env("STINT_STATE_FILE", env.state_file())
        .env("STINT_IDS_FILE", env.ids_file())
        .env("GIT_AUTHOR_NAME", "st-test")
        .env("GIT_AUTHOR_EMAIL", "st@test.invalid")
        .env("GIT_COMMITTER_NAME", "st-test")
        .env("GIT_COMMITTER_EMAIL", "st@test.invalid")
        .output()
        .expect("failed to run st");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `st` expecting success, return stdout.
fn run_st_ok(env: &TestEnv, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_st(env, args);
    if !success {
        panic!(
            "st {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// Dispatch basics
// ---------------------------------------------------------------------------

#[test]
fn test_no_args_on_empty_repo() {
    let env = TestEnv::new();
    let stdout = run_st_ok(&env, &[]);
    assert_eq!(stdout, "");
}

#[test]
fn test_add_then_default_listing() {
    let env = TestEnv::new();
    let stdout = run_st_ok(&env, &["add", "buy", "milk"]);
    assert!(stdout.contains("1: buy milk"));

    let stdout = run_st_ok(&env, &[]);
    assert!(stdout.contains("buy milk"));
}

#[test]
fn test_add_assigns_sequential_ids() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "first"]);
    run_st_ok(&env, &["add", "second"]);

    assert_eq!(env.task_by_summary("first").id, Some(1));
    assert_eq!(env.task_by_summary("second").id, Some(2));
}

#[test]
fn test_unknown_keyword_falls_back_to_listing() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "something"]);

    // Unknown keywords route to the next listing instead of failing; the
    // token itself becomes a (non-matching) text filter.
    let (stdout, _, success) = run_st(&env, &["bogus-keyword", "foo"]);
    assert!(success);
    assert_eq!(stdout, "");

    // A matching text token shows the task, same as the no-args listing.
    let stdout = run_st_ok(&env, &["something"]);
    assert!(stdout.contains("something"));
}

#[test]
fn test_empty_keyword_query_tokens() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "+work", "deep", "focus"]);
    run_st_ok(&env, &["add", "errands"]);

    let stdout = run_st_ok(&env, &["+work"]);
    assert!(stdout.contains("deep focus"));
    assert!(!stdout.contains("errands"));
}

#[test]
fn test_list_aliases_match_default() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "alpha"]);

    let plain = run_st_ok(&env, &[]);
    assert_eq!(run_st_ok(&env, &["list"]), plain);
    assert_eq!(run_st_ok(&env, &["ls"]), plain);
}

#[test]
fn test_today_scopes_to_tag() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "+today", "standup"]);
    run_st_ok(&env, &["add", "someday", "thing"]);

    let stdout = run_st_ok(&env, &["today"]);
    assert!(stdout.contains("standup"));
    assert!(!stdout.contains("someday thing"));

    let stdout = run_st_ok(&env, &[]);
    assert!(stdout.contains("standup"));
    assert!(stdout.contains("someday thing"));
}

// ---------------------------------------------------------------------------
// Template shortcuts
// ---------------------------------------------------------------------------

#[test]
fn test_interview_copies_template_fields() {
    let env = TestEnv::new();
    run_st_ok(
        &env,
        &["template", "Interview", "+hr", "project:Hiring", "P1"],
    );
    let commits_before = env.commit_count();

    run_st_ok(&env, &["interview", "Jane Doe"]);

    // exactly one commit for the whole creation
    assert_eq!(env.commit_count(), commits_before + 1);

    let task = env.task_by_summary("Jane Doe");
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.tags, vec!["hr"]);
    assert_eq!(task.project, Some("Hiring".to_string()));
    assert_eq!(task.priority, Priority::P1);
    assert!(task.resolved.is_none());

    let stdout = run_st_ok(&env, &[]);
    assert!(stdout.contains("Jane Doe"));
    // the template itself is not actionable
    assert!(!stdout.contains("Interview"));
}

#[test]
fn test_new_hire_summary_format() {
    let env = TestEnv::new();
    run_st_ok(&env, &["template", "New", "Hire", "+onboarding"]);
    run_st_ok(&env, &["new-hire", "Robin"]);

    let task = env.task_by_summary("New Hire - Robin");
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.tags, vec!["onboarding"]);
}

#[test]
fn test_lift_logs_resolved_task() {
    let env = TestEnv::new();
    run_st_ok(&env, &["template", "Lift", "+gym"]);

    let stdout = run_st_ok(&env, &["lift", "Deadlift", "225"]);
    assert!(stdout.contains("Deadlift (225 lbs)"));

    let task = env.task_by_summary("Deadlift (225 lbs)");
    assert_eq!(task.status, Status::Resolved);
    assert!(task.resolved.is_some());
    assert_eq!(task.tags, vec!["gym"]);

    // never shows up as actionable
    let stdout = run_st_ok(&env, &[]);
    assert!(!stdout.contains("Deadlift"));
    let stdout = run_st_ok(&env, &["show-resolved"]);
    assert!(stdout.contains("Deadlift (225 lbs)"));
}

#[test]
fn test_log_records_resolved_task() {
    let env = TestEnv::new();
    run_st_ok(&env, &["log", "+run", "morning", "5k"]);

    let task = env.task_by_summary("morning 5k");
    assert_eq!(task.status, Status::Resolved);
    assert!(task.resolved.is_some());
    assert_eq!(task.tags, vec!["run"]);
    assert_eq!(run_st_ok(&env, &[]), "");
}

#[test]
fn test_template_shortcut_missing_operand() {
    let env = TestEnv::new();
    let (_, stderr, success) = run_st(&env, &["interview"]);
    assert!(!success);
    assert!(stderr.contains("usage: st interview <name>"));

    let (_, stderr, success) = run_st(&env, &["lift", "Deadlift"]);
    assert!(!success);
    assert!(stderr.contains("usage: st lift <exercise> <weight>"));
}

#[test]
fn test_missing_template_fails_red() {
    let env = TestEnv::new();
    let (_, stderr, success) = run_st(&env, &["interview", "Jane"]);
    assert!(!success);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("no template task with summary \"Interview\""));
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

#[test]
fn test_done_resolves_and_releases_id() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "ship", "it"]);
    run_st_ok(&env, &["done", "1"]);

    let task = env.task_by_summary("ship it");
    assert_eq!(task.status, Status::Resolved);
    assert!(task.resolved.is_some());
    assert!(task.id.is_none());

    assert_eq!(run_st_ok(&env, &[]), "");
    assert!(run_st_ok(&env, &["show-resolved"]).contains("ship it"));
}

#[test]
fn test_start_and_stop() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "deep", "work"]);

    run_st_ok(&env, &["start", "1"]);
    assert!(run_st_ok(&env, &["active"]).contains("deep work"));
    assert!(run_st_ok(&env, &[]).contains("deep work"));

    run_st_ok(&env, &["stop", "1"]);
    assert!(run_st_ok(&env, &["paused"]).contains("deep work"));
    // paused tasks leave the next listing but stay in show-open
    assert_eq!(run_st_ok(&env, &[]), "");
    assert!(run_st_ok(&env, &["show-open"]).contains("deep work"));
}

#[test]
fn test_remove_aliases_tombstone() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "first"]);
    run_st_ok(&env, &["add", "second"]);

    run_st_ok(&env, &["rm", "1"]);
    run_st_ok(&env, &["remove", "2"]);

    assert_eq!(run_st_ok(&env, &[]), "");
    assert_eq!(env.task_by_summary("first").status, Status::Deleted);
    assert_eq!(env.task_by_summary("second").status, Status::Deleted);
}

#[test]
fn test_transition_unknown_id_fails() {
    let env = TestEnv::new();
    let (_, stderr, success) = run_st(&env, &["done", "42"]);
    assert!(!success);
    assert!(stderr.contains("no task with id 42"));
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

#[test]
fn test_modify_applies_changes() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "+old", "tweak", "me"]);
    run_st_ok(&env, &["modify", "1", "+new", "-old", "project:infra", "P0"]);

    let task = env.task_by_summary("tweak me");
    assert_eq!(task.tags, vec!["new"]);
    assert_eq!(task.project, Some("infra".to_string()));
    assert_eq!(task.priority, Priority::P0);
}

#[test]
fn test_note_append_and_show() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "call", "the", "bank"]);
    run_st_ok(&env, &["note", "1", "ask", "about", "fees"]);
    run_st_ok(&env, &["notes", "1", "bring", "id"]);

    let stdout = run_st_ok(&env, &["note", "1"]);
    assert!(stdout.contains("call the bank"));
    assert!(stdout.contains("ask about fees"));
    assert!(stdout.contains("bring id"));

    assert_eq!(env.task_by_summary("call the bank").notes, "ask about fees\nbring id");
}

#[test]
fn test_add_with_note_separator() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "renew", "passport", "/", "photos", "first"]);
    assert_eq!(env.task_by_summary("renew passport").notes, "photos first");
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[test]
fn test_context_scopes_listing() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "+work", "review", "design"]);
    run_st_ok(&env, &["add", "water", "plants"]);

    fs::create_dir_all(env.state_file().parent().unwrap()).unwrap();
    fs::write(env.state_file(), r#"{"context":{"tags":["work"]}}"#).unwrap();

    let stdout = run_st_ok(&env, &[]);
    assert!(stdout.contains("review design"));
    assert!(!stdout.contains("water plants"));

    let stdout = run_st_ok(&env, &["next", "--ignore-context"]);
    assert!(stdout.contains("review design"));
    assert!(stdout.contains("water plants"));
}

#[test]
fn test_context_merges_into_add() {
    let env = TestEnv::new();
    fs::create_dir_all(env.state_file().parent().unwrap()).unwrap();
    fs::write(env.state_file(), r#"{"context":{"project":"infra"}}"#).unwrap();

    run_st_ok(&env, &["add", "rotate", "keys"]);
    assert_eq!(
        env.task_by_summary("rotate keys").project,
        Some("infra".to_string())
    );

    run_st_ok(&env, &["add", "--ignore-context", "free", "floating"]);
    assert_eq!(env.task_by_summary("free floating").project, None);
}

#[test]
fn test_corrupt_state_file_is_ignored() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "survives"]);

    fs::create_dir_all(env.state_file().parent().unwrap()).unwrap();
    fs::write(env.state_file(), "not json {{{").unwrap();

    let stdout = run_st_ok(&env, &[]);
    assert!(stdout.contains("survives"));
}

// ---------------------------------------------------------------------------
// Read-only shortcut views
// ---------------------------------------------------------------------------

#[test]
fn test_projects_breakdown() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "project:house", "fix", "gate"]);
    run_st_ok(&env, &["add", "project:house", "paint", "fence"]);
    run_st_ok(&env, &["add", "project:band", "book", "studio"]);
    run_st_ok(&env, &["done", "3"]);

    let stdout = run_st_ok(&env, &["projects"]);
    assert!(stdout.contains("house"));
    assert!(stdout.contains("2 open, 0 resolved"));
    assert!(stdout.contains("band"));
    assert!(stdout.contains("0 open, 1 resolved"));
}

#[test]
fn test_templates_listing() {
    let env = TestEnv::new();
    run_st_ok(&env, &["template", "Interview", "+hr"]);
    run_st_ok(&env, &["template", "Lift", "+gym"]);

    for args in [["templates"], ["show-templates"]] {
        let stdout = run_st_ok(&env, &args);
        assert!(stdout.contains("Interview"));
        assert!(stdout.contains("Lift"));
    }

    // bare `template` is the listing form too
    let stdout = run_st_ok(&env, &["template"]);
    assert!(stdout.contains("Interview"));
}

#[test]
fn test_inbox_shows_unorganised_only() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "loose", "thought"]);
    run_st_ok(&env, &["add", "+sorted", "organised", "task"]);
    run_st_ok(&env, &["add", "project:house", "filed", "task"]);

    for alias in ["inbox", "in"] {
        let stdout = run_st_ok(&env, &[alias]);
        assert!(stdout.contains("loose thought"));
        assert!(!stdout.contains("organised task"));
        assert!(!stdout.contains("filed task"));
    }
}

#[test]
fn test_show_tags_distinct_sorted() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "+work", "+deep", "one"]);
    run_st_ok(&env, &["add", "+work", "two"]);

    let stdout = run_st_ok(&env, &["show-tags"]);
    assert_eq!(stdout, "+deep\n+work\n");
}

// ---------------------------------------------------------------------------
// Persistence details
// ---------------------------------------------------------------------------

#[test]
fn test_repo_is_git_initialized() {
    let env = TestEnv::new();
    run_st_ok(&env, &[]);
    assert!(env.repo().join(".git").is_dir());
}

#[test]
fn test_every_write_is_committed() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "one"]);
    run_st_ok(&env, &["start", "1"]);
    run_st_ok(&env, &["done", "1"]);
    assert_eq!(env.commit_count(), 3);
}

#[test]
fn test_commit_messages_describe_operations() {
    let env = TestEnv::new();
    run_st_ok(&env, &["add", "write", "report"]);
    run_st_ok(&env, &["done", "1"]);

    let output = Command::new("git")
        .args(["log", "--format=%s"])
        .current_dir(env.repo())
        .output()
        .unwrap();
    let log = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(log.contains("Added 1: write report"));
    assert!(log.contains("Resolved 1: write report"));
}

#[test]
fn test_version_flag() {
    let env = TestEnv::new();
    let (stdout, _, success) = run_st(&env, &["--version"]);
    assert!(success);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
