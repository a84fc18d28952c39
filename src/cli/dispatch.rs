use std::error::Error;

use chrono::Utc;

use crate::cli::{handlers, registry};
use crate::io::store::TaskSet;
use crate::io::{git, state};
use crate::model::config::Config;
use crate::model::query::Query;
use crate::model::task::Status;
use crate::ops::template;

/// A shortcut was invoked without its operands.
#[derive(Debug, thiserror::Error)]
#[error("usage: st {0}")]
pub struct UsageError(&'static str);

/// Top-level command resolution, first match wins: empty arguments, then
/// the hard-coded shortcuts, then the generic registry-driven path.
pub fn execute(config: &Config, args: &[String]) -> Result<(), Box<dyn Error>> {
    if args.is_empty() {
        return next_with_context(config, Query::default());
    }

    match args[0].as_str() {
        "interview" => {
            let name = operand(args, 1, "interview <name>")?;
            add_from_template(config, name.to_string(), "Interview", false)
        }
        "new-hire" => {
            let name = operand(args, 1, "new-hire <name>")?;
            add_from_template(config, format!("New Hire - {}", name), "New Hire", false)
        }
        "lift" => {
            let exercise = operand(args, 1, "lift <exercise> <weight>")?;
            let weight = operand(args, 2, "lift <exercise> <weight>")?;
            add_from_template(
                config,
                format!("{} ({} lbs)", exercise, weight),
                "Lift",
                true,
            )
        }
        "today" => next_with_context(
            config,
            Query {
                tags: vec!["today".to_string()],
                ..Query::default()
            },
        ),
        "inbox" | "in" => shortcut_listing(config, handlers::cmd_show_unorganised),
        "projects" => shortcut_listing(config, handlers::cmd_show_projects),
        "templates" => shortcut_listing(config, handlers::cmd_show_templates),
        "active" => shortcut_listing(config, handlers::cmd_show_active),
        "paused" => shortcut_listing(config, handlers::cmd_show_paused),
        // The listing aliases drop their keyword and join the generic path.
        "list" | "ls" => generic(config, &args[1..]),
        _ => generic(config, args),
    }
}

/// The "show next actionable tasks" path shared by the empty-argument,
/// `today`, and unknown-keyword routes.
fn next_with_context(config: &Config, query: Query) -> Result<(), Box<dyn Error>> {
    let state = state::read_state(&config.state_file);
    handlers::cmd_next(config, &state.context, &query)
}

/// Read-only listing shortcuts run unfiltered: the request query suppresses
/// the context merge.
fn shortcut_listing(config: &Config, handler: registry::CommandFn) -> Result<(), Box<dyn Error>> {
    let state = state::read_state(&config.state_file);
    let query = Query {
        ignore_context: true,
        ..Query::default()
    };
    handler(config, &state.context, &query)
}

/// Generic path: parse the tokens, load the persisted context, and look the
/// keyword up in the registry. An empty or unregistered keyword falls back
/// to the next listing with the parsed query as-is.
fn generic(config: &Config, args: &[String]) -> Result<(), Box<dyn Error>> {
    let query = Query::parse(args, &registry::keywords());
    let state = state::read_state(&config.state_file);
    match registry::lookup(&query.cmd) {
        Some(handler) => handler(config, &state.context, &query),
        None => handlers::cmd_next(config, &state.context, &query),
    }
}

fn operand<'a>(args: &'a [String], index: usize, usage: &'static str) -> Result<&'a str, UsageError> {
    args.get(index)
        .map(|s| s.as_str())
        .ok_or(UsageError(usage))
}

/// Shared body of the template-instantiation shortcuts: resolve the named
/// template, stamp a new task from it, persist with a single save and a
/// single commit. `logged` records a retroactively completed event, so the
/// task lands directly in the resolved state and is echoed back.
fn add_from_template(
    config: &Config,
    summary: String,
    template_name: &str,
    logged: bool,
) -> Result<(), Box<dyn Error>> {
    let mut set = TaskSet::load(config)?;
    let tpl = template::find_template(&set, template_name)?.clone();
    let mut task = template::build_from_template(&summary, &tpl);
    if logged {
        task.status = Status::Resolved;
        task.resolved = Some(Utc::now());
    }
    let task = set.load_task(task);
    println!("{}", task);
    set.save_pending_changes()?;
    git::commit(&config.repo, &format!("Added {}", task))?;
    Ok(())
}
