use std::error::Error;
use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::cli::handlers;
use crate::model::config::Config;
use crate::model::query::Query;

/// Handler signature shared by every registered command:
/// (configuration, persisted context, request query).
pub type CommandFn = fn(&Config, &Query, &Query) -> Result<(), Box<dyn Error>>;

pub const CMD_NEXT: &str = "next";
pub const CMD_SHOW_OPEN: &str = "show-open";
pub const CMD_ADD: &str = "add";
pub const CMD_RM: &str = "rm";
pub const CMD_REMOVE: &str = "remove";
pub const CMD_TEMPLATE: &str = "template";
pub const CMD_LOG: &str = "log";
pub const CMD_START: &str = "start";
pub const CMD_STOP: &str = "stop";
pub const CMD_DONE: &str = "done";
pub const CMD_RESOLVE: &str = "resolve";
pub const CMD_MODIFY: &str = "modify";
pub const CMD_EDIT: &str = "edit";
pub const CMD_NOTE: &str = "note";
pub const CMD_NOTES: &str = "notes";
pub const CMD_SHOW_ACTIVE: &str = "show-active";
pub const CMD_SHOW_PAUSED: &str = "show-paused";
pub const CMD_OPEN: &str = "open";
pub const CMD_SHOW_PROJECTS: &str = "show-projects";
pub const CMD_SHOW_TAGS: &str = "show-tags";
pub const CMD_SHOW_TEMPLATES: &str = "show-templates";
pub const CMD_SHOW_RESOLVED: &str = "show-resolved";
pub const CMD_SHOW_UNORGANISED: &str = "show-unorganised";

static REGISTRY: OnceLock<IndexMap<&'static str, CommandFn>> = OnceLock::new();

/// The command-keyword table, built once. Context switching, undo, sync,
/// git passthrough, version/help, and shell completions are deliberately
/// not registered; clap owns --help/--version and the rest is out of scope
/// for this front end.
pub fn registry() -> &'static IndexMap<&'static str, CommandFn> {
    REGISTRY.get_or_init(|| {
        IndexMap::from([
            (CMD_NEXT, handlers::cmd_next as CommandFn),
            (CMD_SHOW_OPEN, handlers::cmd_show_open as CommandFn),
            (CMD_ADD, handlers::cmd_add as CommandFn),
            (CMD_RM, handlers::cmd_remove as CommandFn),
            (CMD_REMOVE, handlers::cmd_remove as CommandFn),
            (CMD_TEMPLATE, handlers::cmd_template as CommandFn),
            (CMD_LOG, handlers::cmd_log as CommandFn),
            (CMD_START, handlers::cmd_start as CommandFn),
            (CMD_STOP, handlers::cmd_stop as CommandFn),
            (CMD_DONE, handlers::cmd_done as CommandFn),
            (CMD_RESOLVE, handlers::cmd_done as CommandFn),
            (CMD_MODIFY, handlers::cmd_modify as CommandFn),
            (CMD_EDIT, handlers::cmd_edit as CommandFn),
            (CMD_NOTE, handlers::cmd_note as CommandFn),
            (CMD_NOTES, handlers::cmd_note as CommandFn),
            (CMD_SHOW_ACTIVE, handlers::cmd_show_active as CommandFn),
            (CMD_SHOW_PAUSED, handlers::cmd_show_paused as CommandFn),
            (CMD_OPEN, handlers::cmd_open as CommandFn),
            (CMD_SHOW_PROJECTS, handlers::cmd_show_projects as CommandFn),
            (CMD_SHOW_TAGS, handlers::cmd_show_tags as CommandFn),
            (CMD_SHOW_TEMPLATES, handlers::cmd_show_templates as CommandFn),
            (CMD_SHOW_RESOLVED, handlers::cmd_show_resolved as CommandFn),
            (
                CMD_SHOW_UNORGANISED,
                handlers::cmd_show_unorganised as CommandFn,
            ),
        ])
    })
}

/// Look up the handler registered for a command keyword.
pub fn lookup(cmd: &str) -> Option<CommandFn> {
    registry().get(cmd).copied()
}

/// All registered keywords, used by the query parser to recognize token 0.
pub fn keywords() -> Vec<&'static str> {
    registry().keys().copied().collect()
}
