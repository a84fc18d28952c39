use serde::{Deserialize, Serialize};

use super::task::Priority;

/// A structured filter/action request parsed from raw command-line tokens.
///
/// A Query is built fresh for every invocation and never persisted itself;
/// the persisted Context reuses the same shape (see `io::state`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Resolved command keyword, or empty if none was parsed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmd: String,
    /// Short task IDs named on the command line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    /// Requested tags (`+tag`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Excluded tags (`-tag`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anti_tags: Vec<String>,
    /// Project filter or assignment (`project:name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Priority filter or assignment (`P0`..`P3`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Free text: summary words for create commands, substring filter for
    /// listings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    /// Note body, everything after a bare `/` token
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// When set, the persisted Context is not merged in
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_context: bool,
}

impl Query {
    /// Parse raw tokens into a Query. Only token 0 can become the command
    /// keyword, and only when it matches a registered keyword; everything
    /// unrecognized joins the free-text words.
    pub fn parse(tokens: &[String], keywords: &[&str]) -> Query {
        let mut query = Query::default();
        let mut note_words: Vec<&str> = Vec::new();
        let mut in_note = false;

        for (i, token) in tokens.iter().enumerate() {
            if in_note {
                note_words.push(token);
                continue;
            }
            if token == "/" {
                in_note = true;
                continue;
            }
            if i == 0 && keywords.contains(&token.as_str()) {
                query.cmd = token.clone();
                continue;
            }
            if token == "--ignore-context" {
                query.ignore_context = true;
                continue;
            }
            if let Ok(id) = token.parse::<u64>() {
                query.ids.push(id);
                continue;
            }
            if let Some(tag) = token.strip_prefix('+') {
                if !tag.is_empty() {
                    query.tags.push(tag.to_string());
                    continue;
                }
            }
            if let Some(tag) = token.strip_prefix('-') {
                if !tag.is_empty() && !tag.starts_with('-') {
                    query.anti_tags.push(tag.to_string());
                    continue;
                }
            }
            if let Some(project) = token.strip_prefix("project:") {
                if !project.is_empty() {
                    query.project = Some(project.to_string());
                    continue;
                }
            }
            if let Some(priority) = Priority::from_token(token) {
                query.priority = Some(priority);
                continue;
            }
            query.text.push(token.clone());
        }

        query.note = note_words.join(" ");
        query
    }

    /// The free-text words joined as a summary string.
    pub fn summary(&self) -> String {
        self.text.join(" ")
    }

    /// Merge the persisted Context into this request. Context filters come
    /// first so request-specific values win; `cmd`, `ids`, `text`, and
    /// `note` always come from the request alone.
    pub fn with_context(&self, context: &Query) -> Query {
        if self.ignore_context {
            return self.clone();
        }

        let mut merged = self.clone();
        merged.tags = union(&context.tags, &self.tags);
        merged.anti_tags = union(&context.anti_tags, &self.anti_tags);
        if merged.project.is_none() {
            merged.project = context.project.clone();
        }
        if merged.priority.is_none() {
            merged.priority = context.priority;
        }
        merged
    }
}

/// Order-preserving union, first operand's order first.
fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut out = first.to_vec();
    for item in second {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
