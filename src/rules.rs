//! The compiled, output-side model: contexts made of rules.
//!
//! Conversion lowers every grammar pattern into one of these rules, then the
//! whole thing is rendered into a [`Value`] mapping and handed to the
//! emitter. Keeping this as its own typed layer (instead of building value
//! mappings inline) keeps the push/pop restructuring readable.

use std::collections::BTreeMap;

use crate::value::{Key, Value};

/// Scopes for the capture groups of one rule, keyed by group index, or by
/// the literal capture name for the unsupported named form, which is kept so
/// no data is silently lost.
pub type CaptureMap = BTreeMap<Key, String>;

/// An ordered rule list; order is matching priority.
pub type Context = Vec<Rule>;

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Match a regex, optionally scoping the whole match and its captures.
    Match {
        match_: String,
        scope: Option<String>,
        captures: CaptureMap,
        comment: Option<String>,
    },

    /// Match a regex and push a nested context.
    Push {
        match_: String,
        scope: Option<String>,
        captures: CaptureMap,
        comment: Option<String>,
        push: Context,
    },

    /// Match a regex and pop the current context. Synthesized from the `end`
    /// side of a begin/end pattern.
    Pop {
        match_: String,
        scope: Option<String>,
        captures: CaptureMap,
    },

    /// Splice in another context by name.
    Include(String),

    /// Scope applied to everything the context covers, delimiters included.
    MetaScope(String),

    /// Scope applied to the text strictly between the push and pop matches.
    MetaContentScope(String),
}

impl Rule {
    pub(crate) fn to_value(&self) -> Value {
        let mut entry = BTreeMap::new();
        match self {
            Rule::Match { match_, scope, captures, comment } => {
                entry.insert(Key::from("match"), Value::from(match_.as_str()));
                insert_scope(&mut entry, scope);
                insert_captures(&mut entry, captures);
                insert_comment(&mut entry, comment);
            }
            Rule::Push { match_, scope, captures, comment, push } => {
                entry.insert(Key::from("match"), Value::from(match_.as_str()));
                insert_scope(&mut entry, scope);
                insert_captures(&mut entry, captures);
                insert_comment(&mut entry, comment);
                entry.insert(Key::from("push"), context_to_value(push));
            }
            Rule::Pop { match_, scope, captures } => {
                entry.insert(Key::from("match"), Value::from(match_.as_str()));
                insert_scope(&mut entry, scope);
                insert_captures(&mut entry, captures);
                entry.insert(Key::from("pop"), Value::from(true));
            }
            Rule::Include(target) => {
                entry.insert(Key::from("include"), Value::from(target.as_str()));
            }
            Rule::MetaScope(scope) => {
                entry.insert(Key::from("meta_scope"), Value::from(scope.as_str()));
            }
            Rule::MetaContentScope(scope) => {
                entry.insert(Key::from("meta_content_scope"), Value::from(scope.as_str()));
            }
        }
        Value::Mapping(entry)
    }
}

pub(crate) fn context_to_value(context: &Context) -> Value {
    context.iter().map(Rule::to_value).collect()
}

fn insert_scope(entry: &mut BTreeMap<Key, Value>, scope: &Option<String>) {
    if let Some(scope) = scope {
        entry.insert(Key::from("scope"), Value::from(scope.as_str()));
    }
}

// An empty capture map is omitted entirely instead of emitting a dangling
// `captures:` key.
fn insert_captures(entry: &mut BTreeMap<Key, Value>, captures: &CaptureMap) {
    if captures.is_empty() {
        return;
    }
    let value = captures
        .iter()
        .map(|(group, scope)| (group.clone(), Value::from(scope.as_str())))
        .collect();
    entry.insert(Key::from("captures"), value);
}

fn insert_comment(entry: &mut BTreeMap<Key, Value>, comment: &Option<String>) {
    if let Some(comment) = comment {
        entry.insert(Key::from("comment"), Value::from(comment.as_str()));
    }
}
