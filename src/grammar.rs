//! Typed view of a TextMate grammar.
//!
//! Grammars arrive as untyped [`Value`] trees, whether they were parsed from
//! a plist or from JSON. The tree is projected once into the types here and
//! every malformed node is rejected at that point with a message naming the
//! offending key, so the conversion itself never sees a wrong shape.

use std::collections::BTreeMap;

use crate::error::{Error, SublimateResult};
use crate::value::{Key, Value};

/// A capture group entry that assigns a scope name to matched text.
///
/// TextMate also allows nested `patterns` inside a capture entry; the target
/// format cannot express those, so only the scope name is kept here and an
/// entry without one is dropped with a diagnostic during conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    pub name: Option<String>,
}

/// Capture maps keyed by the raw key text: `"0"`, `"1"`, ... in well-formed
/// grammars, but grammars in the wild also key by capture name.
pub type Captures = BTreeMap<String, Capture>;

/// A pattern that matches with a single regular expression.
///
/// # Example
///
/// ```json
/// {
///   "name": "string.quoted.double.js",
///   "match": "\"([^\"]*)\"",
///   "captures": {
///     "1": { "name": "string.content.js" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPattern {
    /// Optional scope name for the entire match
    pub name: Option<String>,
    /// The regular expression, possibly a multi-line `(?x)` block
    pub match_: String,
    pub captures: Captures,
    /// Free-form author note, carried into the generated rule
    pub comment: Option<String>,
}

/// A pattern that brackets a region between a `begin` and an `end` regex.
///
/// # Example
///
/// ```json
/// {
///   "name": "string.quoted.double.js",
///   "begin": "\"",
///   "end": "\"",
///   "beginCaptures": {
///     "0": { "name": "punctuation.definition.string.begin.js" }
///   },
///   "patterns": [
///     { "match": "\\\\.", "name": "constant.character.escape.js" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BeginEndPattern {
    /// Scope for the whole region, begin and end matches included
    pub name: Option<String>,
    /// Scope for the text strictly between the begin and end matches
    pub content_name: Option<String>,
    pub begin: String,
    pub end: String,
    /// Shared captures, the fallback when a specific map below is absent.
    /// Absent and present-but-empty differ: an empty `endCaptures` mapping
    /// suppresses the fallback rather than triggering it.
    pub captures: Option<Captures>,
    pub begin_captures: Option<Captures>,
    pub end_captures: Option<Captures>,
    /// Patterns active inside the region
    pub patterns: Vec<Pattern>,
    /// When set, the synthesized pop rule goes after the nested patterns
    /// instead of before them
    pub apply_end_pattern_last: bool,
    pub comment: Option<String>,
}

/// A reference to another context: `#name`, `$self`, `$base`, an external
/// scope or `scope#rule`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludePattern {
    pub include: String,
}

/// Patterns are classified by which keys they carry, in this order: `begin`
/// wins over `match`, `match` wins over `include`. Anything else is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    BeginEnd(BeginEndPattern),
    Match(MatchPattern),
    Include(IncludePattern),
}

/// A whole grammar, with the repository normalized so every entry is a plain
/// pattern list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    pub name: Option<String>,
    pub scope_name: Option<String>,
    pub comment: Option<String>,
    pub first_line_match: Option<String>,
    /// `Some(vec![])` and `None` emit differently (`file_extensions: []`
    /// versus no key), so presence is preserved
    pub file_types: Option<Vec<String>>,
    /// From `hidden`, falling back to the older `hideFromUser` key
    pub hidden: Option<bool>,
    pub patterns: Vec<Pattern>,
    pub repository: BTreeMap<String, Vec<Pattern>>,
}

impl Grammar {
    pub fn from_value(root: &Value) -> SublimateResult<Grammar> {
        if root.as_mapping().is_none() {
            return Err(Error::InvalidGrammar("the grammar root is not a mapping".to_string()));
        }
        let patterns = match root.get("patterns") {
            Some(value) => patterns_from_value(value)?,
            None => Vec::new(),
        };
        let repository = match root.get("repository") {
            Some(value) => repository_from_value(value)?,
            None => BTreeMap::new(),
        };
        Ok(Grammar {
            name: optional_string(root, "name")?,
            scope_name: optional_string(root, "scopeName")?,
            comment: optional_string(root, "comment")?,
            first_line_match: optional_string(root, "firstLineMatch")?,
            file_types: file_types_from_value(root)?,
            hidden: hidden_flag(root),
            patterns,
            repository,
        })
    }
}

fn pattern_from_value(value: &Value) -> SublimateResult<Pattern> {
    let Some(entries) = value.as_mapping() else {
        return Err(Error::InvalidGrammar("pattern is not a mapping".to_string()));
    };
    if value.get("begin").is_some() {
        begin_end_from_value(value)
    } else if value.get("match").is_some() {
        Ok(Pattern::Match(MatchPattern {
            name: optional_string(value, "name")?,
            match_: string_entry(value, "match")?,
            captures: optional_captures(value, "captures")?.unwrap_or_default(),
            comment: optional_string(value, "comment")?,
        }))
    } else if value.get("include").is_some() {
        Ok(Pattern::Include(IncludePattern { include: string_entry(value, "include")? }))
    } else {
        let keys: Vec<&str> = entries.keys().filter_map(Key::as_str).collect();
        Err(Error::UnknownPatternType(keys.join(", ")))
    }
}

fn begin_end_from_value(value: &Value) -> SublimateResult<Pattern> {
    if value.get("while").is_some() {
        return Err(Error::InvalidGrammar(
            "begin/while patterns cannot be represented".to_string(),
        ));
    }
    if value.get("end").is_none() {
        return Err(Error::InvalidGrammar("begin pattern without an end regex".to_string()));
    }
    Ok(Pattern::BeginEnd(BeginEndPattern {
        name: optional_string(value, "name")?,
        content_name: optional_string(value, "contentName")?,
        begin: string_entry(value, "begin")?,
        end: string_entry(value, "end")?,
        captures: optional_captures(value, "captures")?,
        begin_captures: optional_captures(value, "beginCaptures")?,
        end_captures: optional_captures(value, "endCaptures")?,
        patterns: nested_patterns(value)?,
        apply_end_pattern_last: value.get("applyEndPatternLast").is_some_and(truthy),
        comment: optional_string(value, "comment")?,
    }))
}

fn patterns_from_value(value: &Value) -> SublimateResult<Vec<Pattern>> {
    let Some(items) = value.as_sequence() else {
        return Err(Error::InvalidGrammar("expected a list for 'patterns'".to_string()));
    };
    items.iter().map(pattern_from_value).collect()
}

fn nested_patterns(node: &Value) -> SublimateResult<Vec<Pattern>> {
    match node.get("patterns") {
        Some(value) => patterns_from_value(value),
        None => Ok(Vec::new()),
    }
}

/// Repository entries come in two shapes: a pattern (it carries `begin` or
/// `match`) or a group of patterns. Both normalize to a pattern list; a
/// group without a `patterns` key is an empty one.
fn repository_from_value(value: &Value) -> SublimateResult<BTreeMap<String, Vec<Pattern>>> {
    let Some(entries) = value.as_mapping() else {
        return Err(Error::InvalidGrammar("expected a mapping for 'repository'".to_string()));
    };
    let mut repository = BTreeMap::new();
    for (name, entry) in entries {
        if entry.as_mapping().is_none() {
            return Err(Error::InvalidGrammar(format!(
                "repository entry '{}' is not a mapping",
                name
            )));
        }
        let patterns = if entry.get("begin").is_some() || entry.get("match").is_some() {
            vec![pattern_from_value(entry)?]
        } else {
            nested_patterns(entry)?
        };
        repository.insert(name.to_string(), patterns);
    }
    Ok(repository)
}

fn optional_captures(node: &Value, key: &str) -> SublimateResult<Option<Captures>> {
    let Some(value) = node.get(key) else {
        return Ok(None);
    };
    let Some(entries) = value.as_mapping() else {
        return Err(Error::InvalidGrammar(format!("expected a mapping for '{}'", key)));
    };
    let mut captures = Captures::new();
    for (group, entry) in entries {
        if entry.as_mapping().is_none() {
            return Err(Error::InvalidGrammar(format!(
                "capture '{}' in '{}' is not a mapping",
                group, key
            )));
        }
        captures.insert(group.to_string(), Capture { name: optional_string(entry, "name")? });
    }
    Ok(Some(captures))
}

fn file_types_from_value(root: &Value) -> SublimateResult<Option<Vec<String>>> {
    let Some(value) = root.get("fileTypes") else {
        return Ok(None);
    };
    let Some(items) = value.as_sequence() else {
        return Err(Error::InvalidGrammar("expected a list for 'fileTypes'".to_string()));
    };
    let mut file_types = Vec::with_capacity(items.len());
    for item in items {
        let Some(text) = item.as_str() else {
            return Err(Error::InvalidGrammar("expected strings in 'fileTypes'".to_string()));
        };
        file_types.push(text.to_string());
    }
    Ok(Some(file_types))
}

fn hidden_flag(root: &Value) -> Option<bool> {
    let value = root.get("hidden").or_else(|| root.get("hideFromUser"))?;
    Some(truthy(value))
}

// `applyEndPatternLast` is written as 1, true, 0 or false in the wild.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Int(number) => *number != 0,
        _ => false,
    }
}

fn optional_string(node: &Value, key: &str) -> SublimateResult<Option<String>> {
    match node.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(Error::InvalidGrammar(format!("expected a string for '{}'", key))),
    }
}

fn string_entry(node: &Value, key: &str) -> SublimateResult<String> {
    optional_string(node, key)?
        .ok_or_else(|| Error::InvalidGrammar(format!("missing '{}'", key)))
}
