//! The `.sublime-syntax` YAML emitter.
//!
//! This is not a general YAML writer. It produces exactly the dialect the
//! target tool reads back: a fixed header, block-style sequences and
//! mappings, a small scalar quoting policy and `|`/`|-` literals for
//! multi-line strings. The output formatting is a contract: generated files
//! are diffed and checked into version control, so every byte matters.

use std::collections::BTreeMap;

use crate::error::{Error, SublimateResult};
use crate::format::split_lines;
use crate::value::{Key, Value};

const TAB_SIZE: usize = 2;

/// Keys that are pulled to the front of every mapping, processed back to
/// front. The repeats are deliberate: a key listed twice is pulled forward a
/// second time, which is what places `match` ahead of `comment` in rules and
/// `main` ahead of `scope` among context names.
const KEY_ORDER: [&str; 10] = [
    "name",
    "main",
    "match",
    "comment",
    "file_extensions",
    "first_line_match",
    "hidden",
    "match",
    "scope",
    "main",
];

/// Renders a value tree as a `.sublime-syntax` document, header included.
///
/// The only error condition is a multi-line string in a position where a
/// block scalar cannot start (directly inside a sequence item); the
/// conversion never produces one, but the emitter is public and checks.
pub fn to_yaml(value: &Value) -> SublimateResult<String> {
    emit(value, false, 0)
}

/// `start_block_on_newline` is true when the value follows a `key: ` and a
/// nested block must open on the next line.
fn emit(value: &Value, start_block_on_newline: bool, indent: usize) -> SublimateResult<String> {
    let mut out = String::new();
    if indent == 0 {
        out.push_str("%YAML 1.2\n---\n");
        out.push_str("# http://www.sublimetext.com/docs/3/syntax.html\n");
    }

    match value {
        Value::Sequence(items) => emit_sequence(&mut out, items, start_block_on_newline, indent)?,
        Value::Mapping(entries) => emit_mapping(&mut out, entries, start_block_on_newline, indent)?,
        Value::String(text) => emit_string(&mut out, text, start_block_on_newline, indent)?,
        Value::Bool(flag) => out.push_str(if *flag { "true\n" } else { "false\n" }),
        Value::Int(number) => {
            out.push_str(&number.to_string());
            out.push('\n');
        }
        Value::Null => out.push('\n'),
    }

    // Emission leaves trailing whitespace behind ("key: " followed by a
    // nested block); strip it on the way out of every level.
    Ok(strip_trailing_whitespace(&out))
}

fn emit_sequence(
    out: &mut String,
    items: &[Value],
    start_block_on_newline: bool,
    indent: usize,
) -> SublimateResult<()> {
    if items.is_empty() {
        out.push_str("[]\n");
        return Ok(());
    }
    if start_block_on_newline {
        out.push('\n');
    }
    for item in items {
        push_indent(out, indent);
        out.push_str("- ");
        out.push_str(&emit(item, false, indent + TAB_SIZE)?);
    }
    Ok(())
}

fn emit_mapping(
    out: &mut String,
    entries: &BTreeMap<Key, Value>,
    start_block_on_newline: bool,
    indent: usize,
) -> SublimateResult<()> {
    if start_block_on_newline {
        out.push('\n');
    }
    let mut first = true;
    for (key, value) in order_entries(entries) {
        if !first || start_block_on_newline {
            push_indent(out, indent);
        } else {
            first = false;
        }
        match key {
            Key::Num(index) => out.push_str(&index.to_string()),
            Key::Str(name) if needs_quoting(name) => out.push_str(&quote(name)),
            Key::Str(name) => out.push_str(name),
        }
        out.push_str(": ");
        out.push_str(&emit(value, true, indent + TAB_SIZE)?);
    }
    Ok(())
}

fn emit_string(
    out: &mut String,
    text: &str,
    start_block_on_newline: bool,
    indent: usize,
) -> SublimateResult<()> {
    if !needs_quoting(text) {
        out.push_str(text);
        out.push('\n');
        return Ok(());
    }
    if text.contains('\n') {
        if !start_block_on_newline {
            return Err(Error::InlineMultilineString(text.to_string()));
        }
        out.push_str(if text.ends_with('\n') { "|\n" } else { "|-\n" });
        for line in split_lines(text) {
            push_indent(out, indent);
            out.push_str(line);
            out.push('\n');
        }
    } else {
        out.push_str(&quote(text));
        out.push('\n');
    }
    Ok(())
}

/// Sorted entries with the well-known keys pulled to the front.
fn order_entries(entries: &BTreeMap<Key, Value>) -> Vec<(&Key, &Value)> {
    let mut ordered: Vec<(&Key, &Value)> = entries.iter().collect();
    for name in KEY_ORDER.into_iter().rev() {
        if let Some(position) = ordered.iter().position(|(key, _)| key.as_str() == Some(name)) {
            let entry = ordered.remove(position);
            ordered.insert(0, entry);
        }
    }
    ordered
}

/// Whether a scalar can be written bare. The policy is conservative: it
/// quotes everything the YAML spec would trip over in this dialect plus the
/// digit-led and `=`-led scalars Sublime Text's loader is picky about.
fn needs_quoting(value: &str) -> bool {
    let (Some(first), Some(last)) = (value.chars().next(), value.chars().last()) else {
        // Empty strings are written as "".
        return true;
    };
    value.starts_with("<<")
        || "\"'%-:?@`&*!,#|>0123456789=".contains(first)
        || matches!(value, "true" | "false" | "null")
        || value.contains("# ")
        || value.contains(": ")
        || value.contains('[')
        || value.contains(']')
        || value.contains('{')
        || value.contains('}')
        || value.contains('\n')
        || ":#".contains(last)
        || value.trim() != value
}

/// Regexes are full of backslashes and double quotes, which single-quoted
/// scalars carry verbatim; everything else goes in double quotes, where
/// nothing is left that would need escaping.
fn quote(value: &str) -> String {
    if value.contains('\\') || value.contains('"') {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        format!("\"{}\"", value)
    }
}

fn strip_trailing_whitespace(out: &str) -> String {
    let lines: Vec<&str> = split_lines(out).into_iter().map(str::trim_end).collect();
    let mut cleaned = lines.join("\n");
    cleaned.push('\n');
    cleaned
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}
