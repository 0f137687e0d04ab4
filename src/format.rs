//! Text formatting for regexes and comments carried over from a grammar.
//!
//! Grammar authors write long regexes as indented multi-line blocks. The
//! indentation is part of the plist string but not part of the regex, so it
//! is stripped before the regex is re-emitted as a block scalar.

/// Splits on `\n` and drops trailing empty segments, so `"a\nb\n\n"` becomes
/// `["a", "b"]`. The emitter relies on the same behavior for block scalars.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Removes the common indentation from a multi-line regex source.
///
/// The common indent is computed from the second line onward: it is the
/// longest prefix shared by every line's leading whitespace, and collapses to
/// nothing as soon as two lines disagree (tabs vs spaces) or a line is empty.
/// Single-line regexes pass through untouched.
pub(crate) fn dedent_regex(source: &str) -> String {
    if !source.contains('\n') {
        return source.to_string();
    }
    let lines = split_lines(source);
    if lines.is_empty() {
        return String::new();
    }

    let indent = if lines.len() > 1 {
        let mut indent = leading_whitespace(lines[1]);
        for line in &lines[2..] {
            let current = leading_whitespace(line);
            if !current.starts_with(indent) {
                indent = if indent.starts_with(current) { current } else { "" };
            }
        }
        indent
    } else {
        leading_whitespace(lines[0])
    };

    let width = indent.len();
    let mut dedented = Vec::with_capacity(lines.len());
    // The first line starts right after the key in typical grammar sources
    // and rarely carries the indent the rest of the block has, so it is
    // stripped of its own leading whitespace instead.
    if lines[0].starts_with(indent) {
        dedented.push(lines[0].get(width..).unwrap_or(""));
    } else {
        dedented.push(lines[0].trim_start());
    }
    for line in &lines[1..] {
        dedented.push(line.get(width..).unwrap_or(""));
    }
    dedented.join("\n").trim_end().to_string()
}

/// Normalizes a grammar comment: surrounding whitespace is trimmed, tabs
/// become four spaces and multi-line comments get a trailing newline so they
/// are emitted as `|` block scalars.
pub(crate) fn format_comment(source: &str) -> String {
    let mut comment = source.trim().replace('\t', "    ");
    if comment.contains('\n') {
        comment.push('\n');
    }
    comment
}
