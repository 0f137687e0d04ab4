use std::fmt;

/// A recoverable problem found while converting a grammar.
///
/// None of these stop the conversion; the affected construct is dropped or
/// passed through and the syntax is still generated. Callers decide what to
/// do with them; the bundled CLI prints each one to stderr as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A capture entry has no `name` key. TextMate allows nested `patterns`
    /// inside captures; the target format cannot express that, so the entry
    /// is dropped.
    CaptureWithoutScope { group: String },

    /// A capture map is keyed by something other than a group index. The
    /// entry is kept under its literal name, but the generated syntax will
    /// not match it up with a group.
    NamedCaptureGroup { name: String },

    /// The end regex of a begin/end pattern contains `\G`. In the source
    /// grammar that anchor usually refers back to where the begin regex
    /// matched, which is not where it points after conversion.
    AnchorInPopPattern { regex: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CaptureWithoutScope { group } => {
                write!(
                    f,
                    "patterns and includes are not supported within captures: group '{}' was dropped",
                    group
                )
            }
            Diagnostic::NamedCaptureGroup { name } => {
                write!(f, "named capture group '{}' used, this is unsupported", name)
            }
            Diagnostic::AnchorInPopPattern { regex } => {
                write!(
                    f,
                    "pop pattern contains \\G, this will not work as expected if it is \
                     intended to refer to the begin regex: {}",
                    regex
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_construct() {
        let diagnostic = Diagnostic::CaptureWithoutScope { group: "2".to_string() };
        assert_eq!(
            diagnostic.to_string(),
            "patterns and includes are not supported within captures: group '2' was dropped"
        );

        let diagnostic = Diagnostic::NamedCaptureGroup { name: "path".to_string() };
        assert_eq!(
            diagnostic.to_string(),
            "named capture group 'path' used, this is unsupported"
        );

        let diagnostic = Diagnostic::AnchorInPopPattern { regex: "\\G\\)".to_string() };
        assert!(diagnostic.to_string().contains("begin regex: \\G\\)"));
    }
}
