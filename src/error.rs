use std::fmt;
use std::io;

pub(crate) type SublimateResult<T> = Result<T, Error>;

/// Errors that abort a conversion.
///
/// Conditions a syntax can still be generated for (a capture without a scope
/// name, `\G` in a pop pattern, ...) are not errors; they are collected as
/// [`Diagnostic`](crate::Diagnostic)s and returned alongside the output.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred when reading a grammar file.
    Io(io::Error),

    /// JSON parsing failed when loading a grammar.
    Json(serde_json::Error),

    /// XML parsing failed when loading a property-list grammar.
    Xml(roxmltree::Error),

    /// The XML was well formed but is not a usable property list.
    InvalidPlist(String),

    /// A grammar node has the wrong shape: a non-mapping pattern, a
    /// non-string regex, a `begin` pattern without an `end`, ...
    InvalidGrammar(String),

    /// A pattern mapping carries none of `begin`, `match` or `include`.
    /// Holds the keys the pattern did have.
    UnknownPatternType(String),

    /// The repository defines an entry named `main`, which would collide
    /// with the context generated for the grammar's top-level patterns.
    MainContextRedefined,

    /// A `#name` include with no matching repository entry.
    MissingRepositoryEntry(String),

    /// A `$...` include directive other than `$self` or `$base`.
    UnknownInclude(String),

    /// An external include whose syntax or rule part starts with `#` or `$`.
    InvalidExternalSyntax(String),

    /// A multi-line string reached the emitter in a position where a block
    /// scalar cannot start.
    InlineMultilineString(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON parsing error: {}", err),
            Error::Xml(err) => write!(f, "XML parsing error: {}", err),
            Error::InvalidPlist(message) => write!(f, "invalid property list: {}", message),
            Error::InvalidGrammar(message) => write!(f, "invalid grammar: {}", message),
            Error::UnknownPatternType(keys) => {
                write!(f, "pattern is not a match, begin/end or include (keys: {})", keys)
            }
            Error::MainContextRedefined => {
                write!(f, "the repository must not define an entry named 'main'")
            }
            Error::MissingRepositoryEntry(name) => {
                write!(f, "include '#{}' has no matching repository entry", name)
            }
            Error::UnknownInclude(key) => write!(f, "unknown include directive '{}'", key),
            Error::InvalidExternalSyntax(key) => {
                write!(f, "invalid external syntax reference '{}'", key)
            }
            Error::InlineMultilineString(value) => {
                write!(f, "multi-line string in an inline position: {:?}", value)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Xml(err) => Some(err),
            Error::InvalidPlist(_)
            | Error::InvalidGrammar(_)
            | Error::UnknownPatternType(_)
            | Error::MainContextRedefined
            | Error::MissingRepositoryEntry(_)
            | Error::UnknownInclude(_)
            | Error::InvalidExternalSyntax(_)
            | Error::InlineMultilineString(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Xml(err)
    }
}
