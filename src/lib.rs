mod error;
mod grammar;
mod plist;
mod value;

mod convert;
mod diagnostics;
mod format;
mod rules;
mod yaml;

pub use convert::{Conversion, convert, convert_grammar};
pub use diagnostics::Diagnostic;
pub use error::Error;
pub use grammar::{
    BeginEndPattern, Capture, Captures, Grammar, IncludePattern, MatchPattern, Pattern,
};
pub use plist::parse_plist;
pub use value::{Key, Value};
pub use yaml::to_yaml;
