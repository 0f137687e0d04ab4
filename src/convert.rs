//! Grammar to syntax conversion.
//!
//! The conversion is a pure fold over the projected grammar: every TextMate
//! pattern lowers into a [`Rule`], begin/end regions become push/pop rule
//! pairs with meta-scope markers, and the repository becomes one named
//! context per entry next to `main`. Anything recoverable lands in the
//! diagnostics list; anything that would produce a broken syntax is an
//! [`Error`].

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::Diagnostic;
use crate::error::{Error, SublimateResult};
use crate::format::{dedent_regex, format_comment};
use crate::grammar::{BeginEndPattern, Captures, Grammar, MatchPattern, Pattern};
use crate::rules::{CaptureMap, Context, Rule, context_to_value};
use crate::value::{Key, Value};

/// A finished conversion: the syntax document plus everything worth warning
/// about.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub syntax: Value,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Renders the syntax as a `.sublime-syntax` document.
    pub fn to_yaml(&self) -> SublimateResult<String> {
        crate::yaml::to_yaml(&self.syntax)
    }
}

/// Converts a loaded grammar value tree into a syntax document.
pub fn convert(grammar: &Value) -> SublimateResult<Conversion> {
    convert_grammar(&Grammar::from_value(grammar)?)
}

/// Converts an already projected [`Grammar`].
pub fn convert_grammar(grammar: &Grammar) -> SublimateResult<Conversion> {
    let mut converter = Converter {
        repository_keys: grammar.repository.keys().cloned().collect(),
        diagnostics: Vec::new(),
    };
    let syntax = converter.document(grammar)?;
    Ok(Conversion { syntax, diagnostics: converter.diagnostics })
}

struct Converter {
    repository_keys: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Converter {
    fn document(&mut self, grammar: &Grammar) -> SublimateResult<Value> {
        let mut syntax = BTreeMap::new();
        if let Some(comment) = nonempty_comment(grammar.comment.as_deref()) {
            syntax.insert(Key::from("comment"), Value::from(comment));
        }
        if let Some(first_line) = &grammar.first_line_match {
            syntax.insert(Key::from("first_line_match"), Value::from(dedent_regex(first_line)));
        }
        if let Some(name) = &grammar.name {
            syntax.insert(Key::from("name"), Value::from(name.as_str()));
        }
        if let Some(scope) = &grammar.scope_name {
            syntax.insert(Key::from("scope"), Value::from(scope.as_str()));
        }
        if let Some(file_types) = &grammar.file_types {
            let extensions = file_types.iter().map(|ext| Value::from(ext.as_str())).collect();
            syntax.insert(Key::from("file_extensions"), extensions);
        }
        if let Some(hidden) = grammar.hidden {
            syntax.insert(Key::from("hidden"), Value::from(hidden));
        }
        syntax.insert(Key::from("contexts"), self.contexts(grammar)?);
        Ok(Value::Mapping(syntax))
    }

    /// `main` holds the grammar's top-level patterns; every repository entry
    /// becomes a context under its own name, which is why none of them may
    /// be called `main`.
    fn contexts(&mut self, grammar: &Grammar) -> SublimateResult<Value> {
        let mut contexts = BTreeMap::new();
        #[cfg(feature = "debug")]
        log::debug!("compiling main context from {} patterns", grammar.patterns.len());
        contexts.insert(Key::from("main"), context_to_value(&self.context(&grammar.patterns)?));
        for (name, patterns) in &grammar.repository {
            if name == "main" {
                return Err(Error::MainContextRedefined);
            }
            #[cfg(feature = "debug")]
            log::debug!("compiling context '{}' from {} patterns", name, patterns.len());
            let context = self.context(patterns)?;
            contexts.insert(Key::from(name.as_str()), context_to_value(&context));
        }
        Ok(Value::Mapping(contexts))
    }

    fn context(&mut self, patterns: &[Pattern]) -> SublimateResult<Context> {
        let mut rules = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let rule = match pattern {
                Pattern::BeginEnd(region) => self.begin_end_rule(region)?,
                Pattern::Match(single) => self.match_rule(single),
                Pattern::Include(include) => {
                    Rule::Include(self.resolve_include(&include.include)?)
                }
            };
            rules.push(rule);
        }
        Ok(rules)
    }

    fn match_rule(&mut self, pattern: &MatchPattern) -> Rule {
        let (captures, whole_match) = self.format_captures(&pattern.captures);
        Rule::Match {
            match_: dedent_regex(&pattern.match_),
            // The pattern's own name wins over a scope from capture group 0.
            scope: pattern.name.clone().or(whole_match),
            captures,
            comment: nonempty_comment(pattern.comment.as_deref()),
        }
    }

    /// A begin/end region becomes a push rule whose nested context holds the
    /// meta-scope markers, a synthesized pop rule for the end regex and the
    /// compiled nested patterns. The pop rule leads the context so the
    /// region can close anywhere, unless `applyEndPatternLast` asks for the
    /// nested patterns to get the first shot.
    fn begin_end_rule(&mut self, pattern: &BeginEndPattern) -> SublimateResult<Rule> {
        let (begin_captures, begin_scope) =
            self.effective_captures(&pattern.begin_captures, &pattern.captures);
        let (end_captures, end_scope) =
            self.effective_captures(&pattern.end_captures, &pattern.captures);

        let end_match = dedent_regex(&pattern.end);
        if end_match.contains("\\G") {
            self.diagnostics.push(Diagnostic::AnchorInPopPattern { regex: end_match.clone() });
        }
        let pop = Rule::Pop { match_: end_match, scope: end_scope, captures: end_captures };

        let mut child = self.context(&pattern.patterns)?;
        if pattern.apply_end_pattern_last {
            child.push(pop);
        } else {
            child.insert(0, pop);
        }
        if let Some(content_name) = &pattern.content_name {
            child.insert(0, Rule::MetaContentScope(content_name.clone()));
        }
        if let Some(name) = &pattern.name {
            child.insert(0, Rule::MetaScope(name.clone()));
        }

        Ok(Rule::Push {
            match_: dedent_regex(&pattern.begin),
            scope: begin_scope,
            captures: begin_captures,
            comment: nonempty_comment(pattern.comment.as_deref()),
            push: child,
        })
    }

    /// Formats the side-specific captures, falling back to the shared map
    /// only when the specific one is absent; an explicitly empty
    /// `endCaptures` suppresses the fallback.
    fn effective_captures(
        &mut self,
        specific: &Option<Captures>,
        shared: &Option<Captures>,
    ) -> (CaptureMap, Option<String>) {
        match specific.as_ref().or(shared.as_ref()) {
            Some(captures) => self.format_captures(captures),
            None => (CaptureMap::new(), None),
        }
    }

    /// Classifies capture keys and pulls out group 0, which scopes the whole
    /// match and has no place in the emitted capture map.
    fn format_captures(&mut self, captures: &Captures) -> (CaptureMap, Option<String>) {
        let mut formatted = CaptureMap::new();
        for (group, capture) in captures {
            let Some(scope) = &capture.name else {
                self.diagnostics.push(Diagnostic::CaptureWithoutScope { group: group.clone() });
                continue;
            };
            match group.parse::<u32>() {
                Ok(index) => {
                    formatted.insert(Key::Num(index), scope.clone());
                }
                Err(_) => {
                    self.diagnostics
                        .push(Diagnostic::NamedCaptureGroup { name: group.clone() });
                    formatted.insert(Key::Str(group.clone()), scope.clone());
                }
            }
        }
        let whole_match = formatted.remove(&Key::Num(0));
        (formatted, whole_match)
    }

    fn resolve_include(&self, include: &str) -> SublimateResult<String> {
        if let Some(name) = include.strip_prefix('#') {
            if !self.repository_keys.contains(name) {
                return Err(Error::MissingRepositoryEntry(name.to_string()));
            }
            return Ok(name.to_string());
        }
        match include {
            "$self" => Ok("main".to_string()),
            // Left for the tool that loads the generated syntax to resolve;
            // nothing here knows what the top-level grammar will be.
            "$base" => Ok("$top_level_main".to_string()),
            _ if include.starts_with('$') => Err(Error::UnknownInclude(include.to_string())),
            _ => format_external_syntax(include),
        }
    }
}

/// `source.js#expression` becomes `scope:source.js#expression` and a plain
/// scope becomes `scope:source.js`. Only the first `#` splits; any further
/// ones stay in the rule part.
fn format_external_syntax(include: &str) -> SublimateResult<String> {
    match include.split_once('#') {
        Some((syntax, rule)) => {
            if starts_with_directive(syntax) || starts_with_directive(rule) {
                return Err(Error::InvalidExternalSyntax(include.to_string()));
            }
            Ok(format!("scope:{}#{}", syntax, rule))
        }
        None => {
            if starts_with_directive(include) {
                return Err(Error::InvalidExternalSyntax(include.to_string()));
            }
            Ok(format!("scope:{}", include))
        }
    }
}

fn starts_with_directive(part: &str) -> bool {
    part.starts_with('#') || part.starts_with('$')
}

fn nonempty_comment(comment: Option<&str>) -> Option<String> {
    let formatted = format_comment(comment?);
    if formatted.is_empty() { None } else { Some(formatted) }
}
