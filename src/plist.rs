use std::collections::BTreeMap;

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Error, SublimateResult};
use crate::value::{Key, Value};

/// Parses an XML property list (a `.tmLanguage` file) into a [`Value`] tree.
///
/// Only the plist subset TextMate grammars use is accepted: `<dict>`,
/// `<array>`, `<string>`, `<integer>` and the boolean elements. `<real>`,
/// `<data>` and `<date>` have no place in a grammar, so running into one
/// means the input is not a grammar and parsing stops with an error.
pub fn parse_plist(source: &str) -> SublimateResult<Value> {
    // Grammar plists ship with a `<!DOCTYPE plist ...>` header, which
    // roxmltree refuses unless DTD parsing is switched on.
    let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    let document = Document::parse_with_options(source, options)?;
    let root = document.root_element();
    if root.tag_name().name() != "plist" {
        return Err(Error::InvalidPlist(format!(
            "expected a <plist> root element, found <{}>",
            root.tag_name().name()
        )));
    }
    let payload = root
        .children()
        .find(|node| node.is_element())
        .ok_or_else(|| Error::InvalidPlist("the <plist> element is empty".to_string()))?;
    convert_node(payload)
}

fn convert_node(node: Node<'_, '_>) -> SublimateResult<Value> {
    match node.tag_name().name() {
        "dict" => convert_dict(node),
        "array" => {
            let mut items = Vec::new();
            for child in node.children().filter(|n| n.is_element()) {
                items.push(convert_node(child)?);
            }
            Ok(Value::Sequence(items))
        }
        "string" => Ok(Value::String(element_text(node))),
        "integer" => {
            let text = element_text(node);
            text.trim()
                .parse()
                .map(Value::Int)
                .map_err(|_| Error::InvalidPlist(format!("invalid <integer> value '{}'", text)))
        }
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(Error::InvalidPlist(format!("unsupported element <{}>", other))),
    }
}

fn convert_dict(node: Node<'_, '_>) -> SublimateResult<Value> {
    let mut entries = BTreeMap::new();
    let mut pending_key: Option<String> = None;
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "key" {
            if let Some(orphan) = pending_key.replace(element_text(child)) {
                return Err(Error::InvalidPlist(format!("<key>{}</key> has no value", orphan)));
            }
        } else {
            match pending_key.take() {
                Some(key) => {
                    entries.insert(Key::Str(key), convert_node(child)?);
                }
                None => {
                    return Err(Error::InvalidPlist(format!(
                        "<{}> element without a preceding <key>",
                        child.tag_name().name()
                    )));
                }
            }
        }
    }
    if let Some(orphan) = pending_key {
        return Err(Error::InvalidPlist(format!("<key>{}</key> has no value", orphan)));
    }
    Ok(Value::Mapping(entries))
}

// Concatenates the text children, so CDATA sections and entity-split text
// come back as one string.
fn element_text(node: Node<'_, '_>) -> String {
    node.children().filter(|n| n.is_text()).filter_map(|n| n.text()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMMAR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>name</key>
	<string>Test &amp; Co</string>
	<key>hideFromUser</key>
	<true/>
	<key>fileTypes</key>
	<array>
		<string>t</string>
		<string>tst</string>
	</array>
	<key>patterns</key>
	<array>
		<dict>
			<key>match</key>
			<string>a|b</string>
			<key>applyEndPatternLast</key>
			<integer>1</integer>
		</dict>
	</array>
</dict>
</plist>
"#;

    #[test]
    fn parses_a_grammar_plist() {
        let value = parse_plist(GRAMMAR).unwrap();
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Test & Co"));
        assert_eq!(value.get("hideFromUser").and_then(Value::as_bool), Some(true));

        let file_types = value.get("fileTypes").and_then(Value::as_sequence).unwrap();
        assert_eq!(file_types.len(), 2);
        assert_eq!(file_types[1].as_str(), Some("tst"));

        let patterns = value.get("patterns").and_then(Value::as_sequence).unwrap();
        assert_eq!(patterns[0].get("match").and_then(Value::as_str), Some("a|b"));
        assert_eq!(patterns[0].get("applyEndPatternLast").and_then(Value::as_int), Some(1));
    }

    #[test]
    fn multi_line_strings_keep_their_newlines() {
        let value = parse_plist(
            "<plist><dict><key>begin</key><string>(?x)\n  foo\n</string></dict></plist>",
        )
        .unwrap();
        assert_eq!(value.get("begin").and_then(Value::as_str), Some("(?x)\n  foo\n"));
    }

    #[test]
    fn empty_dict_and_empty_string() {
        let value = parse_plist("<plist><dict/></plist>").unwrap();
        assert_eq!(value, Value::Mapping(BTreeMap::new()));

        let value = parse_plist("<plist><string></string></plist>").unwrap();
        assert_eq!(value.as_str(), Some(""));
    }

    #[test]
    fn rejects_unsupported_scalar_elements() {
        let err = parse_plist("<plist><dict><key>x</key><real>1.5</real></dict></plist>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPlist(_)), "{err}");
    }

    #[test]
    fn rejects_a_value_without_a_key() {
        let err = parse_plist("<plist><dict><string>orphan</string></dict></plist>").unwrap_err();
        assert!(matches!(err, Error::InvalidPlist(_)), "{err}");
    }

    #[test]
    fn rejects_a_trailing_key_without_a_value() {
        let err = parse_plist("<plist><dict><key>last</key></dict></plist>").unwrap_err();
        assert!(err.to_string().contains("last"), "{err}");
    }

    #[test]
    fn rejects_non_plist_roots_and_broken_xml() {
        assert!(matches!(parse_plist("<dict/>"), Err(Error::InvalidPlist(_))));
        assert!(matches!(parse_plist("<plist><dict>"), Err(Error::Xml(_))));
        assert!(matches!(parse_plist("<plist></plist>"), Err(Error::InvalidPlist(_))));
    }

    #[test]
    fn bad_integer_text_is_reported() {
        let err =
            parse_plist("<plist><dict><key>n</key><integer>one</integer></dict></plist>")
                .unwrap_err();
        assert!(err.to_string().contains("one"), "{err}");
    }
}
