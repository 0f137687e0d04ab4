use criterion::{Criterion, criterion_group, criterion_main};
use sublimate::{Value, convert, parse_plist};

const C_GRAMMAR: &str = r##"{
  "name": "C",
  "scopeName": "source.c",
  "fileTypes": ["c", "h"],
  "patterns": [
    {"include": "#comments"},
    {"include": "#strings"},
    {"include": "#numbers"},
    {"include": "#keywords"},
    {"include": "#preprocessor"}
  ],
  "repository": {
    "comments": {
      "patterns": [
        {"name": "comment.line.double-slash.c", "match": "//.*$"},
        {"name": "comment.block.c", "begin": "/\\*", "end": "\\*/"}
      ]
    },
    "strings": {
      "name": "string.quoted.double.c",
      "begin": "\"",
      "end": "\"",
      "patterns": [
        {"name": "constant.character.escape.c", "match": "\\\\."}
      ]
    },
    "numbers": {
      "match": "\\b(?:0[xX][0-9a-fA-F]+|[0-9]+)\\b",
      "name": "constant.numeric.c"
    },
    "keywords": {
      "match": "\\b(if|else|while|for|return|break|continue|switch|case|default)\\b",
      "name": "keyword.control.c"
    },
    "preprocessor": {
      "name": "meta.preprocessor.c",
      "begin": "^\\s*#\\s*(define|include|if|ifdef|ifndef|endif)\\b",
      "end": "$",
      "beginCaptures": {"1": {"name": "keyword.control.import.c"}}
    }
  }
}"##;

const INI_GRAMMAR: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>name</key>
  <string>Ini</string>
  <key>scopeName</key>
  <string>source.ini</string>
  <key>fileTypes</key>
  <array>
    <string>ini</string>
    <string>conf</string>
  </array>
  <key>patterns</key>
  <array>
    <dict>
      <key>match</key>
      <string>^\s*[;#].*$</string>
      <key>name</key>
      <string>comment.line.ini</string>
    </dict>
    <dict>
      <key>begin</key>
      <string>^\s*\[</string>
      <key>end</key>
      <string>\]</string>
      <key>name</key>
      <string>entity.name.section.ini</string>
    </dict>
  </array>
</dict>
</plist>
"##;

fn convert_benchmark(c: &mut Criterion) {
    // Parse once; the conversion itself is what gets measured
    let grammar = Value::from_json_str(C_GRAMMAR).expect("Failed to parse the embedded grammar");

    c.bench_function("convert c grammar", |b| {
        b.iter(|| {
            let conversion = convert(&grammar).unwrap();
            std::hint::black_box(conversion);
        })
    });
}

fn render_benchmark(c: &mut Criterion) {
    let grammar = Value::from_json_str(C_GRAMMAR).unwrap();
    let conversion = convert(&grammar).unwrap();

    c.bench_function("render c syntax", |b| {
        b.iter(|| {
            let yaml = conversion.to_yaml().unwrap();
            std::hint::black_box(yaml);
        })
    });
}

fn parse_plist_benchmark(c: &mut Criterion) {
    c.bench_function("parse ini plist", |b| {
        b.iter(|| {
            let grammar = parse_plist(INI_GRAMMAR).unwrap();
            std::hint::black_box(grammar);
        })
    });
}

criterion_group!(benches, convert_benchmark, render_benchmark, parse_plist_benchmark);
criterion_main!(benches);
