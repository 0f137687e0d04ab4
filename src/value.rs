use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::SublimateResult;

/// A mapping key.
///
/// Capture maps are keyed by group index, everything else by name. Numeric
/// keys are emitted without quotes and sort numerically ahead of all string
/// keys, so `10` lands after `2` rather than after `1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Num(u32),
    Str(String),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Num(_) => None,
        }
    }
}

impl From<u32> for Key {
    fn from(index: u32) -> Self {
        Key::Num(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Str(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Str(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Num(index) => write!(f, "{index}"),
            Key::Str(name) => f.write_str(name),
        }
    }
}

/// The value tree shared by the grammar loaders and the emitted syntax
/// document.
///
/// This is a closed union: TextMate grammars and `.sublime-syntax` files only
/// ever carry booleans, integers, strings, arrays and dictionaries, so there
/// is no float variant and the plist loader rejects anything else up front.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<Key, Value>),
}

impl Value {
    /// Parses a JSON document (a `.tmLanguage.json` grammar) into a value
    /// tree. All keys come back as [`Key::Str`]; capture indices are only
    /// turned into numeric keys once the conversion has classified them.
    pub fn from_json_str(source: &str) -> SublimateResult<Value> {
        Ok(serde_json::from_str(source)?)
    }

    /// Looks up `key` in a mapping. Returns `None` for non-mapping values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(entries) => entries.get(&Key::Str(key.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<Key, Value>> {
        match self {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<BTreeMap<Key, Value>> for Value {
    fn from(entries: BTreeMap<Key, Value>) -> Self {
        Value::Mapping(entries)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().collect())
    }
}

impl FromIterator<(Key, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Value::Mapping(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a boolean, integer, string, array or object")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        i64::try_from(value)
            .map(Value::Int)
            .map_err(|_| E::custom("integer value out of range"))
    }

    // Grammars only carry integral numbers (`applyEndPatternLast: 1`), but
    // JSON serializers occasionally write them as floats.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::Int(value as i64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.insert(Key::Str(key), value);
        }
        Ok(Value::Mapping(entries))
    }
}
