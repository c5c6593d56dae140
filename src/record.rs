//! # Record Module
//!
//! ## Purpose
//! Dynamic, dict-shaped case records with unpredictable nesting, represented
//! as a tagged variant tree instead of duck-typed structural inspection. The
//! engine only ever looks at the reachable text leaves; everything else is
//! carried through untouched for the caller to render.
//!
//! ## Input/Output Specification
//! - **Input**: JSON-shaped case objects from the data-loading collaborator
//! - **Output**: `Record` values with ordered fields and recursive traversal
//! - **Invariant**: field order is preserved exactly as loaded
//!
//! ## Key Features
//! - Tagged variant tree: text leaf | number | bool | null | sequence | record
//! - Recursive "collect all text leaves" traversal
//! - Structure-preserving text transforms (used by the highlighter)
//! - Serde support matching the original JSON shape

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single field value inside a case record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text leaf, the only variant the engine inspects
    Text(String),
    /// Numeric scalar, passed through unchanged
    Number(serde_json::Number),
    /// Boolean scalar, passed through unchanged
    Bool(bool),
    /// Null scalar, passed through unchanged
    Null,
    /// Ordered sequence of nested values
    Sequence(Vec<FieldValue>),
    /// Nested record
    Record(Record),
}

/// An ordered field-name → value mapping describing one case
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Insert a field, replacing any existing value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Look up a field and return it only if it is a text leaf
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Collect every reachable text leaf, depth-first in field order
    pub fn collect_text(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        for (_, value) in &self.fields {
            value.collect_text_into(&mut leaves);
        }
        leaves
    }

    /// Return a structurally identical record with every text leaf replaced
    /// by `transform(leaf)`
    pub fn map_text<F>(&self, transform: &F) -> Record
    where
        F: Fn(&str) -> String,
    {
        Record {
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.map_text(transform)))
                .collect(),
        }
    }

    /// Replace a single top-level text field via `transform`, leaving the
    /// record untouched when the field is absent or not text
    pub fn map_text_field<F>(&self, name: &str, transform: F) -> Record
    where
        F: Fn(&str) -> String,
    {
        let mut mapped = self.clone();
        if let Some(slot) = mapped.fields.iter_mut().find(|(k, _)| k == name) {
            if let FieldValue::Text(s) = &slot.1 {
                slot.1 = FieldValue::Text(transform(s));
            }
        }
        mapped
    }
}

impl FieldValue {
    fn collect_text_into<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        match self {
            FieldValue::Text(s) => leaves.push(s.as_str()),
            FieldValue::Sequence(items) => {
                for item in items {
                    item.collect_text_into(leaves);
                }
            }
            FieldValue::Record(record) => {
                for (_, value) in &record.fields {
                    value.collect_text_into(leaves);
                }
            }
            FieldValue::Number(_) | FieldValue::Bool(_) | FieldValue::Null => {}
        }
    }

    fn map_text<F>(&self, transform: &F) -> FieldValue
    where
        F: Fn(&str) -> String,
    {
        match self {
            FieldValue::Text(s) => FieldValue::Text(transform(s)),
            FieldValue::Sequence(items) => {
                FieldValue::Sequence(items.iter().map(|v| v.map_text(transform)).collect())
            }
            FieldValue::Record(record) => FieldValue::Record(record.map_text(transform)),
            other => other.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Record(record) => record.serialize(serializer),
        }
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON-shaped field value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<FieldValue, E> {
        Ok(serde_json::Number::from_f64(v)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Null))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<FieldValue, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<FieldValue, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(FieldValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<FieldValue, A::Error> {
        let mut record = Record::new();
        while let Some((key, value)) = map.next_entry::<String, FieldValue>()? {
            record.insert(key, value);
        }
        Ok(FieldValue::Record(record))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<FieldValue, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Record, D::Error> {
        match FieldValue::deserialize(deserializer)? {
            FieldValue::Record(record) => Ok(record),
            other => Err(de::Error::custom(format!(
                "expected a mapping, got {:?}",
                other
            ))),
        }
    }
}
