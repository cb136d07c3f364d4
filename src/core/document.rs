//! core::document
//!
//! The loosely-typed configuration document tree.
//!
//! # Types
//!
//! - [`Document`] - An ordered map of string keys to [`Value`] nodes
//! - [`Value`] - One node: string, number, boolean, null, sequence, or object
//! - [`Number`] - Integer/float split so integers round-trip without a `.0`
//!
//! # Ordering
//!
//! Insertion order is preserved through load, edit, and save so that a
//! rewritten file diffs cleanly against its previous version. Equality is
//! order-insensitive: two documents with the same entries are equal no matter
//! how their keys are arranged.
//!
//! # Example
//!
//! ```
//! use carryover::core::document::{Document, Value};
//!
//! let doc = Document::from_yaml("bitcoind:\n  type: internal\n").unwrap();
//! let backend = doc.get("bitcoind").and_then(Value::as_object).unwrap();
//! assert_eq!(backend.get("type").and_then(Value::as_str), Some("internal"));
//! ```

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from document decoding and encoding.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("top level of the document must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    #[error("mapping keys must be strings, found {found}")]
    NonStringKey { found: &'static str },

    #[error("unsupported yaml tag '{tag}'")]
    UnsupportedTag { tag: String },
}

/// A numeric node.
///
/// The integer/float distinction matters only for faithful re-encoding;
/// documents in the wild mix channel sizes (integers) with fee allocations
/// (fractions).
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_yaml(number: &serde_yaml::Number) -> Self {
        if let Some(i) = number.as_i64() {
            Number::Int(i)
        } else if let Some(u) = number.as_u64() {
            // Beyond i64 range; keep the magnitude.
            Number::Float(u as f64)
        } else {
            Number::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Object(Document),
}

impl Value {
    /// The node's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// The persisted configuration tree: an insertion-ordered map with unique,
/// case-sensitive string keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Decode a YAML string into a document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML, a non-mapping top level, non-string keys,
    /// or YAML tags.
    pub fn from_yaml(input: &str) -> Result<Self, DocumentError> {
        let value: serde_yaml::Value = serde_yaml::from_str(input)?;
        Self::try_from(value)
    }

    /// Encode the document back to YAML, preserving key order.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        Ok(serde_yaml::to_string(&serde_yaml::Value::from(
            self.clone(),
        ))?)
    }

    /// A hex SHA-256 digest over the tree's structure and contents.
    ///
    /// An unchanged fingerprint across a migration means the chain was a
    /// structural no-op for this document.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hash_document(self, &mut hasher);
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a key, returning the previous value if any.
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a key, preserving the order of the remaining entries.
    /// Removing an absent key is a no-op that returns `None`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    fn from_mapping(mapping: serde_yaml::Mapping) -> Result<Self, DocumentError> {
        let mut doc = Document::new();
        for (key, value) in mapping {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                other => {
                    return Err(DocumentError::NonStringKey {
                        found: yaml_kind_name(&other),
                    })
                }
            };
            doc.insert(key, Value::try_from(value)?);
        }
        Ok(doc)
    }
}

fn yaml_kind_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = DocumentError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => Value::Number(Number::from_yaml(&n)),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => Value::Object(Document::from_mapping(mapping)?),
            serde_yaml::Value::Tagged(tagged) => {
                return Err(DocumentError::UnsupportedTag {
                    tag: tagged.tag.to_string(),
                })
            }
        })
    }
}

impl TryFrom<serde_yaml::Value> for Document {
    type Error = DocumentError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        match value {
            serde_yaml::Value::Mapping(mapping) => Self::from_mapping(mapping),
            other => Err(DocumentError::NotAMapping {
                found: yaml_kind_name(&other),
            }),
        }
    }
}

impl From<Value> for serde_yaml::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_yaml::Value::Null,
            Value::Bool(b) => serde_yaml::Value::Bool(b),
            Value::Number(Number::Int(i)) => serde_yaml::Value::Number(i.into()),
            Value::Number(Number::Float(f)) => serde_yaml::Value::Number(f.into()),
            Value::String(s) => serde_yaml::Value::String(s),
            Value::Sequence(items) => {
                serde_yaml::Value::Sequence(items.into_iter().map(Into::into).collect())
            }
            Value::Object(doc) => serde_yaml::Value::from(doc),
        }
    }
}

impl From<Document> for serde_yaml::Value {
    fn from(doc: Document) -> Self {
        let mapping: serde_yaml::Mapping = doc
            .0
            .into_iter()
            .map(|(key, value)| (serde_yaml::Value::String(key), value.into()))
            .collect();
        serde_yaml::Value::Mapping(mapping)
    }
}

fn hash_document(doc: &Document, hasher: &mut Sha256) {
    hasher.update([b'{']);
    for (key, value) in doc.iter() {
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key.as_bytes());
        hash_value(value, hasher);
    }
    hasher.update([b'}']);
}

fn hash_value(value: &Value, hasher: &mut Sha256) {
    match value {
        Value::Null => hasher.update([0u8]),
        Value::Bool(b) => hasher.update([1u8, *b as u8]),
        Value::Number(Number::Int(i)) => {
            hasher.update([2u8]);
            hasher.update(i.to_be_bytes());
        }
        Value::Number(Number::Float(f)) => {
            hasher.update([3u8]);
            hasher.update(f.to_bits().to_be_bytes());
        }
        Value::String(s) => {
            hasher.update([4u8]);
            hasher.update((s.len() as u64).to_be_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Sequence(items) => {
            hasher.update([5u8]);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                hash_value(item, hasher);
            }
        }
        Value::Object(doc) => {
            hasher.update([6u8]);
            hash_document(doc, hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
alias: edge
color: '3399ff'
accept-keysend: true
min-chan-size: null
max-chan-size: 16777215
advanced:
  max-channel-fee-allocation: 0.5
";

    mod decoding {
        use super::*;

        #[test]
        fn decodes_scalars_and_nesting() {
            let doc = Document::from_yaml(SAMPLE).expect("decode");
            assert_eq!(doc.get("alias").and_then(Value::as_str), Some("edge"));
            assert_eq!(
                doc.get("accept-keysend").and_then(Value::as_bool),
                Some(true)
            );
            assert!(doc.get("min-chan-size").is_some_and(Value::is_null));
            assert_eq!(
                doc.get("max-chan-size"),
                Some(&Value::Number(Number::Int(16777215)))
            );
            let advanced = doc.get("advanced").and_then(Value::as_object).expect("obj");
            assert_eq!(
                advanced.get("max-channel-fee-allocation"),
                Some(&Value::Number(Number::Float(0.5)))
            );
        }

        #[test]
        fn preserves_key_order() {
            let doc = Document::from_yaml(SAMPLE).expect("decode");
            let keys: Vec<&String> = doc.keys().collect();
            assert_eq!(
                keys,
                vec![
                    "alias",
                    "color",
                    "accept-keysend",
                    "min-chan-size",
                    "max-chan-size",
                    "advanced"
                ]
            );
        }

        #[test]
        fn rejects_non_mapping_top_level() {
            assert!(matches!(
                Document::from_yaml("- a\n- b\n"),
                Err(DocumentError::NotAMapping { found: "sequence" })
            ));
            assert!(matches!(
                Document::from_yaml(""),
                Err(DocumentError::NotAMapping { found: "null" })
            ));
        }

        #[test]
        fn rejects_non_string_keys() {
            assert!(matches!(
                Document::from_yaml("1: a\n"),
                Err(DocumentError::NonStringKey { found: "number" })
            ));
        }

        #[test]
        fn rejects_yaml_tags() {
            assert!(matches!(
                Document::from_yaml("a: !custom 1\n"),
                Err(DocumentError::UnsupportedTag { .. })
            ));
        }

        #[test]
        fn rejects_malformed_yaml() {
            assert!(matches!(
                Document::from_yaml("a: [unclosed\n"),
                Err(DocumentError::Yaml(_))
            ));
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn round_trip_preserves_order_and_values() {
            let doc = Document::from_yaml(SAMPLE).expect("decode");
            let encoded = doc.to_yaml().expect("encode");
            let again = Document::from_yaml(&encoded).expect("re-decode");
            assert_eq!(doc, again);
            let keys: Vec<&String> = again.keys().collect();
            assert_eq!(keys.first().map(|k| k.as_str()), Some("alias"));
            assert_eq!(keys.last().map(|k| k.as_str()), Some("advanced"));
        }

        #[test]
        fn integers_stay_integers() {
            let mut doc = Document::new();
            doc.insert("size", Value::Number(Number::Int(20000)));
            let encoded = doc.to_yaml().expect("encode");
            assert!(encoded.contains("size: 20000"));
            assert!(!encoded.contains("20000.0"));
        }
    }

    mod editing {
        use super::*;

        #[test]
        fn remove_preserves_remaining_order() {
            let mut doc = Document::from_yaml(SAMPLE).expect("decode");
            assert!(doc.remove("accept-keysend").is_some());
            let keys: Vec<&String> = doc.keys().collect();
            assert_eq!(
                keys,
                vec!["alias", "color", "min-chan-size", "max-chan-size", "advanced"]
            );
        }

        #[test]
        fn remove_absent_is_noop() {
            let mut doc = Document::from_yaml(SAMPLE).expect("decode");
            let before = doc.clone();
            assert!(doc.remove("watchtower-enabled").is_none());
            assert_eq!(doc, before);
        }

        #[test]
        fn replace_keeps_position() {
            let mut doc = Document::from_yaml(SAMPLE).expect("decode");
            doc.insert("color", Value::String("000000".into()));
            let keys: Vec<&String> = doc.keys().collect();
            assert_eq!(keys[1], "color");
        }

        #[test]
        fn equality_ignores_order() {
            let a = Document::from_yaml("x: 1\ny: 2\n").expect("decode");
            let b = Document::from_yaml("y: 2\nx: 1\n").expect("decode");
            assert_eq!(a, b);
        }
    }

    mod fingerprints {
        use super::*;

        #[test]
        fn stable_for_identical_documents() {
            let a = Document::from_yaml(SAMPLE).expect("decode");
            let b = Document::from_yaml(SAMPLE).expect("decode");
            assert_eq!(a.fingerprint(), b.fingerprint());
        }

        #[test]
        fn changes_when_a_value_changes() {
            let a = Document::from_yaml(SAMPLE).expect("decode");
            let mut b = a.clone();
            b.insert("alias", Value::String("other".into()));
            assert_ne!(a.fingerprint(), b.fingerprint());
        }

        #[test]
        fn distinguishes_null_from_absent() {
            let with_null = Document::from_yaml("a: null\n").expect("decode");
            let empty = Document::new();
            assert_ne!(with_null.fingerprint(), empty.fingerprint());
        }
    }
}
