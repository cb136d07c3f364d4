//! core::shape
//!
//! Structural predicates over documents.
//!
//! # Overview
//!
//! A [`Shape`] describes the keys a document must contain and the kind of
//! value expected at each, nested to any depth. Transforms use shapes to
//! decide whether their precondition fields exist before touching anything.
//!
//! # Invariants
//!
//! - An absent parent anywhere along a path makes the test `false`; it never
//!   panics and never errors.
//! - `null` is present-but-wrong-kind for every typed kind. Only
//!   [`Kind::Any`] accepts it, because `Any` asserts presence alone.
//! - Keys not named by the shape are ignored ("partial shape").
//!
//! # Example
//!
//! ```
//! use carryover::core::document::Document;
//! use carryover::core::shape::{Kind, Shape};
//!
//! let shape = Shape::new().nested("bitcoind", Shape::new().field("type", Kind::String));
//!
//! let doc = Document::from_yaml("bitcoind:\n  type: internal\n").unwrap();
//! assert!(shape.test(&doc));
//!
//! let missing = Document::new();
//! assert!(!shape.test(&missing));
//! assert_eq!(
//!     shape.describe_mismatch(&missing),
//!     Some("bitcoind: required key is missing".to_string())
//! );
//! ```

use crate::core::document::{Document, Value};

/// The kind of value a shape expects at a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Object,
    Sequence,
    /// Any value at all, including null. Asserts presence only.
    Any,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Object => "object",
            Kind::Sequence => "sequence",
            Kind::Any => "any",
        }
    }

    fn admits(self, value: &Value) -> bool {
        match self {
            Kind::Any => true,
            Kind::String => matches!(value, Value::String(_)),
            Kind::Number => matches!(value, Value::Number(_)),
            Kind::Boolean => matches!(value, Value::Bool(_)),
            Kind::Object => matches!(value, Value::Object(_)),
            Kind::Sequence => matches!(value, Value::Sequence(_)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expect {
    Kind(Kind),
    Shape(Shape),
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    expect: Expect,
    optional: bool,
}

/// A nested description of required keys and their kinds.
///
/// Built with a chaining constructor; field order determines which mismatch
/// is reported first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    fields: Vec<Field>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to be present with the given kind.
    pub fn field(mut self, name: &str, kind: Kind) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            expect: Expect::Kind(kind),
            optional: false,
        });
        self
    }

    /// Accept `name` being absent, but check its kind when present.
    pub fn optional_field(mut self, name: &str, kind: Kind) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            expect: Expect::Kind(kind),
            optional: true,
        });
        self
    }

    /// Require `name` to be an object matching the given shape.
    pub fn nested(mut self, name: &str, shape: Shape) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            expect: Expect::Shape(shape),
            optional: false,
        });
        self
    }

    /// True when every required key exists with an admissible kind.
    pub fn test(&self, doc: &Document) -> bool {
        self.first_mismatch(doc, &mut Vec::new()).is_none()
    }

    /// Describe the first mismatch in field order, or `None` on a match.
    ///
    /// Paths are dotted from the document root, e.g. `bitcoind.type`.
    pub fn describe_mismatch(&self, doc: &Document) -> Option<String> {
        self.first_mismatch(doc, &mut Vec::new())
    }

    fn first_mismatch(&self, doc: &Document, path: &mut Vec<String>) -> Option<String> {
        for field in &self.fields {
            let value = match doc.get(&field.name) {
                Some(value) => value,
                None => {
                    if field.optional {
                        continue;
                    }
                    return Some(format!(
                        "{}: required key is missing",
                        join_path(path, &field.name)
                    ));
                }
            };

            match &field.expect {
                Expect::Kind(kind) => {
                    if !kind.admits(value) {
                        return Some(format!(
                            "{}: expected {}, found {}",
                            join_path(path, &field.name),
                            kind.name(),
                            value.kind_name()
                        ));
                    }
                }
                Expect::Shape(shape) => match value.as_object() {
                    None => {
                        return Some(format!(
                            "{}: expected object, found {}",
                            join_path(path, &field.name),
                            value.kind_name()
                        ));
                    }
                    Some(inner) => {
                        path.push(field.name.clone());
                        if let Some(mismatch) = shape.first_mismatch(inner, path) {
                            return Some(mismatch);
                        }
                        path.pop();
                    }
                },
            }
        }
        None
    }
}

fn join_path(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path.join("."), name)
    }
}
