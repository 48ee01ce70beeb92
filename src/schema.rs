//! Declarative schema files: a JSON serialization of the descriptor algebra.
//!
//! ```json
//! {
//!   "props": { "union": [
//!     { "record": { "a": "string" } },
//!     { "refinement": { "record": { "b": "number" } }, "name": "nonNegative",
//!       "check": { "pointer": "/b", "minimum": 0 } }
//!   ] },
//!   "strict": true,
//!   "children": "node"
//! }
//! ```
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::builder::Options;
use crate::error::SchemaError;
use crate::ir::{Predicate, TypeDescriptor};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    pub props: DescSpec,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub children: Option<DescSpec>,
}

/// One descriptor node: a leaf name, or an object with exactly one kind key.
#[derive(Debug, Clone)]
pub enum DescSpec {
    Leaf(String),
    Record { record: IndexMap<String, DescSpec> },
    Union { union: Vec<DescSpec> },
    Refinement {
        refinement: Box<DescSpec>,
        name: Option<String>,
        check: CheckSpec,
    },
    Array { array: Box<DescSpec> },
    Dict { dict: Box<DescSpec> },
    Literal { literal: Value },
}

/// Constraints evaluated on the value found at `pointer` (JSON Pointer).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    #[serde(default)]
    pub pointer: String,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// A compiled schema file.
#[derive(Debug, Clone)]
pub struct Schema {
    pub descriptor: TypeDescriptor,
    pub options: Options,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

const KINDS: &[&str] = &["record", "union", "refinement", "array", "dict", "literal"];
const KEYS: &[&str] = &["record", "union", "refinement", "name", "check", "array", "dict", "literal"];

// Children go through `next_value` so path tracking sees every nested key.
impl<'de> Deserialize<'de> for DescSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DescVisitor)
    }
}

struct DescVisitor;

impl<'de> Visitor<'de> for DescVisitor {
    type Value = DescSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a leaf type name or an object with one of: {}", KINDS.join(", "))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DescSpec, E> {
        Ok(DescSpec::Leaf(v.to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DescSpec, A::Error> {
        let mut kind: Option<(String, DescSpec)> = None;
        let mut name: Option<String> = None;
        let mut check: Option<CheckSpec> = None;

        while let Some(key) = map.next_key::<String>()? {
            let spec = match key.as_str() {
                "name" => {
                    if name.replace(map.next_value()?).is_some() {
                        return Err(de::Error::duplicate_field("name"));
                    }
                    continue;
                }
                "check" => {
                    if check.replace(map.next_value()?).is_some() {
                        return Err(de::Error::duplicate_field("check"));
                    }
                    continue;
                }
                "record" => DescSpec::Record { record: map.next_value()? },
                "union" => DescSpec::Union { union: map.next_value()? },
                "refinement" => DescSpec::Refinement {
                    refinement: map.next_value()?,
                    name: None,
                    check: CheckSpec::default(),
                },
                "array" => DescSpec::Array { array: map.next_value()? },
                "dict" => DescSpec::Dict { dict: map.next_value()? },
                "literal" => DescSpec::Literal { literal: map.next_value()? },
                other => return Err(de::Error::unknown_field(other, KEYS)),
            };
            if let Some((prev, _)) = &kind {
                return Err(de::Error::custom(format!("`{key}` cannot be combined with `{prev}`")));
            }
            kind = Some((key, spec));
        }

        match kind {
            Some((_, DescSpec::Refinement { refinement, .. })) => {
                let check = check.ok_or_else(|| de::Error::missing_field("check"))?;
                Ok(DescSpec::Refinement { refinement, name, check })
            }
            Some((key, spec)) => {
                if name.is_some() || check.is_some() {
                    return Err(de::Error::custom(format!(
                        "`name` and `check` only apply to `refinement`, not `{key}`"
                    )));
                }
                Ok(spec)
            }
            None => Err(de::Error::custom(format!("expected one of: {}", KINDS.join(", ")))),
        }
    }
}

pub fn load_schema(path: &Path) -> Result<Schema, SchemaError> {
    let source = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema(&source)
}

pub fn parse_schema(source: &str) -> Result<Schema, SchemaError> {
    crate::path_de::from_str_with_path::<SchemaFile>(source)?.compile()
}

impl SchemaFile {
    pub fn compile(self) -> Result<Schema, SchemaError> {
        let descriptor = self.props.compile()?;
        let mut options = Options::default();
        if let Some(strict) = self.strict {
            options.strict = strict;
        }
        if let Some(children) = self.children {
            options.children = Some(children.compile()?);
        }
        Ok(Schema { descriptor, options })
    }
}

impl DescSpec {
    pub fn compile(self) -> Result<TypeDescriptor, SchemaError> {
        Ok(match self {
            Self::Leaf(name) => leaf_by_name(&name)?,
            Self::Record { record } => TypeDescriptor::record(
                record
                    .into_iter()
                    .map(|(k, d)| d.compile().map(|t| (k, t)))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Self::Union { union } => {
                if union.is_empty() {
                    return Err(SchemaError::EmptyUnion);
                }
                TypeDescriptor::union(
                    union.into_iter().map(Self::compile).collect::<Result<Vec<_>, _>>()?,
                )
            }
            Self::Refinement { refinement, name, check } => {
                let predicate = check.compile(name.as_deref().unwrap_or(Predicate::ANONYMOUS))?;
                TypeDescriptor::refinement(refinement.compile()?, predicate)
            }
            Self::Array { array } => TypeDescriptor::array(array.compile()?),
            Self::Dict { dict } => TypeDescriptor::dict(dict.compile()?),
            Self::Literal { literal } => TypeDescriptor::literal(literal),
        })
    }
}

fn leaf_by_name(name: &str) -> Result<TypeDescriptor, SchemaError> {
    Ok(match name {
        "string" => TypeDescriptor::string(),
        "number" => TypeDescriptor::number(),
        "boolean" => TypeDescriptor::boolean(),
        "null" => TypeDescriptor::null(),
        "undefined" => TypeDescriptor::undefined(),
        "any" => TypeDescriptor::any(),
        "Dictionary" => TypeDescriptor::dictionary(),
        "element" => crate::node::element(),
        "child" => crate::node::child(),
        "fragment" => crate::node::fragment(),
        "node" => crate::node::node(),
        other => return Err(SchemaError::UnknownType(other.to_string())),
    })
}

impl CheckSpec {
    pub fn compile(self, name: &str) -> Result<Predicate, SchemaError> {
        let pattern = self
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|source| SchemaError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()?;
        let Self { pointer, minimum, maximum, min_length, max_length, .. } = self;
        Ok(Predicate::named(name, move |root: &Value| {
            let Some(v) = root.pointer(&pointer) else {
                return false;
            };
            if minimum.is_some() || maximum.is_some() {
                let Some(n) = v.as_f64() else { return false };
                if minimum.is_some_and(|m| n < m) || maximum.is_some_and(|m| n > m) {
                    return false;
                }
            }
            if let Some(rx) = &pattern {
                if !v.as_str().is_some_and(|s| rx.is_match(s)) {
                    return false;
                }
            }
            if min_length.is_some() || max_length.is_some() {
                let len = match v {
                    Value::String(s) => s.chars().count(),
                    Value::Array(xs) => xs.len(),
                    _ => return false,
                };
                if min_length.is_some_and(|m| len < m) || max_length.is_some_and(|m| len > m) {
                    return false;
                }
            }
            true
        }))
    }
}
