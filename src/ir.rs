// Strongly-typed descriptor algebra. Descriptors are built once and never mutated.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// Declared fields of a record, in declaration order.
pub type Fields = IndexMap<String, TypeDescriptor>;

#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Record(Record),
    Union(Union),
    Refinement(Refinement),
    Other(Leaf), // opaque to field-set resolution
}

#[derive(Debug, Clone, Default)]
pub struct Record {
    pub fields: Fields,
}

#[derive(Debug, Clone, Default)]
pub struct Union {
    pub alternatives: Vec<TypeDescriptor>, // tried in order
}

#[derive(Debug, Clone)]
pub struct Refinement {
    pub base: Box<TypeDescriptor>,
    pub predicate: Predicate,
}

/// Descriptors the resolver never unwraps.
#[derive(Debug, Clone)]
pub enum Leaf {
    Any,
    String,
    Number,
    Boolean,
    Null,
    Undefined, // only an absent value
    Dictionary, // any object
    Array(Box<TypeDescriptor>),
    Dict(Box<TypeDescriptor>),
    Literal(Value),
    Custom { name: String, predicate: Predicate },
}

/// A named check over values. Must be pure for results to be deterministic.
#[derive(Clone)]
pub struct Predicate {
    pub name: String,
    check: Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>,
}

impl Predicate {
    /// Anonymous predicates render as `<function1>` in descriptor names.
    pub const ANONYMOUS: &'static str = "<function1>";

    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::named(Self::ANONYMOUS, f)
    }
    pub fn named(name: impl Into<String>, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(move |v: Option<&Value>| v.is_some_and(&f)),
        }
    }
    /// Like [`Predicate::named`] but also sees absent (undefined) values.
    pub fn optional(name: impl Into<String>, f: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static) -> Self {
        Self { name: name.into(), check: Arc::new(f) }
    }
    pub fn test(&self, v: Option<&Value>) -> bool {
        (self.check)(v)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

// ------------------------------ Constructors ------------------------------ //

impl TypeDescriptor {
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, TypeDescriptor)>) -> Self {
        Self::Record(Record {
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        })
    }
    pub fn union(alternatives: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union(Union { alternatives: alternatives.into_iter().collect() })
    }
    pub fn refinement(base: TypeDescriptor, predicate: Predicate) -> Self {
        Self::Refinement(Refinement { base: Box::new(base), predicate })
    }
    pub fn any() -> Self {
        Self::Other(Leaf::Any)
    }
    pub fn string() -> Self {
        Self::Other(Leaf::String)
    }
    pub fn number() -> Self {
        Self::Other(Leaf::Number)
    }
    pub fn boolean() -> Self {
        Self::Other(Leaf::Boolean)
    }
    pub fn null() -> Self {
        Self::Other(Leaf::Null)
    }
    pub fn undefined() -> Self {
        Self::Other(Leaf::Undefined)
    }
    pub fn dictionary() -> Self {
        Self::Other(Leaf::Dictionary)
    }
    pub fn array(item: TypeDescriptor) -> Self {
        Self::Other(Leaf::Array(Box::new(item)))
    }
    pub fn dict(codomain: TypeDescriptor) -> Self {
        Self::Other(Leaf::Dict(Box::new(codomain)))
    }
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Other(Leaf::Literal(value.into()))
    }
    pub fn custom(name: impl Into<String>, predicate: Predicate) -> Self {
        Self::Other(Leaf::Custom { name: name.into(), predicate })
    }
}

// ---------------------------------- Names --------------------------------- //

impl TypeDescriptor {
    /// Display name used in failure paths, e.g. `({ a: number } | <function1>)`.
    pub fn name(&self) -> String {
        match self {
            Self::Record(r) => r.name(),
            Self::Union(u) => {
                let arms = u.alternatives.iter().map(Self::name).collect::<Vec<_>>();
                format!("({})", arms.join(" | "))
            }
            Self::Refinement(r) => format!("({} | {})", r.base.name(), r.predicate.name),
            Self::Other(leaf) => leaf.name(),
        }
    }
}

impl Record {
    pub fn name(&self) -> String {
        if self.fields.is_empty() {
            return "{}".to_string();
        }
        let entries = self.fields
            .iter()
            .map(|(k, t)| format!("{k}: {}", t.name()))
            .collect::<Vec<_>>();
        format!("{{ {} }}", entries.join(", "))
    }
}

impl Leaf {
    pub fn name(&self) -> String {
        match self {
            Self::Any => "any".into(),
            Self::String => "string".into(),
            Self::Number => "number".into(),
            Self::Boolean => "boolean".into(),
            Self::Null => "null".into(),
            Self::Undefined => "undefined".into(),
            Self::Dictionary => "Dictionary".into(),
            Self::Array(item) => format!("Array<{}>", item.name()),
            Self::Dict(codomain) => format!("{{ [key: string]: {} }}", codomain.name()),
            Self::Literal(v) => v.to_string(),
            Self::Custom { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
