//! Structural validation over the descriptor algebra.
//!
//! Two entry points per descriptor:
//! - [`TypeDescriptor::is`] decides conformance without collecting anything.
//! - [`TypeDescriptor::validate`] collects every [`Failure`] in traversal order,
//!   each annotated with the context (key + expected name) from the root.
//!
//! Absent values (`None`) play the role of `undefined`.
use serde_json::{Map, Value};

use crate::ir::{Leaf, Record, Refinement, TypeDescriptor, Union};

/// One step from the root to the point of divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub key: String,
    pub name: String,
}

pub type Context = Vec<ContextEntry>;

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub value: Option<Value>, // `None` = undefined
    pub context: Context,
}

pub type Validation = Result<(), Vec<Failure>>;

/// Root context for a descriptor: a single entry with an empty key.
pub fn root_context(t: &TypeDescriptor) -> Context {
    vec![ContextEntry { key: String::new(), name: t.name() }]
}

fn append(c: &Context, key: impl Into<String>, t: &TypeDescriptor) -> Context {
    let mut out = c.clone();
    out.push(ContextEntry { key: key.into(), name: t.name() });
    out
}

fn failure(v: Option<&Value>, c: &Context) -> Validation {
    Err(vec![Failure { value: v.cloned(), context: c.clone() }])
}

// ------------------------------- Decide ---------------------------------- //

impl TypeDescriptor {
    pub fn is(&self, v: Option<&Value>) -> bool {
        match self {
            Self::Record(r) => r.is(v),
            Self::Union(u) => u.first_match(v).is_some(),
            Self::Refinement(r) => r.base.is(v) && r.predicate.test(v),
            Self::Other(leaf) => leaf.is(v),
        }
    }
}

impl Record {
    pub fn is(&self, v: Option<&Value>) -> bool {
        match v {
            Some(Value::Object(m)) => self.fields.iter().all(|(k, t)| t.is(m.get(k))),
            _ => false,
        }
    }
}

impl Union {
    /// First alternative, in declaration order, that accepts `v`.
    ///
    /// Both the decision predicate and field-set resolution go through here,
    /// so they always agree on the branch a value belongs to.
    pub fn first_match(&self, v: Option<&Value>) -> Option<&TypeDescriptor> {
        self.alternatives.iter().find(|t| t.is(v))
    }
}

impl Leaf {
    pub fn is(&self, v: Option<&Value>) -> bool {
        match (self, v) {
            (Self::Any, _) => true,
            (Self::Undefined, None) => true,
            (Self::Custom { predicate, .. }, v) => predicate.test(v),
            (_, None) => false,
            (Self::String, Some(v)) => v.is_string(),
            (Self::Number, Some(v)) => v.is_number(),
            (Self::Boolean, Some(v)) => v.is_boolean(),
            (Self::Null, Some(v)) => v.is_null(),
            (Self::Undefined, Some(_)) => false,
            (Self::Dictionary, Some(v)) => v.is_object(),
            (Self::Array(item), Some(Value::Array(xs))) => xs.iter().all(|x| item.is(Some(x))),
            (Self::Dict(codomain), Some(Value::Object(m))) => m.values().all(|x| codomain.is(Some(x))),
            (Self::Array(_) | Self::Dict(_), Some(_)) => false,
            (Self::Literal(lit), Some(v)) => lit == v,
        }
    }
}

// ------------------------------ Validate --------------------------------- //

impl TypeDescriptor {
    /// Validate `v` from the root.
    pub fn validate(&self, v: &Value) -> Validation {
        self.validate_at(Some(v), &root_context(self))
    }

    /// Validate a possibly absent value under an explicit context.
    pub fn validate_at(&self, v: Option<&Value>, c: &Context) -> Validation {
        match self {
            Self::Record(r) => r.validate_at(v, c),
            Self::Union(u) => u.validate_at(v, c),
            Self::Refinement(r) => r.validate_at(v, c),
            Self::Other(leaf) => leaf.validate_at(v, c),
        }
    }
}

impl Record {
    fn validate_at(&self, v: Option<&Value>, c: &Context) -> Validation {
        let Some(Value::Object(m)) = v else {
            return failure(v, c);
        };
        let mut errors = Vec::new();
        for (k, t) in &self.fields {
            if let Err(es) = t.validate_at(m.get(k), &append(c, k, t)) {
                errors.extend(es);
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Union {
    fn validate_at(&self, v: Option<&Value>, c: &Context) -> Validation {
        let mut errors = Vec::new();
        for (i, t) in self.alternatives.iter().enumerate() {
            match t.validate_at(v, &append(c, i.to_string(), t)) {
                Ok(()) => return Ok(()),
                Err(es) => errors.extend(es),
            }
        }
        // empty union: nothing can match
        if errors.is_empty() {
            return failure(v, c);
        }
        Err(errors)
    }
}

impl Refinement {
    fn validate_at(&self, v: Option<&Value>, c: &Context) -> Validation {
        self.base.validate_at(v, c)?;
        if self.predicate.test(v) { Ok(()) } else { failure(v, c) }
    }
}

impl Leaf {
    fn validate_at(&self, v: Option<&Value>, c: &Context) -> Validation {
        match (self, v) {
            (Self::Array(item), Some(Value::Array(xs))) => collect(
                xs.iter()
                    .enumerate()
                    .map(|(i, x)| item.validate_at(Some(x), &append(c, i.to_string(), item))),
            ),
            (Self::Dict(codomain), Some(Value::Object(m))) => validate_dict(codomain, m, c),
            _ if self.is(v) => Ok(()),
            _ => failure(v, c),
        }
    }
}

fn validate_dict(codomain: &TypeDescriptor, m: &Map<String, Value>, c: &Context) -> Validation {
    collect(m.iter().map(|(k, x)| codomain.validate_at(Some(x), &append(c, k.as_str(), codomain))))
}

fn collect(results: impl Iterator<Item = Validation>) -> Validation {
    let errors = results
        .filter_map(Result::err)
        .flatten()
        .collect::<Vec<_>>();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Predicate;
    use serde_json::json;

    fn rendered(f: &Failure) -> String {
        f.context
            .iter()
            .map(|e| format!("{}: {}", e.key, e.name))
            .collect::<Vec<_>>()
            .join("/")
    }

    #[test]
    fn record_reports_every_bad_field_in_declaration_order() {
        let t = TypeDescriptor::record([
            ("a", TypeDescriptor::string()),
            ("b", TypeDescriptor::number()),
        ]);
        let errs = t.validate(&json!({ "b": "x" })).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].value, None);
        assert_eq!(rendered(&errs[0]), ": { a: string, b: number }/a: string");
        assert_eq!(errs[1].value, Some(json!("x")));
        assert_eq!(rendered(&errs[1]), ": { a: string, b: number }/b: number");
    }

    #[test]
    fn record_rejects_non_objects_at_its_own_context() {
        let t = TypeDescriptor::record([("a", TypeDescriptor::string())]);
        let errs = t.validate(&json!([1])).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(rendered(&errs[0]), ": { a: string }");
    }

    #[test]
    fn union_collects_failures_of_every_alternative() {
        let t = TypeDescriptor::union([
            TypeDescriptor::record([("a", TypeDescriptor::string())]),
            TypeDescriptor::record([("b", TypeDescriptor::number())]),
        ]);
        assert!(t.validate(&json!({ "b": 1 })).is_ok());
        let errs = t.validate(&json!({})).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(
            rendered(&errs[0]),
            ": ({ a: string } | { b: number })/0: { a: string }/a: string"
        );
        assert_eq!(
            rendered(&errs[1]),
            ": ({ a: string } | { b: number })/1: { b: number }/b: number"
        );
    }

    #[test]
    fn empty_union_fails_without_panicking() {
        let t = TypeDescriptor::union([]);
        assert!(!t.is(Some(&json!({}))));
        assert_eq!(t.validate(&json!({})).unwrap_err().len(), 1);
    }

    #[test]
    fn refinement_checks_predicate_only_after_base() {
        let t = TypeDescriptor::refinement(
            TypeDescriptor::record([("a", TypeDescriptor::number())]),
            Predicate::new(|v| v["a"].as_f64().is_some_and(|a| a >= 0.0)),
        );
        assert!(t.validate(&json!({ "a": 1 })).is_ok());

        let errs = t.validate(&json!({ "a": -1 })).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(rendered(&errs[0]), ": ({ a: number } | <function1>)");

        // base failure short-circuits: the predicate never sees a non-number
        let errs = t.validate(&json!({ "a": "x" })).unwrap_err();
        assert_eq!(rendered(&errs[0]), ": ({ a: number } | <function1>)/a: number");
    }

    #[test]
    fn arrays_and_dicts_index_their_elements() {
        let t = TypeDescriptor::array(TypeDescriptor::number());
        let errs = t.validate(&json!([1, "x", 3, true])).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(rendered(&errs[0]), ": Array<number>/1: number");
        assert_eq!(rendered(&errs[1]), ": Array<number>/3: number");

        let t = TypeDescriptor::dict(TypeDescriptor::string());
        let errs = t.validate(&json!({ "k": 1 })).unwrap_err();
        assert_eq!(rendered(&errs[0]), ": { [key: string]: string }/k: string");
    }

    #[test]
    fn is_agrees_with_validate() {
        let t = TypeDescriptor::record([
            ("n", TypeDescriptor::union([TypeDescriptor::null(), TypeDescriptor::number()])),
            ("opt", TypeDescriptor::union([TypeDescriptor::undefined(), TypeDescriptor::string()])),
            ("tag", TypeDescriptor::literal("x")),
        ]);
        for v in [
            json!({ "n": null, "tag": "x" }),
            json!({ "n": 1, "opt": "s", "tag": "x" }),
            json!({ "n": 1, "opt": 2, "tag": "x" }),
            json!({ "tag": "y" }),
            json!(null),
        ] {
            assert_eq!(t.is(Some(&v)), t.validate(&v).is_ok(), "{v}");
        }
    }
}
