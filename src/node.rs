//! Pre-defined leaves for renderable content.
//!
//! An element is encoded as an object with a string `type` and an object
//! `props`, e.g. `{ "type": "div", "props": {} }`.
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::ir::{Predicate, TypeDescriptor};

static ELEMENT: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::custom("ReactElement", Predicate::named("isValidElement", is_element))
});
static CHILD: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::custom("ReactChild", Predicate::named("isChild", is_child))
});
static FRAGMENT: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::custom("ReactFragment", Predicate::named("isFragment", is_fragment))
});
static NODE: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::custom("ReactNode", Predicate::optional("isNode", is_node))
});

pub fn element() -> TypeDescriptor {
    ELEMENT.clone()
}
pub fn child() -> TypeDescriptor {
    CHILD.clone()
}
pub fn fragment() -> TypeDescriptor {
    FRAGMENT.clone()
}
pub fn node() -> TypeDescriptor {
    NODE.clone()
}

fn is_element(v: &Value) -> bool {
    v.get("type").is_some_and(Value::is_string) && v.get("props").is_some_and(Value::is_object)
}

fn is_child(v: &Value) -> bool {
    v.is_string() || v.is_number() || is_element(v)
}

// any object counts, elements included
fn is_fragment(v: &Value) -> bool {
    match v {
        Value::Object(_) => true,
        Value::Array(xs) => xs.iter().all(|x| is_node(Some(x))),
        _ => false,
    }
}

fn is_node(v: Option<&Value>) -> bool {
    match v {
        None => true,
        Some(v) => is_child(v) || is_fragment(v) || v.is_boolean() || v.is_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn div() -> Value {
        json!({ "type": "div", "props": {} })
    }

    #[test]
    fn element() {
        assert!(super::element().is(Some(&div())));
        assert!(!super::element().is(Some(&json!({ "type": "div" }))));
    }

    #[test]
    fn fragment() {
        assert!(super::fragment().is(Some(&div())));
        assert!(super::fragment().is(Some(&json!([div(), { "type": "span", "props": {} }]))));
        assert!(!super::fragment().is(Some(&json!("text"))));
    }

    #[test]
    fn node() {
        let n = super::node();
        assert!(n.is(Some(&div())));
        assert!(n.is(Some(&json!(false))));
        assert!(n.is(Some(&json!(null))));
        assert!(n.is(None));
        assert!(n.is(Some(&json!(["a", 1, [null, true]]))));
        assert_eq!(n.name(), "ReactNode");
    }

    #[test]
    fn children_option_accepts_nodes() {
        use crate::builder::{make_field_validator, Options};
        let t = TypeDescriptor::record([("title", TypeDescriptor::string())]);
        let v = make_field_validator(t, Options::default().children(super::node()));
        assert!(v.check(&json!({ "title": "t", "children": [div(), "x"] }), "", "").is_none());
        assert!(v.check(&json!({ "title": "t", "children": [{}, 1.5, []] }), "", "").is_none());

        let strict_child = make_field_validator(
            TypeDescriptor::record([("title", TypeDescriptor::string())]),
            Options::default().children(super::child()),
        );
        assert_eq!(
            strict_child.check(&json!({ "title": "t", "children": [div()] }), "", "").map(|d| d.message),
            Some(format!("\nInvalid value [{}] supplied to children: ReactChild", div()))
        );
    }
}
