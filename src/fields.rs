//! Effective field sets and excess-property detection.
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::ir::{Fields, TypeDescriptor};

/// Reserved field validated through `Options::children`, never reported as excess.
pub const CHILDREN: &str = "children";

static NO_FIELDS: Lazy<Fields> = Lazy::new(Fields::new);

/// Declared fields that apply to `value` once unions and refinements are resolved.
///
/// Unions are resolved by value: only the first alternative accepting `value`
/// contributes its fields. When nothing resolves to a record the empty set is
/// returned, so every own field ends up flagged as excess.
pub fn resolve_fields<'d>(value: &Value, descriptor: &'d TypeDescriptor) -> &'d Fields {
    match descriptor {
        TypeDescriptor::Record(r) => &r.fields,
        TypeDescriptor::Refinement(r) => resolve_fields(value, &r.base),
        TypeDescriptor::Union(u) => match u.first_match(Some(value)) {
            Some(branch) => {
                tracing::debug!(branch = %branch, "resolved union branch for field set");
                resolve_fields(value, branch)
            }
            None => {
                tracing::warn!(union = %descriptor, "no union branch matches; using empty field set");
                &*NO_FIELDS
            }
        },
        TypeDescriptor::Other(leaf) => {
            tracing::warn!(descriptor = %leaf.name(), "descriptor has no field set; using empty field set");
            &*NO_FIELDS
        }
    }
}

/// Own field names of `value` missing from `declared`, in iteration order.
pub fn detect_excess(value: &Value, declared: &Fields) -> Vec<String> {
    let Value::Object(m) = value else {
        return Vec::new();
    };
    m.keys()
        .filter(|k| k.as_str() != CHILDREN && !declared.contains_key(k.as_str()))
        .cloned()
        .collect()
}
