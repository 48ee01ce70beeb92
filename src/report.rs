// Renders collected failures into the human-readable diagnostic lines.
use serde_json::Value;

use crate::validate::{Context, Failure};

/// `undefined` for absent values, compact JSON otherwise.
pub fn display_value(v: Option<&Value>) -> String {
    match v {
        None => "undefined".to_string(),
        Some(v) => v.to_string(),
    }
}

/// `key: name` entries joined by `/`; the root entry has an empty key.
pub fn context_path(c: &Context) -> String {
    c.iter()
        .map(|e| format!("{}: {}", e.key, e.name))
        .collect::<Vec<_>>()
        .join("/")
}

pub fn report_failure(f: &Failure) -> String {
    format!(
        "Invalid value {} supplied to {}",
        display_value(f.value.as_ref()),
        context_path(&f.context),
    )
}

/// One line per failure, in collection order.
pub fn report(failures: &[Failure]) -> Vec<String> {
    failures.iter().map(report_failure).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeDescriptor;
    use serde_json::json;

    #[test]
    fn renders_undefined_and_compact_json() {
        assert_eq!(display_value(None), "undefined");
        assert_eq!(display_value(Some(&json!({ "a": -1 }))), r#"{"a":-1}"#);
        assert_eq!(display_value(Some(&json!("s"))), r#""s""#);
    }

    #[test]
    fn renders_missing_field() {
        let t = TypeDescriptor::record([("name", TypeDescriptor::string())]);
        let errs = t.validate(&json!({})).unwrap_err();
        assert_eq!(
            report(&errs),
            ["Invalid value undefined supplied to : { name: string }/name: string"]
        );
    }
}
