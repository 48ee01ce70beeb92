use proptest::prelude::*;
use prop_shape::{make_field_validator, resolve_fields, Options, Predicate, TypeDescriptor};
use serde_json::{Map, Value};

fn record_of(names: &[String]) -> TypeDescriptor {
    TypeDescriptor::record(names.iter().map(|n| (n.clone(), TypeDescriptor::string())))
}

/// Declared names plus a shape-valid value carrying `extra` keys after them.
fn case() -> impl Strategy<Value = (Vec<String>, Vec<String>, Value)> {
    (
        prop::collection::btree_set("[a-e]", 0..4),
        prop::collection::vec(prop_oneof!["[a-h]", Just("children".to_string())], 0..6),
    )
        .prop_map(|(declared, extra)| {
            let declared = declared.into_iter().collect::<Vec<_>>();
            let mut m = Map::new();
            for k in &declared {
                m.insert(k.clone(), Value::from("x"));
            }
            let mut added = Vec::new();
            for k in extra {
                if !m.contains_key(&k) {
                    m.insert(k.clone(), Value::from(1));
                    added.push(k);
                }
            }
            (declared, added, Value::Object(m))
        })
}

proptest! {
    #[test]
    fn excess_is_own_keys_minus_declared((declared, added, value) in case()) {
        let expected = added.into_iter().filter(|k| k != "children").collect::<Vec<_>>();
        let got = make_field_validator(record_of(&declared), Options::default()).check(&value, "", "");
        if expected.is_empty() {
            prop_assert!(got.is_none());
        } else {
            let message = format!("\nInvalid additional prop(s): {}", Value::from(expected));
            prop_assert_eq!(got.map(|d| d.message), Some(message));
        }
    }

    #[test]
    fn non_strict_never_reports_excess((declared, _added, value) in case()) {
        let v = make_field_validator(record_of(&declared), Options::default().strict(false));
        prop_assert!(v.check(&value, "", "").is_none());
    }

    #[test]
    fn refinement_resolves_like_its_base((declared, _added, value) in case(), accept in any::<bool>()) {
        let base = record_of(&declared);
        let refined = TypeDescriptor::refinement(base.clone(), Predicate::new(move |_| accept));
        let a = resolve_fields(&value, &base).keys().cloned().collect::<Vec<_>>();
        let b = resolve_fields(&value, &refined).keys().cloned().collect::<Vec<_>>();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn checks_are_idempotent((declared, _added, value) in case(), drop_first in any::<bool>()) {
        let mut value = value;
        if drop_first {
            if let (Some(first), Value::Object(m)) = (declared.first(), &mut value) {
                m.remove(first);
            }
        }
        let v = make_field_validator(record_of(&declared), Options::default());
        prop_assert_eq!(v.check(&value, "", ""), v.check(&value, "", ""));
    }

    #[test]
    fn union_uses_first_matching_branch_only(extra in prop::collection::vec("[c-f]", 0..3)) {
        let t = TypeDescriptor::union([
            TypeDescriptor::record([("a", TypeDescriptor::string())]),
            TypeDescriptor::record([("b", TypeDescriptor::number())]),
        ]);
        let mut m = Map::new();
        m.insert("a".into(), Value::from("s"));
        m.insert("b".into(), Value::from(1));
        for k in &extra {
            m.insert(k.clone(), Value::Bool(true));
        }
        let value = Value::Object(m);
        let keys = resolve_fields(&value, &t).keys().cloned().collect::<Vec<_>>();
        prop_assert_eq!(keys, vec!["a".to_string()]);
    }
}
