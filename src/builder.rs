//! Validator builder: closes over one descriptor + options pair and yields a
//! diagnostic function with the host's `(value, prop, display_name)` shape.
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::fields::{detect_excess, resolve_fields, CHILDREN};
use crate::ir::TypeDescriptor;
use crate::report::report;
use crate::validate::{root_context, ContextEntry, Validation};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Options {
    /// Reject fields not declared by the descriptor.
    pub strict: bool,
    /// Descriptor for `value.children`, checked only when the base shape is valid.
    pub children: Option<TypeDescriptor>,
}

impl Default for Options {
    fn default() -> Self {
        Self { strict: true, children: None }
    }
}

impl Options {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
    pub fn children(mut self, children: TypeDescriptor) -> Self {
        self.children = Some(children);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    ShapeMismatch,
    ExcessProperty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Built diagnostic function. Stateless; clones share the same descriptor.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    descriptor: TypeDescriptor,
    options: Options,
}

/// Anything a [`FieldValidator`] can be attached to under a hook name.
pub trait Component {
    fn set_prop_types(&mut self, hook: &'static str, validator: FieldValidator);
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn make_field_validator(descriptor: TypeDescriptor, options: Options) -> FieldValidator {
    FieldValidator { inner: Arc::new(Inner { descriptor, options }) }
}

/// Returns an attachment function; a no-op in builds without debug assertions.
pub fn props<C: Component>(descriptor: TypeDescriptor, options: Options) -> impl Fn(&mut C) {
    let validator = cfg!(debug_assertions).then(|| make_field_validator(descriptor, options));
    move |component: &mut C| {
        if let Some(v) = &validator {
            let (key, v) = v.hook();
            component.set_prop_types(key, v.clone());
        }
    }
}

impl FieldValidator {
    /// Key the host framework looks the diagnostic function up under.
    pub const HOOK_NAME: &'static str = "__prop_types_ts";

    /// The `(key, validator)` pair a component stores.
    pub fn hook(&self) -> (&'static str, &Self) {
        (Self::HOOK_NAME, self)
    }
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.inner.descriptor
    }
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// `None` when `value` conforms. The two hints are accepted for the host's
    /// hook signature and not otherwise used.
    pub fn check(&self, value: &Value, _prop: &str, _display_name: &str) -> Option<Diagnostic> {
        tracing::trace!(descriptor = %self.inner.descriptor, "checking value");
        if let Err(failures) = self.validate_shape(value) {
            return Some(Diagnostic {
                kind: DiagnosticKind::ShapeMismatch,
                message: format!("\n{}", report(&failures).join("\n")),
            });
        }
        if !self.inner.options.strict {
            return None;
        }
        let declared = resolve_fields(value, &self.inner.descriptor);
        let excess = detect_excess(value, declared);
        if excess.is_empty() {
            return None;
        }
        Some(Diagnostic {
            kind: DiagnosticKind::ExcessProperty,
            message: format!("\nInvalid additional prop(s): {}", Value::from(excess)),
        })
    }

    fn validate_shape(&self, value: &Value) -> Validation {
        let Inner { descriptor, options } = &*self.inner;
        descriptor.validate_at(Some(value), &root_context(descriptor))?;
        let Some(children) = &options.children else {
            return Ok(());
        };
        let context = vec![ContextEntry { key: CHILDREN.to_string(), name: children.name() }];
        children.validate_at(value.get(CHILDREN), &context)
    }
}
