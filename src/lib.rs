//! Descriptor-driven props validation.
//!
//! A [`TypeDescriptor`] describes the expected shape of a value (records,
//! unions, refinements, and opaque leaves). [`make_field_validator`] turns a
//! descriptor plus [`Options`] into a [`FieldValidator`] whose
//! [`check`](FieldValidator::check) returns `None` for conforming values and a
//! [`Diagnostic`] otherwise. In strict mode, fields the value's matching shape
//! does not declare are reported as excess properties.
pub mod builder;
pub mod cli;
pub mod error;
pub mod fields;
pub mod ir;
pub mod jq_exec;
pub mod node;
pub mod path_de;
pub mod report;
pub mod schema;
pub mod validate;

pub use builder::{make_field_validator, props, Component, Diagnostic, DiagnosticKind, FieldValidator, Options};
pub use error::SchemaError;
pub use fields::{detect_excess, resolve_fields, CHILDREN};
pub use ir::{Fields, Leaf, Predicate, Record, Refinement, TypeDescriptor, Union};
pub use schema::{load_schema, parse_schema, Schema};
pub use validate::{Context, ContextEntry, Failure, Validation};
