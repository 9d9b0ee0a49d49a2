//! Field schema engine: admin-defined field definitions and the inheritance
//! rules that turn them into per-node effective field sets.

mod domain;
pub mod resolver;

pub use domain::{FieldDefinition, FieldId, FieldType};
