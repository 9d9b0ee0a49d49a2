//! Form materialization: turn an effective field set into the typed form
//! description shared by the admin preview, the internal sales form, and the
//! public application wizard. This module is a pure transformation; it never
//! fetches data, which is what keeps the three surfaces from diverging.

use serde::{Deserialize, Serialize};

use crate::fields::{FieldDefinition, FieldId, FieldType};

/// Fixed Student attributes that exist independently of admin-defined fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalAttribute {
    FirstName,
    LastName,
    Email,
    Mobile,
    Dob,
    Gender,
    MaritalStatus,
}

impl CanonicalAttribute {
    pub const fn key(self) -> &'static str {
        match self {
            CanonicalAttribute::FirstName => "first_name",
            CanonicalAttribute::LastName => "last_name",
            CanonicalAttribute::Email => "email",
            CanonicalAttribute::Mobile => "mobile",
            CanonicalAttribute::Dob => "dob",
            CanonicalAttribute::Gender => "gender",
            CanonicalAttribute::MaritalStatus => "marital_status",
        }
    }
}

/// One entry of the fixed identity block that leads every form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalDescriptor {
    pub attribute: CanonicalAttribute,
    pub label: &'static str,
    pub required: bool,
}

/// Renderable descriptor for one admin-defined field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub label: String,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub required: bool,
}

/// Ordered, typed description of a complete enrollment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSpec {
    pub canonical: Vec<CanonicalDescriptor>,
    pub dynamic: Vec<FieldDescriptor>,
}

impl FormSpec {
    pub fn descriptor(&self, id: FieldId) -> Option<&FieldDescriptor> {
        self.dynamic.iter().find(|descriptor| descriptor.id == id)
    }
}

/// The identity block rendered ahead of any dynamic fields on every surface.
const CANONICAL_BLOCK: [(CanonicalAttribute, &str, bool); 4] = [
    (CanonicalAttribute::FirstName, "First Name", true),
    (CanonicalAttribute::LastName, "Last Name", false),
    (CanonicalAttribute::Email, "Email", false),
    (CanonicalAttribute::Mobile, "Mobile Number", true),
];

/// Materialize a form from an already-resolved effective field set. The
/// canonical identity block always leads; a node with zero custom fields still
/// yields a minimally-complete form.
pub fn materialize(fields: &[FieldDefinition]) -> FormSpec {
    FormSpec {
        canonical: CANONICAL_BLOCK
            .iter()
            .map(|(attribute, label, required)| CanonicalDescriptor {
                attribute: *attribute,
                label,
                required: *required,
            })
            .collect(),
        dynamic: fields
            .iter()
            .map(|definition| FieldDescriptor {
                id: definition.id,
                label: definition.label.clone(),
                field_type: definition.field_type,
                options: definition.options.clone(),
                required: definition.required,
            })
            .collect(),
    }
}
