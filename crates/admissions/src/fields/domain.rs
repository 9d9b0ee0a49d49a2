use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::NodeRef;

/// Identifier wrapper for an admin-defined data-collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input widget and value typing for a field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Dropdown,
    File,
}

impl FieldType {
    pub const fn label(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Dropdown => "dropdown",
            FieldType::File => "file",
        }
    }
}

/// Admin-defined data-collection field attached to exactly one hierarchy node.
///
/// `seq` records insertion order and breaks `display_order` ties so effective
/// field resolution stays stable when admins renumber fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub attachment: NodeRef,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub display_order: u32,
    pub required: bool,
    // Bookkeeping only, not part of the wire contract.
    #[serde(skip)]
    pub(crate) seq: u64,
}
