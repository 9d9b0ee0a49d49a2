use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::FieldId;

/// Identifier wrapper for a top-level Program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub u64);

/// Identifier wrapper for a SubProgram owned by a Program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubProgramId(pub u64);

/// Identifier wrapper for a Course owned by a SubProgram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub u64);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SubProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root of the catalog hierarchy. The slug is unique and URL-safe so public
/// application forms can address a program without exposing numeric ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub slug: String,
}

/// Second hierarchy level, exclusively owned by its Program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubProgram {
    pub id: SubProgramId,
    pub program: ProgramId,
    pub name: String,
}

/// Leaf hierarchy level carrying the fee, exclusively owned by its SubProgram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub sub_program: SubProgramId,
    pub name: String,
    pub fee_amount: u64,
}

/// Tagged reference to exactly one hierarchy node. Field definitions attach
/// through this so "exactly one parent" holds by construction instead of by
/// three nullable foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    Program(ProgramId),
    SubProgram(SubProgramId),
    Course(CourseId),
}

impl NodeRef {
    pub const fn kind(self) -> &'static str {
        match self {
            NodeRef::Program(_) => "program",
            NodeRef::SubProgram(_) => "sub_program",
            NodeRef::Course(_) => "course",
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Program(id) => write!(f, "program {id}"),
            NodeRef::SubProgram(id) => write!(f, "sub_program {id}"),
            NodeRef::Course(id) => write!(f, "course {id}"),
        }
    }
}

/// Errors raised by catalog reads and mutations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NodeNotFound(NodeRef),
    #[error("field {0} not found")]
    FieldNotFound(FieldId),
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl CatalogError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Nested course view used by the hierarchy explorer endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseView {
    pub id: CourseId,
    pub name: String,
    pub fee_amount: u64,
}

/// SubProgram with its courses, nested under [`ProgramTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubProgramTree {
    pub id: SubProgramId,
    pub name: String,
    pub courses: Vec<CourseView>,
}

/// Fully materialized hierarchy for one Program, produced in a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramTree {
    pub id: ProgramId,
    pub name: String,
    pub slug: String,
    pub sub_programs: Vec<SubProgramTree>,
}

/// Derive a URL-safe slug from a display name. Non-alphanumeric runs collapse
/// to single hyphens.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation_and_whitespace() {
        assert_eq!(slugify("Natya Career Academy"), "natya-career-academy");
        assert_eq!(slugify("  Arts & Crafts!  "), "arts-crafts");
        assert_eq!(slugify("STED"), "sted");
    }

    #[test]
    fn node_ref_serializes_as_tagged_variant() {
        let node = NodeRef::SubProgram(SubProgramId(7));
        let json = serde_json::to_value(&node).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({ "kind": "sub_program", "id": 7 })
        );
    }
}
