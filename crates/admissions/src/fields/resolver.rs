//! Pure effective-field resolution.
//!
//! Given the ancestor chain of a target node (target first, owning Program
//! last) and the full set of field definitions, produce the ordered field set
//! the forms for that node must render. The function touches no storage, so
//! two calls over the same inputs return identical, identically-ordered
//! output.

use std::collections::HashSet;

use crate::catalog::NodeRef;

use super::domain::FieldDefinition;

/// Resolve the effective field set for a node whose ancestor chain is `chain`.
///
/// A definition is in scope when its attachment point is the target itself or
/// any ancestor up to the owning Program. Duplicate ids are dropped, then the
/// survivors sort by `(display_order, insertion sequence)`.
pub fn resolve(chain: &[NodeRef], definitions: &[FieldDefinition]) -> Vec<FieldDefinition> {
    let mut seen: HashSet<_> = HashSet::new();
    let mut effective: Vec<FieldDefinition> = definitions
        .iter()
        .filter(|definition| chain.contains(&definition.attachment))
        .filter(|definition| seen.insert(definition.id))
        .cloned()
        .collect();
    effective.sort_by_key(|definition| (definition.display_order, definition.seq));
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CourseId, NodeRef, ProgramId, SubProgramId};
    use crate::fields::{FieldDefinition, FieldId, FieldType};

    fn field(id: u64, attachment: NodeRef, order: u32, seq: u64) -> FieldDefinition {
        FieldDefinition {
            id: FieldId(id),
            attachment,
            label: format!("Field {id}"),
            field_type: FieldType::Text,
            options: Vec::new(),
            display_order: order,
            required: false,
            seq,
        }
    }

    fn course_chain() -> Vec<NodeRef> {
        vec![
            NodeRef::Course(CourseId(30)),
            NodeRef::SubProgram(SubProgramId(20)),
            NodeRef::Program(ProgramId(10)),
        ]
    }

    #[test]
    fn program_fields_are_inherited_by_descendants() {
        let definitions = vec![
            field(1, NodeRef::Program(ProgramId(10)), 1, 1),
            field(2, NodeRef::Program(ProgramId(99)), 1, 2),
        ];

        let effective = resolve(&course_chain(), &definitions);
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].id, FieldId(1));
    }

    #[test]
    fn own_and_ancestor_fields_union_in_display_order() {
        let definitions = vec![
            field(1, NodeRef::Program(ProgramId(10)), 5, 1),
            field(2, NodeRef::Course(CourseId(30)), 2, 2),
            field(3, NodeRef::SubProgram(SubProgramId(20)), 9, 3),
        ];

        let effective = resolve(&course_chain(), &definitions);
        let ids: Vec<_> = effective.iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn display_order_ties_break_by_insertion_sequence_not_id() {
        // Higher id inserted first must still come first on an order tie.
        let definitions = vec![
            field(9, NodeRef::Program(ProgramId(10)), 3, 1),
            field(1, NodeRef::Program(ProgramId(10)), 3, 2),
        ];

        let effective = resolve(&course_chain(), &definitions);
        let ids: Vec<_> = effective.iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![9, 1]);
    }

    #[test]
    fn duplicate_ids_along_the_chain_appear_once() {
        let mut duplicated = field(4, NodeRef::Program(ProgramId(10)), 1, 1);
        let definitions = vec![field(4, NodeRef::Course(CourseId(30)), 1, 1), {
            duplicated.seq = 2;
            duplicated
        }];

        let effective = resolve(&course_chain(), &definitions);
        assert_eq!(effective.len(), 1);
    }

    #[test]
    fn resolution_is_deterministic_across_calls() {
        let definitions = vec![
            field(1, NodeRef::Program(ProgramId(10)), 2, 1),
            field(2, NodeRef::SubProgram(SubProgramId(20)), 1, 2),
            field(3, NodeRef::Course(CourseId(30)), 2, 3),
        ];

        let first = resolve(&course_chain(), &definitions);
        let second = resolve(&course_chain(), &definitions);
        assert_eq!(first, second);
    }
}
