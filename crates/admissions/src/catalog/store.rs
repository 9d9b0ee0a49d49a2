use std::collections::HashSet;

use crate::fields::{resolver, FieldDefinition, FieldId, FieldType};

use super::domain::{
    slugify, CatalogError, Course, CourseId, CourseView, NodeRef, Program, ProgramId,
    ProgramTree, SubProgram, SubProgramId, SubProgramTree,
};

/// In-memory catalog of Programs, SubPrograms, Courses, and the field
/// definitions attached to them. Collections keep insertion order, which is
/// what the field resolver's tie-breaking relies on.
///
/// The store is single-writer; callers that share it across requests wrap it
/// in a lock (see the API service).
#[derive(Debug, Default)]
pub struct CatalogStore {
    programs: Vec<Program>,
    sub_programs: Vec<SubProgram>,
    courses: Vec<Course>,
    definitions: Vec<FieldDefinition>,
    next_program: u64,
    next_sub_program: u64,
    next_course: u64,
    next_field: u64,
    next_seq: u64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_program(&mut self, name: &str) -> Result<Program, CatalogError> {
        let name = non_empty("name", name)?;
        let slug = self.unique_slug(&name);
        self.next_program += 1;
        let program = Program {
            id: ProgramId(self.next_program),
            name,
            slug,
        };
        self.programs.push(program.clone());
        Ok(program)
    }

    pub fn create_sub_program(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<SubProgram, CatalogError> {
        let name = non_empty("name", name)?;
        if self.program(program).is_none() {
            return Err(CatalogError::NodeNotFound(NodeRef::Program(program)));
        }
        self.next_sub_program += 1;
        let sub_program = SubProgram {
            id: SubProgramId(self.next_sub_program),
            program,
            name,
        };
        self.sub_programs.push(sub_program.clone());
        Ok(sub_program)
    }

    pub fn create_course(
        &mut self,
        sub_program: SubProgramId,
        name: &str,
        fee_amount: i64,
    ) -> Result<Course, CatalogError> {
        let name = non_empty("name", name)?;
        if self.sub_program(sub_program).is_none() {
            return Err(CatalogError::NodeNotFound(NodeRef::SubProgram(sub_program)));
        }
        if fee_amount < 0 {
            return Err(CatalogError::validation(
                "fee_amount",
                "fee must not be negative",
            ));
        }
        self.next_course += 1;
        let course = Course {
            id: CourseId(self.next_course),
            sub_program,
            name,
            fee_amount: fee_amount as u64,
        };
        self.courses.push(course.clone());
        Ok(course)
    }

    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.iter().find(|program| program.id == id)
    }

    pub fn program_by_slug(&self, slug: &str) -> Option<&Program> {
        self.programs.iter().find(|program| program.slug == slug)
    }

    pub fn sub_program(&self, id: SubProgramId) -> Option<&SubProgram> {
        self.sub_programs.iter().find(|sp| sp.id == id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    /// Delete a node and everything under it: descendant nodes plus every
    /// field definition attached anywhere in the removed subtree.
    pub fn delete_node(&mut self, node: NodeRef) -> Result<(), CatalogError> {
        if !self.node_exists(node) {
            return Err(CatalogError::NodeNotFound(node));
        }

        let removed = self.subtree(node);
        self.programs
            .retain(|program| !removed.contains(&NodeRef::Program(program.id)));
        self.sub_programs
            .retain(|sp| !removed.contains(&NodeRef::SubProgram(sp.id)));
        self.courses
            .retain(|course| !removed.contains(&NodeRef::Course(course.id)));
        self.definitions
            .retain(|definition| !removed.contains(&definition.attachment));
        Ok(())
    }

    /// Materialize the whole hierarchy in one call for explorer UIs.
    pub fn tree(&self) -> Vec<ProgramTree> {
        self.programs
            .iter()
            .map(|program| ProgramTree {
                id: program.id,
                name: program.name.clone(),
                slug: program.slug.clone(),
                sub_programs: self
                    .sub_programs
                    .iter()
                    .filter(|sp| sp.program == program.id)
                    .map(|sp| SubProgramTree {
                        id: sp.id,
                        name: sp.name.clone(),
                        courses: self
                            .courses
                            .iter()
                            .filter(|course| course.sub_program == sp.id)
                            .map(|course| CourseView {
                                id: course.id,
                                name: course.name.clone(),
                                fee_amount: course.fee_amount,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Target-first chain of a node and its ancestors up to the owning
    /// Program.
    pub fn ancestor_chain(&self, node: NodeRef) -> Result<Vec<NodeRef>, CatalogError> {
        match node {
            NodeRef::Program(id) => {
                self.program(id)
                    .ok_or(CatalogError::NodeNotFound(node))?;
                Ok(vec![node])
            }
            NodeRef::SubProgram(id) => {
                let sp = self
                    .sub_program(id)
                    .ok_or(CatalogError::NodeNotFound(node))?;
                Ok(vec![node, NodeRef::Program(sp.program)])
            }
            NodeRef::Course(id) => {
                let course = self.course(id).ok_or(CatalogError::NodeNotFound(node))?;
                let sp = self
                    .sub_program(course.sub_program)
                    .ok_or(CatalogError::NodeNotFound(NodeRef::SubProgram(
                        course.sub_program,
                    )))?;
                Ok(vec![
                    node,
                    NodeRef::SubProgram(sp.id),
                    NodeRef::Program(sp.program),
                ])
            }
        }
    }

    pub fn create_field(
        &mut self,
        attachment: NodeRef,
        label: &str,
        field_type: FieldType,
        options: Vec<String>,
        display_order: u32,
        required: bool,
    ) -> Result<FieldDefinition, CatalogError> {
        let label = non_empty("label", label)?;
        if !self.node_exists(attachment) {
            return Err(CatalogError::NodeNotFound(attachment));
        }
        match field_type {
            FieldType::Dropdown if options.is_empty() => {
                return Err(CatalogError::validation(
                    "options",
                    "dropdown fields need at least one option",
                ));
            }
            FieldType::Dropdown => {}
            _ if !options.is_empty() => {
                return Err(CatalogError::validation(
                    "options",
                    format!("{} fields do not take options", field_type.label()),
                ));
            }
            _ => {}
        }

        self.next_field += 1;
        self.next_seq += 1;
        let definition = FieldDefinition {
            id: FieldId(self.next_field),
            attachment,
            label,
            field_type,
            options,
            display_order,
            required,
            seq: self.next_seq,
        };
        self.definitions.push(definition.clone());
        Ok(definition)
    }

    /// Remove a definition. Dynamic values that already reference it stay
    /// behind as historical data; read paths render them as orphaned.
    pub fn delete_field(&mut self, id: FieldId) -> Result<(), CatalogError> {
        let before = self.definitions.len();
        self.definitions.retain(|definition| definition.id != id);
        if self.definitions.len() == before {
            return Err(CatalogError::FieldNotFound(id));
        }
        Ok(())
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    /// Definitions attached directly to a node, in insertion order.
    pub fn fields_attached_to(&self, node: NodeRef) -> Vec<FieldDefinition> {
        self.definitions
            .iter()
            .filter(|definition| definition.attachment == node)
            .cloned()
            .collect()
    }

    /// The inheritance-applied, ordered field set for a node. Read-consistent
    /// per call: it observes the store as it is right now.
    pub fn effective_fields(&self, node: NodeRef) -> Result<Vec<FieldDefinition>, CatalogError> {
        let chain = self.ancestor_chain(node)?;
        Ok(resolver::resolve(&chain, &self.definitions))
    }

    fn node_exists(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Program(id) => self.program(id).is_some(),
            NodeRef::SubProgram(id) => self.sub_program(id).is_some(),
            NodeRef::Course(id) => self.course(id).is_some(),
        }
    }

    /// All nodes in the subtree rooted at `node`, including `node` itself.
    fn subtree(&self, node: NodeRef) -> HashSet<NodeRef> {
        let mut nodes = HashSet::new();
        nodes.insert(node);
        if let NodeRef::Program(program) = node {
            for sp in self.sub_programs.iter().filter(|sp| sp.program == program) {
                nodes.insert(NodeRef::SubProgram(sp.id));
            }
        }
        let sub_program_ids: HashSet<SubProgramId> = nodes
            .iter()
            .filter_map(|node| match node {
                NodeRef::SubProgram(id) => Some(*id),
                _ => None,
            })
            .collect();
        for course in self
            .courses
            .iter()
            .filter(|course| sub_program_ids.contains(&course.sub_program))
        {
            nodes.insert(NodeRef::Course(course.id));
        }
        nodes
    }

    fn unique_slug(&self, name: &str) -> String {
        let base = slugify(name);
        let base = if base.is_empty() { "program".to_string() } else { base };
        if self.program_by_slug(&base).is_none() {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}-{counter}");
            if self.program_by_slug(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (CatalogStore, ProgramId, SubProgramId, CourseId) {
        let mut store = CatalogStore::new();
        let program = store.create_program("Arts").expect("program");
        let sub_program = store
            .create_sub_program(program.id, "Dance")
            .expect("sub-program");
        let course = store
            .create_course(sub_program.id, "Bharatanatyam Diploma", 45_000)
            .expect("course");
        (store, program.id, sub_program.id, course.id)
    }

    #[test]
    fn create_program_rejects_empty_name() {
        let mut store = CatalogStore::new();
        let err = store.create_program("   ").unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "name", .. }));
    }

    #[test]
    fn create_course_rejects_negative_fee() {
        let (mut store, _, sub_program, _) = seeded();
        let err = store.create_course(sub_program, "Evening Batch", -1).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation { field: "fee_amount", .. }
        ));
    }

    #[test]
    fn create_sub_program_requires_existing_parent() {
        let mut store = CatalogStore::new();
        let err = store.create_sub_program(ProgramId(42), "Dance").unwrap_err();
        assert_eq!(
            err,
            CatalogError::NodeNotFound(NodeRef::Program(ProgramId(42)))
        );
    }

    #[test]
    fn slugs_are_unique_across_same_named_programs() {
        let mut store = CatalogStore::new();
        let first = store.create_program("Arts").expect("first");
        let second = store.create_program("Arts").expect("second");
        assert_eq!(first.slug, "arts");
        assert_eq!(second.slug, "arts-2");
    }

    #[test]
    fn deleting_a_program_cascades_to_descendants_and_their_fields() {
        let (mut store, program, sub_program, course) = seeded();
        store
            .create_field(
                NodeRef::Program(program),
                "Full Name",
                FieldType::Text,
                Vec::new(),
                1,
                true,
            )
            .expect("program field");
        store
            .create_field(
                NodeRef::SubProgram(sub_program),
                "Audition Date",
                FieldType::Date,
                Vec::new(),
                2,
                false,
            )
            .expect("sub-program field");
        let course_field = store
            .create_field(
                NodeRef::Course(course),
                "Costume Size",
                FieldType::Dropdown,
                vec!["S".into(), "M".into(), "L".into()],
                3,
                false,
            )
            .expect("course field");

        store.delete_node(NodeRef::Program(program)).expect("delete");

        assert!(store.program(program).is_none());
        assert!(store.sub_program(sub_program).is_none());
        assert!(store.course(course).is_none());
        assert!(store.field(course_field.id).is_none());
        assert!(store.tree().is_empty());
    }

    #[test]
    fn deleting_a_sub_program_keeps_sibling_courses() {
        let (mut store, program, sub_program, course) = seeded();
        let other = store.create_sub_program(program, "Music").expect("sibling");
        let other_course = store
            .create_course(other.id, "Vocal Foundation", 30_000)
            .expect("sibling course");

        store
            .delete_node(NodeRef::SubProgram(sub_program))
            .expect("delete");

        assert!(store.course(course).is_none());
        assert!(store.course(other_course.id).is_some());
    }

    #[test]
    fn dropdown_fields_require_options_and_others_reject_them() {
        let (mut store, program, _, _) = seeded();
        let node = NodeRef::Program(program);

        let err = store
            .create_field(node, "City", FieldType::Dropdown, Vec::new(), 1, false)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "options", .. }));

        let err = store
            .create_field(
                node,
                "Remarks",
                FieldType::Text,
                vec!["unexpected".into()],
                1,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "options", .. }));
    }

    #[test]
    fn field_attachment_must_reference_a_live_node() {
        let (mut store, _, _, _) = seeded();
        let err = store
            .create_field(
                NodeRef::Course(CourseId(404)),
                "Full Name",
                FieldType::Text,
                Vec::new(),
                1,
                true,
            )
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::NodeNotFound(NodeRef::Course(CourseId(404)))
        );
    }

    #[test]
    fn effective_fields_inherit_down_the_chain() {
        let (mut store, program, sub_program, course) = seeded();
        let program_field = store
            .create_field(
                NodeRef::Program(program),
                "Mobile Number",
                FieldType::Text,
                Vec::new(),
                1,
                true,
            )
            .expect("program field");
        let sub_field = store
            .create_field(
                NodeRef::SubProgram(sub_program),
                "Audition Date",
                FieldType::Date,
                Vec::new(),
                2,
                false,
            )
            .expect("sub field");

        let for_sub = store
            .effective_fields(NodeRef::SubProgram(sub_program))
            .expect("resolve");
        assert_eq!(
            for_sub.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![program_field.id, sub_field.id]
        );

        // SubProgram-level fields flow down to the course as well.
        let for_course = store
            .effective_fields(NodeRef::Course(course))
            .expect("resolve");
        assert_eq!(
            for_course.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![program_field.id, sub_field.id]
        );
    }

    #[test]
    fn effective_fields_do_not_leak_across_programs() {
        let (mut store, program, _, _) = seeded();
        let other = store.create_program("Commerce").expect("other program");
        store
            .create_field(
                NodeRef::Program(other.id),
                "GST Number",
                FieldType::Text,
                Vec::new(),
                1,
                false,
            )
            .expect("other field");

        let fields = store
            .effective_fields(NodeRef::Program(program))
            .expect("resolve");
        assert!(fields.is_empty());
    }

    #[test]
    fn delete_field_removes_only_the_definition() {
        let (mut store, program, _, _) = seeded();
        let field = store
            .create_field(
                NodeRef::Program(program),
                "Full Name",
                FieldType::Text,
                Vec::new(),
                1,
                true,
            )
            .expect("field");

        store.delete_field(field.id).expect("delete");
        assert!(store.field(field.id).is_none());
        assert_eq!(
            store.delete_field(field.id),
            Err(CatalogError::FieldNotFound(field.id))
        );
    }
}
