//! Hierarchy catalog: Programs own SubPrograms own Courses, with cascade
//! deletion that also sweeps attached field definitions.

mod domain;
pub mod router;
mod store;

pub use domain::{
    CatalogError, Course, CourseId, CourseView, NodeRef, Program, ProgramId, ProgramTree,
    SubProgram, SubProgramId, SubProgramTree,
};
pub use router::catalog_router;
pub use store::CatalogStore;
