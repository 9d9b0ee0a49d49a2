//! Admissions CRM core.
//!
//! The library is organized around the flow of one application: the
//! [`catalog`] holds the Program → SubProgram → Course hierarchy and the field
//! definitions attached to it, [`fields`] resolves inheritance into effective
//! field sets, [`forms`] materializes those into the typed description shared
//! by every UI surface, [`intake`] reconciles submitted values onto canonical
//! Student attributes, and [`students`] persists the resulting application and
//! walks it through its lifecycle.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod forms;
pub mod intake;
pub mod students;
pub mod telemetry;
