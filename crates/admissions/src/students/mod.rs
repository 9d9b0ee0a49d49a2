//! Application intake and lifecycle: submissions are reconciled against the
//! materialized form, persisted as one atomic record, and then move through
//! lead → active → trashed → purged.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Address, ApplicationId, ApplicationStatus, Document, DynamicValue, Placement, StudentProfile,
    SubmissionOrigin, TransactionRecord,
};
pub use lifecycle::LifecycleError;
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationView, DynamicValueView, FileStore,
    FileStoreError, ListFilter, RepositoryError,
};
pub use router::application_router;
pub use service::{AdmissionsError, AdmissionsService};
