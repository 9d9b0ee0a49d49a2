//! Submission reconciliation: free-text field labels are matched against a
//! synonym table so canonical Student attributes stay populated even when the
//! data arrives through admin-defined dynamic fields.

mod config;
pub mod mapping;
mod normalizer;
mod reconciler;

pub use config::{IntakeConfig, PLACEHOLDER_FIRST_NAME, PLACEHOLDER_MOBILE};
pub use mapping::{SynonymTable, DEFAULT_SYNONYMS};
pub use reconciler::{
    reconcile, DocumentDraft, DynamicValueDraft, FilePayload, IntakeError, PlaceholderFlags,
    RawSubmission, ReconcileMode, ReconciledSubmission, TransactionDraft,
};

pub(crate) use reconciler::parse_dob;
