use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProgramId;
use crate::fields::FieldId;
use crate::intake::{FilePayload, PlaceholderFlags};

use super::domain::{
    ApplicationId, ApplicationStatus, Document, DynamicValue, Placement, StudentProfile,
    TransactionRecord,
};

/// Fully-assembled application record. The record owns its dynamic values,
/// documents, and transactions, so a single repository insert persists the
/// whole submission atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub placement: Placement,
    pub profile: StudentProfile,
    pub status: ApplicationStatus,
    pub used_placeholder: PlaceholderFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_lms_id: Option<String>,
    pub dynamic_values: Vec<DynamicValue>,
    pub documents: Vec<Document>,
    pub transactions: Vec<TransactionRecord>,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Build the profile view, marking dynamic values whose definition has
    /// since been deleted. Orphans are historical data, not an error.
    pub fn view_with(&self, field_is_live: impl Fn(FieldId) -> bool) -> ApplicationView {
        ApplicationView {
            application_id: self.application_id.clone(),
            status: self.status.label(),
            placement: self.placement,
            profile: self.profile.clone(),
            used_placeholder: self.used_placeholder,
            external_lms_id: self.external_lms_id.clone(),
            dynamic_values: self
                .dynamic_values
                .iter()
                .map(|value| DynamicValueView {
                    field: value.field,
                    label: if field_is_live(value.field) {
                        value.label.clone()
                    } else {
                        format!("{} (removed field)", value.label)
                    },
                    value: value.value.clone(),
                    orphaned: !field_is_live(value.field),
                })
                .collect(),
            documents: self.documents.clone(),
            transactions: self.transactions.clone(),
            submitted_at: self.submitted_at,
        }
    }
}

/// Per-value view entry; `orphaned` values render read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicValueView {
    pub field: FieldId,
    pub label: String,
    pub value: String,
    pub orphaned: bool,
}

/// Sanitized application representation for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub placement: Placement,
    pub profile: StudentProfile,
    pub used_placeholder: PlaceholderFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_lms_id: Option<String>,
    pub dynamic_values: Vec<DynamicValueView>,
    pub documents: Vec<Document>,
    pub transactions: Vec<TransactionRecord>,
    pub submitted_at: DateTime<Utc>,
}

/// Listing filter. Trashed records are excluded from active listings unless
/// asked for explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub include_trashed: bool,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub program: Option<ProgramId>,
}

impl ListFilter {
    /// Shared predicate so every repository implementation filters the same
    /// way: trashed records stay out of listings unless requested.
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if !self.include_trashed
            && record.status == ApplicationStatus::Trashed
            && self.status != Some(ApplicationStatus::Trashed)
        {
            return false;
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(program) = self.program {
            if record.placement.program != program {
                return false;
            }
        }
        true
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list(&self, filter: ListFilter) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Hard delete; only the service's purge path calls this.
    fn remove(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
    fn find_by_contact(
        &self,
        contact_key: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// External file storage: accepts a payload keyed by (application, field) and
/// returns a retrievable reference.
pub trait FileStore: Send + Sync {
    fn store(
        &self,
        application: &ApplicationId,
        field: FieldId,
        payload: &FilePayload,
    ) -> Result<String, FileStoreError>;

    /// Drop a previously stored object; the service calls this to roll back
    /// files when the submission they belong to never gets persisted.
    fn remove(&self, storage_key: &str) -> Result<(), FileStoreError>;
}

/// File storage failure; surfaces before anything is persisted.
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("file storage unavailable: {0}")]
    Unavailable(String),
}
