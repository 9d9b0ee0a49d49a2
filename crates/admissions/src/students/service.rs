use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::info;

use crate::catalog::{CatalogError, CatalogStore, NodeRef};
use crate::forms::{materialize, FormSpec};
use crate::intake::{
    reconcile, IntakeConfig, IntakeError, RawSubmission, ReconcileMode, ReconciledSubmission,
    SynonymTable,
};

use super::domain::{
    ApplicationId, ApplicationStatus, Document, DynamicValue, Placement, StudentProfile,
    SubmissionOrigin, TransactionRecord,
};
use super::lifecycle::{self, LifecycleError};
use super::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationView, FileStore, FileStoreError,
    ListFilter, RepositoryError,
};

static ADMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = ADMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("ADM-{id:06}"))
}

/// Service composing the catalog, the synonym-driven reconciler, the
/// application repository, and external file storage. One submission is one
/// atomic unit: reconciliation and file storage happen before the single
/// repository insert, so a failing submission persists nothing.
pub struct AdmissionsService<R, F> {
    catalog: Arc<RwLock<CatalogStore>>,
    repository: Arc<R>,
    files: Arc<F>,
    synonyms: SynonymTable,
    intake: IntakeConfig,
}

impl<R, F> AdmissionsService<R, F>
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    pub fn new(
        catalog: Arc<RwLock<CatalogStore>>,
        repository: Arc<R>,
        files: Arc<F>,
        intake: IntakeConfig,
    ) -> Self {
        let synonyms = intake.synonym_table();
        Self {
            catalog,
            repository,
            files,
            synonyms,
            intake,
        }
    }

    pub fn catalog(&self) -> Arc<RwLock<CatalogStore>> {
        self.catalog.clone()
    }

    /// Materialize the form for a hierarchy placement. Shared verbatim by the
    /// admin preview, the internal sales form, and the public wizard.
    pub fn form_for(&self, placement: Placement) -> Result<FormSpec, AdmissionsError> {
        let catalog = self.catalog.read().expect("catalog lock poisoned");
        validate_placement(&catalog, placement)?;
        let fields = catalog.effective_fields(placement.target_node())?;
        Ok(materialize(&fields))
    }

    /// Accept a completed form. Public submissions become leads, staff
    /// submissions start active.
    pub fn submit(
        &self,
        origin: SubmissionOrigin,
        placement: Placement,
        raw: RawSubmission,
    ) -> Result<ApplicationRecord, AdmissionsError> {
        let outcome = {
            let catalog = self.catalog.read().expect("catalog lock poisoned");
            validate_placement(&catalog, placement)?;
            let fields = catalog.effective_fields(placement.target_node())?;
            let form = materialize(&fields);
            reconcile(&form, &raw, &self.synonyms, &self.intake, ReconcileMode::Full)?
        };

        let mut profile = StudentProfile::default();
        for (attribute, value) in &outcome.canonical {
            profile.apply(*attribute, value)?;
        }

        // Only guard on duplicates when the submission carries a real contact;
        // two anonymous placeholder leads must not collide.
        let has_real_contact = profile.email.is_some() || !outcome.used_placeholder.mobile;
        if has_real_contact
            && self
                .repository
                .find_by_contact(&profile.contact_key())?
                .is_some()
        {
            return Err(AdmissionsError::DuplicateContact);
        }

        let application_id = next_application_id();
        let documents = self.store_files(&application_id, &outcome)?;
        let storage_keys: Vec<String> = documents
            .iter()
            .map(|document| document.storage_key.clone())
            .collect();
        let record = ApplicationRecord {
            documents,
            application_id: application_id.clone(),
            placement,
            profile,
            status: match origin {
                SubmissionOrigin::Public => ApplicationStatus::Lead,
                SubmissionOrigin::Staff => ApplicationStatus::Active,
            },
            used_placeholder: outcome.used_placeholder,
            external_lms_id: None,
            dynamic_values: outcome
                .dynamic_values
                .iter()
                .map(|draft| DynamicValue {
                    field: draft.field,
                    label: draft.label.clone(),
                    value: draft.value.clone(),
                })
                .collect(),
            transactions: outcome
                .transaction
                .as_ref()
                .map(transaction_record)
                .into_iter()
                .collect(),
            submitted_at: Utc::now(),
        };

        let stored = match self.repository.insert(record) {
            Ok(stored) => stored,
            Err(err) => {
                // Files were written before the insert; a failed submission
                // must not leave orphaned objects behind. Cleanup failures
                // only get logged, the insert error is the one to surface.
                for key in &storage_keys {
                    if let Err(cleanup) = self.files.remove(key) {
                        info!(storage_key = %key, %cleanup, "file cleanup failed");
                    }
                }
                return Err(err.into());
            }
        };
        info!(
            application = %stored.application_id,
            status = %stored.status,
            placeholder_first_name = stored.used_placeholder.first_name,
            "application recorded"
        );
        Ok(stored)
    }

    /// Apply a partial value map to an existing application under the same
    /// reconciliation rules. Placeholders are never injected here.
    pub fn amend(
        &self,
        id: &ApplicationId,
        raw: RawSubmission,
    ) -> Result<ApplicationRecord, AdmissionsError> {
        let mut record = self.fetch(id)?;
        if matches!(
            record.status,
            ApplicationStatus::Trashed | ApplicationStatus::Purged
        ) {
            return Err(AdmissionsError::Lifecycle(LifecycleError {
                from: record.status,
                action: "amend",
            }));
        }

        let outcome = {
            let catalog = self.catalog.read().expect("catalog lock poisoned");
            let fields = catalog.effective_fields(record.placement.target_node())?;
            let form = materialize(&fields);
            reconcile(
                &form,
                &raw,
                &self.synonyms,
                &self.intake,
                ReconcileMode::Partial,
            )?
        };

        for (attribute, value) in &outcome.canonical {
            record.profile.apply(*attribute, value)?;
        }
        for draft in &outcome.dynamic_values {
            match record
                .dynamic_values
                .iter_mut()
                .find(|existing| existing.field == draft.field)
            {
                Some(existing) => existing.value = draft.value.clone(),
                None => record.dynamic_values.push(DynamicValue {
                    field: draft.field,
                    label: draft.label.clone(),
                    value: draft.value.clone(),
                }),
            }
        }
        // One document per (application, field): a re-uploaded file replaces
        // the earlier one instead of accumulating next to it.
        for document in self.store_files(&record.application_id, &outcome)? {
            match record
                .documents
                .iter_mut()
                .find(|existing| existing.field == document.field)
            {
                Some(existing) => *existing = document,
                None => record.documents.push(document),
            }
        }
        if let Some(draft) = &outcome.transaction {
            record.transactions.push(transaction_record(draft));
        }

        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn activate(&self, id: &ApplicationId) -> Result<ApplicationRecord, AdmissionsError> {
        self.transition(id, lifecycle::activate)
    }

    pub fn trash(&self, id: &ApplicationId) -> Result<ApplicationRecord, AdmissionsError> {
        self.transition(id, lifecycle::trash)
    }

    pub fn restore(&self, id: &ApplicationId) -> Result<ApplicationRecord, AdmissionsError> {
        self.transition(id, lifecycle::restore)
    }

    /// Irreversible. Only trashed records may be purged, which forces the
    /// explicit two-step delete.
    pub fn purge(&self, id: &ApplicationId) -> Result<(), AdmissionsError> {
        let record = self.fetch(id)?;
        lifecycle::purge(record.status)?;
        self.repository.remove(id)?;
        info!(application = %id, "application purged");
        Ok(())
    }

    /// Idempotently link (or relink) an external LMS identity.
    pub fn link_external_id(
        &self,
        id: &ApplicationId,
        external_id: &str,
    ) -> Result<ApplicationRecord, AdmissionsError> {
        let mut record = self.fetch(id)?;
        record.external_lms_id = Some(external_id.trim().to_string());
        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationView, AdmissionsError> {
        let record = self.fetch(id)?;
        Ok(self.view(&record))
    }

    pub fn list(&self, filter: ListFilter) -> Result<Vec<ApplicationView>, AdmissionsError> {
        let records = self.repository.list(filter)?;
        Ok(records.iter().map(|record| self.view(record)).collect())
    }

    fn view(&self, record: &ApplicationRecord) -> ApplicationView {
        let catalog = self.catalog.read().expect("catalog lock poisoned");
        record.view_with(|field| catalog.field(field).is_some())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<ApplicationRecord, AdmissionsError> {
        Ok(self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?)
    }

    fn transition(
        &self,
        id: &ApplicationId,
        step: fn(ApplicationStatus) -> Result<ApplicationStatus, LifecycleError>,
    ) -> Result<ApplicationRecord, AdmissionsError> {
        let mut record = self.fetch(id)?;
        record.status = step(record.status)?;
        self.repository.update(record.clone())?;
        info!(application = %id, status = %record.status, "lifecycle transition");
        Ok(record)
    }

    fn store_files(
        &self,
        id: &ApplicationId,
        outcome: &ReconciledSubmission,
    ) -> Result<Vec<Document>, AdmissionsError> {
        let mut documents = Vec::with_capacity(outcome.documents.len());
        for draft in &outcome.documents {
            let storage_key = self.files.store(id, draft.field, &draft.file)?;
            documents.push(Document {
                field: draft.field,
                document_type: draft.document_type.clone(),
                storage_key,
            });
        }
        Ok(documents)
    }
}

fn transaction_record(draft: &crate::intake::TransactionDraft) -> TransactionRecord {
    TransactionRecord {
        transaction_id: draft.transaction_id.clone(),
        amount: draft.amount.unwrap_or(0.0),
        recorded_at: Utc::now(),
    }
}

/// Check a full hierarchy path for consistency: every named node must exist
/// and belong to the node above it.
fn validate_placement(catalog: &CatalogStore, placement: Placement) -> Result<(), CatalogError> {
    let program = catalog
        .program(placement.program)
        .ok_or(CatalogError::NodeNotFound(NodeRef::Program(placement.program)))?;

    if let Some(sub_program_id) = placement.sub_program {
        let sub_program = catalog
            .sub_program(sub_program_id)
            .ok_or(CatalogError::NodeNotFound(NodeRef::SubProgram(sub_program_id)))?;
        if sub_program.program != program.id {
            return Err(CatalogError::Validation {
                field: "sub_program",
                reason: format!("sub_program {sub_program_id} does not belong to program {}", program.id),
            });
        }
        if let Some(course_id) = placement.course {
            let course = catalog
                .course(course_id)
                .ok_or(CatalogError::NodeNotFound(NodeRef::Course(course_id)))?;
            if course.sub_program != sub_program.id {
                return Err(CatalogError::Validation {
                    field: "course",
                    reason: format!(
                        "course {course_id} does not belong to sub_program {sub_program_id}"
                    ),
                });
            }
        }
    } else if placement.course.is_some() {
        return Err(CatalogError::Validation {
            field: "course",
            reason: "a course placement requires its sub_program".to_string(),
        });
    }
    Ok(())
}

/// Error raised by the admissions service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Files(#[from] FileStoreError),
    #[error("an application already exists for this mobile/email")]
    DuplicateContact,
}
