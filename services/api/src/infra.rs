use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use admissions::fields::FieldId;
use admissions::intake::FilePayload;
use admissions::students::{
    ApplicationId, ApplicationRecord, ApplicationRepository, FileStore, FileStoreError,
    ListFilter, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            guard.insert(record.application_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: ListFilter) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.application_id.cmp(&b.application_id));
        Ok(records)
    }

    fn remove(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn find_by_contact(
        &self,
        contact_key: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.profile.contact_key() == contact_key)
            .cloned())
    }
}

/// Keeps uploaded documents in process memory. Deployments swap this for a
/// blob-store adapter; the storage key contract is the same.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFileStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FileStore for InMemoryFileStore {
    fn store(
        &self,
        application: &ApplicationId,
        field: FieldId,
        payload: &FilePayload,
    ) -> Result<String, FileStoreError> {
        let key = format!("local://{application}/{field}/{}", payload.file_name);
        let mut guard = self.objects.lock().expect("file store mutex poisoned");
        guard.insert(key.clone(), payload.content.clone());
        Ok(key)
    }

    fn remove(&self, storage_key: &str) -> Result<(), FileStoreError> {
        let mut guard = self.objects.lock().expect("file store mutex poisoned");
        guard.remove(storage_key);
        Ok(())
    }
}

impl InMemoryFileStore {
    pub(crate) fn object_count(&self) -> usize {
        self.objects.lock().expect("file store mutex poisoned").len()
    }
}
