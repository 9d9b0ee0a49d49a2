use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::catalog::{CatalogStore, CourseId, NodeRef, ProgramId, SubProgramId};
use crate::fields::{FieldId, FieldType};
use crate::intake::{FilePayload, IntakeConfig, RawSubmission};
use crate::students::domain::{ApplicationId, Placement};
use crate::students::repository::{
    ApplicationRecord, ApplicationRepository, FileStore, FileStoreError, ListFilter,
    RepositoryError,
};
use crate::students::service::AdmissionsService;

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl ApplicationRepository for MemoryRepository {
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

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("db offline".to_string()))
    }
    fn update(&self, _: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("db offline".to_string()))
    }
    fn fetch(&self, _: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("db offline".to_string()))
    }
    fn list(&self, _: ListFilter) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("db offline".to_string()))
    }
    fn remove(&self, _: &ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("db offline".to_string()))
    }
    fn find_by_contact(&self, _: &str) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }
}

#[derive(Default)]
pub(super) struct MemoryFiles {
    objects: Mutex<Vec<String>>,
}

impl FileStore for MemoryFiles {
    fn store(
        &self,
        application: &ApplicationId,
        field: FieldId,
        payload: &FilePayload,
    ) -> Result<String, FileStoreError> {
        let key = format!("mem://{application}/{field}/{}", payload.file_name);
        self.objects
            .lock()
            .expect("file store mutex poisoned")
            .push(key.clone());
        Ok(key)
    }

    fn remove(&self, storage_key: &str) -> Result<(), FileStoreError> {
        self.objects
            .lock()
            .expect("file store mutex poisoned")
            .retain(|key| key != storage_key);
        Ok(())
    }
}

impl MemoryFiles {
    pub(super) fn object_count(&self) -> usize {
        self.objects.lock().expect("file store mutex poisoned").len()
    }
}

/// Ids seeded by [`seeded_catalog`].
pub(super) struct Fixture {
    pub(super) program: ProgramId,
    pub(super) sub_program: SubProgramId,
    pub(super) course: CourseId,
    pub(super) full_name: FieldId,
    pub(super) whatsapp: FieldId,
    pub(super) aadhar: FieldId,
    pub(super) photo: FieldId,
    pub(super) txn_id: FieldId,
    pub(super) amount: FieldId,
}

pub(super) fn seeded_catalog() -> (Arc<RwLock<CatalogStore>>, Fixture) {
    let mut store = CatalogStore::new();
    let program = store.create_program("Arts").expect("program");
    let sub_program = store
        .create_sub_program(program.id, "Dance")
        .expect("sub-program");
    let course = store
        .create_course(sub_program.id, "Bharatanatyam Diploma", 45_000)
        .expect("course");

    let node = NodeRef::Program(program.id);
    let full_name = store
        .create_field(node, "Full Name", FieldType::Text, Vec::new(), 1, true)
        .expect("field");
    let whatsapp = store
        .create_field(node, "WhatsApp Number", FieldType::Text, Vec::new(), 2, true)
        .expect("field");
    let aadhar = store
        .create_field(node, "Aadhar Number", FieldType::Text, Vec::new(), 3, false)
        .expect("field");
    let photo = store
        .create_field(node, "Passport Photo", FieldType::File, Vec::new(), 4, false)
        .expect("field");
    let txn_id = store
        .create_field(node, "Transaction ID", FieldType::Text, Vec::new(), 5, false)
        .expect("field");
    let amount = store
        .create_field(node, "Amount", FieldType::Number, Vec::new(), 6, false)
        .expect("field");

    let fixture = Fixture {
        program: program.id,
        sub_program: sub_program.id,
        course: course.id,
        full_name: full_name.id,
        whatsapp: whatsapp.id,
        aadhar: aadhar.id,
        photo: photo.id,
        txn_id: txn_id.id,
        amount: amount.id,
    };
    (Arc::new(RwLock::new(store)), fixture)
}

pub(super) fn build_service() -> (
    Arc<AdmissionsService<MemoryRepository, MemoryFiles>>,
    Arc<MemoryRepository>,
    Fixture,
) {
    let (catalog, fixture) = seeded_catalog();
    let repository = Arc::new(MemoryRepository::default());
    let files = Arc::new(MemoryFiles::default());
    let service = Arc::new(AdmissionsService::new(
        catalog,
        repository.clone(),
        files,
        IntakeConfig::default(),
    ));
    (service, repository, fixture)
}

pub(super) fn placement(fixture: &Fixture) -> Placement {
    Placement {
        program: fixture.program,
        sub_program: Some(fixture.sub_program),
        course: Some(fixture.course),
    }
}

pub(super) fn values(entries: &[(FieldId, &str)]) -> RawSubmission {
    RawSubmission {
        canonical: BTreeMap::new(),
        values: entries
            .iter()
            .map(|(id, value)| (*id, value.to_string()))
            .collect(),
        files: BTreeMap::new(),
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json body")
}

pub(super) fn photo_payload() -> FilePayload {
    FilePayload {
        file_name: "photo.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        content: vec![0xff, 0xd8, 0xff],
    }
}
