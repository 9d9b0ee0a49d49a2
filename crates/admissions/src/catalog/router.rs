use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::fields::{FieldId, FieldType};

use super::domain::{CatalogError, CourseId, NodeRef, ProgramId, SubProgramId};
use super::store::CatalogStore;

type SharedCatalog = Arc<RwLock<CatalogStore>>;

/// HTTP surface for the hierarchy and the field schema builder.
pub fn catalog_router(catalog: SharedCatalog) -> Router {
    Router::new()
        .route("/api/v1/catalog/tree", get(tree_handler))
        .route("/api/v1/catalog/programs", post(create_program_handler))
        .route(
            "/api/v1/catalog/programs/:program_id",
            delete(delete_program_handler),
        )
        .route(
            "/api/v1/catalog/programs/:program_id/sub-programs",
            post(create_sub_program_handler),
        )
        .route(
            "/api/v1/catalog/sub-programs/:sub_program_id",
            delete(delete_sub_program_handler),
        )
        .route(
            "/api/v1/catalog/sub-programs/:sub_program_id/courses",
            post(create_course_handler),
        )
        .route(
            "/api/v1/catalog/courses/:course_id",
            delete(delete_course_handler),
        )
        .route(
            "/api/v1/fields",
            post(create_field_handler).get(effective_fields_handler),
        )
        .route("/api/v1/fields/:field_id", delete(delete_field_handler))
        .with_state(catalog)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameRequest {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseRequest {
    pub(crate) name: String,
    pub(crate) fee_amount: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldRequest {
    pub(crate) attachment: NodeRef,
    pub(crate) label: String,
    pub(crate) field_type: FieldType,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) display_order: u32,
    #[serde(default)]
    pub(crate) required: bool,
}

/// Node selector for effective-field queries: the full path is passed
/// explicitly, most specific component wins.
#[derive(Debug, Deserialize)]
pub(crate) struct NodeQuery {
    pub(crate) program: Option<ProgramId>,
    pub(crate) sub_program: Option<SubProgramId>,
    pub(crate) course: Option<CourseId>,
}

impl NodeQuery {
    fn node(&self) -> Option<NodeRef> {
        if let Some(course) = self.course {
            Some(NodeRef::Course(course))
        } else if let Some(sub_program) = self.sub_program {
            Some(NodeRef::SubProgram(sub_program))
        } else {
            self.program.map(NodeRef::Program)
        }
    }
}

pub(crate) async fn tree_handler(State(catalog): State<SharedCatalog>) -> Response {
    let catalog = catalog.read().expect("catalog lock poisoned");
    (StatusCode::OK, axum::Json(catalog.tree())).into_response()
}

pub(crate) async fn create_program_handler(
    State(catalog): State<SharedCatalog>,
    axum::Json(request): axum::Json<NameRequest>,
) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.create_program(&request.name) {
        Ok(program) => (StatusCode::CREATED, axum::Json(program)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_sub_program_handler(
    State(catalog): State<SharedCatalog>,
    Path(program_id): Path<u64>,
    axum::Json(request): axum::Json<NameRequest>,
) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.create_sub_program(ProgramId(program_id), &request.name) {
        Ok(sub_program) => (StatusCode::CREATED, axum::Json(sub_program)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_course_handler(
    State(catalog): State<SharedCatalog>,
    Path(sub_program_id): Path<u64>,
    axum::Json(request): axum::Json<CourseRequest>,
) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.create_course(SubProgramId(sub_program_id), &request.name, request.fee_amount) {
        Ok(course) => (StatusCode::CREATED, axum::Json(course)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_program_handler(
    State(catalog): State<SharedCatalog>,
    Path(program_id): Path<u64>,
) -> Response {
    delete_node(&catalog, NodeRef::Program(ProgramId(program_id)))
}

pub(crate) async fn delete_sub_program_handler(
    State(catalog): State<SharedCatalog>,
    Path(sub_program_id): Path<u64>,
) -> Response {
    delete_node(&catalog, NodeRef::SubProgram(SubProgramId(sub_program_id)))
}

pub(crate) async fn delete_course_handler(
    State(catalog): State<SharedCatalog>,
    Path(course_id): Path<u64>,
) -> Response {
    delete_node(&catalog, NodeRef::Course(CourseId(course_id)))
}

pub(crate) async fn create_field_handler(
    State(catalog): State<SharedCatalog>,
    axum::Json(request): axum::Json<FieldRequest>,
) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.create_field(
        request.attachment,
        &request.label,
        request.field_type,
        request.options,
        request.display_order,
        request.required,
    ) {
        Ok(definition) => (StatusCode::CREATED, axum::Json(definition)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_field_handler(
    State(catalog): State<SharedCatalog>,
    Path(field_id): Path<u64>,
) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.delete_field(FieldId(field_id)) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "status": "deleted" }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn effective_fields_handler(
    State(catalog): State<SharedCatalog>,
    Query(query): Query<NodeQuery>,
) -> Response {
    let Some(node) = query.node() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({ "error": "one of program, sub_program, course is required" })),
        )
            .into_response();
    };
    let catalog = catalog.read().expect("catalog lock poisoned");
    match catalog.effective_fields(node) {
        Ok(fields) => (StatusCode::OK, axum::Json(fields)).into_response(),
        Err(error) => error_response(error),
    }
}

fn delete_node(catalog: &SharedCatalog, node: NodeRef) -> Response {
    let mut catalog = catalog.write().expect("catalog lock poisoned");
    match catalog.delete_node(node) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "status": "deleted" }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CatalogError) -> Response {
    let status = match &error {
        CatalogError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::NodeNotFound(_) | CatalogError::FieldNotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
