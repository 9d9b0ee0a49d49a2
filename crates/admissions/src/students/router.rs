use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::catalog::CatalogError;
use crate::intake::RawSubmission;

use super::domain::{ApplicationId, Placement, SubmissionOrigin};
use super::repository::{ApplicationRepository, FileStore, ListFilter, RepositoryError};
use super::service::{AdmissionsError, AdmissionsService};

/// HTTP surface for forms, submissions, and application lifecycle.
pub fn application_router<R, F>(service: Arc<AdmissionsService<R, F>>) -> Router
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R, F>).get(list_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<R, F>).patch(amend_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id/activate",
            post(activate_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id/trash",
            post(trash_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id/restore",
            post(restore_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id/purge",
            post(purge_handler::<R, F>),
        )
        .route(
            "/api/v1/applications/:application_id/link-lms",
            post(link_lms_handler::<R, F>),
        )
        .route("/api/v1/forms", get(form_handler::<R, F>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub(crate) origin: SubmissionOrigin,
    pub(crate) placement: Placement,
    #[serde(default)]
    pub(crate) submission: RawSubmission,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkLmsRequest {
    pub(crate) external_id: String,
}

pub(crate) async fn submit_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.submit(request.origin, request.placement, request.submission) {
        Ok(record) => {
            let view = service.get(&record.application_id);
            match view {
                Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
                Err(error) => error_response(error),
            }
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn form_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Query(placement): Query<Placement>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.form_for(placement) {
        Ok(form) => (StatusCode::OK, axum::Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Query(filter): Query<ListFilter>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.list(filter) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn amend_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
    axum::Json(raw): axum::Json<RawSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.amend(&id, raw).and_then(|_| service.get(&id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn activate_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    transition_response(service.activate(&ApplicationId(application_id)))
}

pub(crate) async fn trash_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    transition_response(service.trash(&ApplicationId(application_id)))
}

pub(crate) async fn restore_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    transition_response(service.restore(&ApplicationId(application_id)))
}

pub(crate) async fn purge_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.purge(&ApplicationId(application_id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "status": "purged" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn link_lms_handler<R, F>(
    State(service): State<Arc<AdmissionsService<R, F>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<LinkLmsRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    transition_response(service.link_external_id(&ApplicationId(application_id), &request.external_id))
}

fn transition_response(
    result: Result<super::repository::ApplicationRecord, AdmissionsError>,
) -> Response {
    match result {
        Ok(record) => (
            StatusCode::OK,
            axum::Json(json!({
                "application_id": record.application_id,
                "status": record.status.label(),
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

/// Map service errors onto the API error taxonomy: validation 422, missing
/// 404, illegal state and conflicts 409, infrastructure 500.
pub(crate) fn error_response(error: AdmissionsError) -> Response {
    let status = match &error {
        AdmissionsError::Catalog(CatalogError::Validation { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AdmissionsError::Catalog(_) => StatusCode::NOT_FOUND,
        AdmissionsError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdmissionsError::Lifecycle(_) => StatusCode::CONFLICT,
        AdmissionsError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AdmissionsError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AdmissionsError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AdmissionsError::Files(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AdmissionsError::DuplicateContact => StatusCode::CONFLICT,
    };
    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
