use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use admissions::students::{
    application_router, AdmissionsService, ApplicationRepository, FileStore,
};

use crate::infra::AppState;

/// Compose the catalog admin surface, the application surface, and the
/// operational endpoints into one router.
pub(crate) fn with_admission_routes<R, F>(service: Arc<AdmissionsService<R, F>>) -> axum::Router
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    admissions::catalog::catalog_router(service.catalog())
        .merge(application_router(service))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, OnceLock, RwLock};
    use tower::ServiceExt;

    use admissions::catalog::CatalogStore;
    use admissions::intake::IntakeConfig;
    use admissions::students::AdmissionsService;
    use metrics_exporter_prometheus::PrometheusHandle;

    use crate::infra::{InMemoryApplicationRepository, InMemoryFileStore};

    // `pair()` installs the process-global metrics recorder, so the handle is
    // built once and shared across every test in the binary.
    fn shared_metrics() -> Arc<PrometheusHandle> {
        static HANDLE: OnceLock<Arc<PrometheusHandle>> = OnceLock::new();
        HANDLE
            .get_or_init(|| {
                let (_, handle) = axum_prometheus::PrometheusMetricLayer::pair();
                Arc::new(handle)
            })
            .clone()
    }

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: shared_metrics(),
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let response = readiness_endpoint(Extension(test_state(false))).await;
        assert_eq!(
            response.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let response = readiness_endpoint(Extension(test_state(true))).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn composed_router_serves_catalog_and_applications() {
        let catalog = Arc::new(RwLock::new(CatalogStore::new()));
        let service = Arc::new(AdmissionsService::new(
            catalog,
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(InMemoryFileStore::default()),
            IntakeConfig::default(),
        ));
        let router = with_admission_routes(service).layer(Extension(test_state(true)));

        let created = router
            .clone()
            .oneshot(
                axum::http::Request::post("/api/v1/catalog/programs")
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(
                        serde_json::to_vec(&json!({ "name": "Arts" })).expect("body"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(created.status(), StatusCode::CREATED);

        let listing = router
            .oneshot(
                axum::http::Request::get("/api/v1/applications")
                    .body(axum::body::Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(listing.status(), StatusCode::OK);
    }
}
