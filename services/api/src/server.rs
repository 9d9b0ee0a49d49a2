use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use admissions::catalog::CatalogStore;
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::intake::IntakeConfig;
use admissions::students::AdmissionsService;
use admissions::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, InMemoryFileStore};
use crate::routes::with_admission_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(RwLock::new(CatalogStore::new()));
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let files = Arc::new(InMemoryFileStore::default());
    let service = Arc::new(AdmissionsService::new(
        catalog,
        repository,
        files,
        IntakeConfig::default(),
    ));

    let app = with_admission_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admissions service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
