use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredStore, LocalResumeStorage};
use crate::routes::with_hiring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dosmicos_hiring::admin::{AdminCredentials, AdminService};
use dosmicos_hiring::applications::ApplicationService;
use dosmicos_hiring::config::AppConfig;
use dosmicos_hiring::error::AppError;
use dosmicos_hiring::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let store = Arc::new(ConfiguredStore::open(&config.storage)?);
    let resumes = Arc::new(LocalResumeStorage::open(
        config.storage.resumes_dir(),
        &config.storage.public_base_url,
    )?);

    let credentials = config.admin.as_ref().map(AdminCredentials::from_config);
    if credentials.is_none() {
        warn!("ADMIN_EMAIL/ADMIN_PASSWORD_SHA256 not set; the admin console will refuse every login");
    }

    let application_service = Arc::new(
        ApplicationService::new(store.clone(), resumes).with_idle_ttl(config.wizards.idle_ttl),
    );
    let admin_service = Arc::new(AdminService::new(store, credentials, config.reporting));

    let app = with_hiring_routes(application_service, admin_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        store = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "hiring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
