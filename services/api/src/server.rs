use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_pipeline_routes;
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::pipeline::{AdmissionsStore, LedgerService, MemoryStore, PHD_USER_TYPE};
use admissions::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());

    // Startup provisioning and the overdue sweep happen here, before any
    // request is served; read handlers never mutate state.
    let phd_type = store.ensure_user_type(PHD_USER_TYPE)?;
    info!(user_type = %phd_type.id.0, "PhD user type provisioned");

    let ledger = LedgerService::new(store.clone(), config.pipeline.reminder_lead_days);
    let swept = ledger.refresh_all(Utc::now().date_naive())?;
    info!(plans_updated = swept, "installment ledger swept for overdue installments");

    let app = with_pipeline_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admissions pipeline service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
