use crate::cli::ServeArgs;
use crate::infra::{
    seed_demo_portfolio, AppState, InMemoryAssessmentHistory, InMemoryAuditLog,
    InMemoryCertificateStore, InMemorySupplierDirectory,
};
use crate::routes::with_risk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use supplier_risk::config::{AppConfig, AppEnvironment};
use supplier_risk::error::AppError;
use supplier_risk::risk::{BoostedScorer, RiskEngine, ScorerSelection};
use supplier_risk::telemetry;
use tracing::info;

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

    let directory = Arc::new(InMemorySupplierDirectory::default());
    let certificates = Arc::new(InMemoryCertificateStore::default());
    let audits = Arc::new(InMemoryAuditLog::default());
    let history = Arc::new(InMemoryAssessmentHistory::default());

    if config.environment == AppEnvironment::Development {
        let seeded = seed_demo_portfolio(&directory, &certificates, &audits);
        info!(suppliers = seeded.len(), "seeded demo supplier portfolio");
    }

    let scorer = BoostedScorer::load_or_bootstrap(config.engine.model_path.as_deref());
    let engine = Arc::new(RiskEngine::new(
        directory,
        certificates,
        audits,
        history,
        ScorerSelection::new(Some(Arc::new(scorer))),
    ));

    let app = with_risk_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "supplier risk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
