use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, LineScanExtractor, UnconfiguredTextGenerator,
};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dynamopro::applications::{ApplicationTracker, ApplicationsState};
use dynamopro::catalog::router::CatalogState;
use dynamopro::catalog::SubsidyCatalog;
use dynamopro::config::AppConfig;
use dynamopro::documents::DocumentProcessor;
use dynamopro::error::AppError;
use dynamopro::matching::MatchEngine;
use dynamopro::summaries::SummaryService;
use dynamopro::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(match &config.catalog.seed_path {
        Some(path) => SubsidyCatalog::from_json_file(path)?,
        None => SubsidyCatalog::with_defaults(),
    });
    info!(subsidies = catalog.len(), "subsidy catalog loaded");

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let tracker = Arc::new(ApplicationTracker::new(
        Arc::clone(&catalog),
        repository,
    ));

    let catalog_state = CatalogState {
        catalog: Arc::clone(&catalog),
        engine: Arc::new(MatchEngine::new(Arc::clone(&catalog))),
        summaries: SummaryService::new(
            Arc::new(UnconfiguredTextGenerator),
            config.textgen.timeout,
        ),
    };
    let applications_state = ApplicationsState {
        catalog,
        tracker,
        processor: DocumentProcessor::new(Arc::new(LineScanExtractor)),
    };

    let app = with_api_routes(catalog_state, applications_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "subsidy engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
