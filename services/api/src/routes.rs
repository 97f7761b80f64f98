use crate::infra::{AppState, InMemoryApplicationRepository};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use dynamopro::applications::{self, ApplicationsState};
use dynamopro::catalog::router::{router as catalog_router, CatalogState};
use serde_json::json;

/// Versioned API surface plus the operational endpoints.
pub(crate) fn with_api_routes(
    catalog_state: CatalogState,
    applications_state: ApplicationsState<InMemoryApplicationRepository>,
) -> axum::Router {
    let api = catalog_router(catalog_state).merge(applications::router(applications_state));

    axum::Router::new()
        .nest("/api/v1", api)
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
    use crate::infra::{LineScanExtractor, UnconfiguredTextGenerator};
    use axum::body::Body;
    use axum::http::Request;
    use dynamopro::applications::ApplicationTracker;
    use dynamopro::catalog::SubsidyCatalog;
    use dynamopro::documents::DocumentProcessor;
    use dynamopro::matching::MatchEngine;
    use dynamopro::summaries::SummaryService;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, OnceLock};
    use std::time::Duration;
    use tower::ServiceExt;

    // The prometheus recorder is process-global and can only be installed
    // once, so every test shares a single handle.
    fn metrics_handle() -> Arc<metrics_exporter_prometheus::PrometheusHandle> {
        static HANDLE: OnceLock<Arc<metrics_exporter_prometheus::PrometheusHandle>> =
            OnceLock::new();
        Arc::clone(
            HANDLE
                .get_or_init(|| Arc::new(axum_prometheus::PrometheusMetricLayer::pair().1)),
        )
    }

    fn app(ready: bool) -> axum::Router {
        let catalog = Arc::new(SubsidyCatalog::with_defaults());
        let tracker = Arc::new(ApplicationTracker::new(
            Arc::clone(&catalog),
            Arc::new(InMemoryApplicationRepository::default()),
        ));
        let catalog_state = CatalogState {
            catalog: Arc::clone(&catalog),
            engine: Arc::new(MatchEngine::new(Arc::clone(&catalog))),
            summaries: SummaryService::new(
                Arc::new(UnconfiguredTextGenerator),
                Duration::from_secs(1),
            ),
        };
        let applications_state = ApplicationsState {
            catalog,
            tracker,
            processor: DocumentProcessor::new(Arc::new(LineScanExtractor)),
        };

        with_api_routes(catalog_state, applications_state).layer(Extension(AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: metrics_handle(),
        }))
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = app(false)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let initializing = app(false)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(initializing.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = app(true)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_are_mounted_under_the_version_prefix() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/subsidies")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
