use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use dosmicos_hiring::admin::{admin_router, AdminService};
use dosmicos_hiring::applications::{
    application_router, ApplicationService, ApplicationStore, ResumeStorage,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_hiring_routes<S, R>(
    applications: Arc<ApplicationService<S, R>>,
    admin: Arc<AdminService<S>>,
) -> axum::Router
where
    S: ApplicationStore + 'static,
    R: ResumeStorage + 'static,
{
    application_router(applications)
        .merge(admin_router(admin))
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
    use crate::infra::{InMemoryApplicationStore, LocalResumeStorage};
    use axum::body::Body;
    use axum::http::Request;
    use dosmicos_hiring::admin::AdminCredentials;
    use dosmicos_hiring::config::ReportingConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let store = Arc::new(InMemoryApplicationStore::default());
        let resumes_dir = std::env::temp_dir().join(format!(
            "dosmicos-routes-{}-{}",
            std::process::id(),
            ready
        ));
        let resumes = Arc::new(
            LocalResumeStorage::open(resumes_dir, "http://127.0.0.1:3000").expect("resume dir"),
        );
        let applications = Arc::new(ApplicationService::new(store.clone(), resumes));
        let admin = Arc::new(AdminService::new(
            store,
            Some(AdminCredentials::from_password("talento@dosmicos.co", "clave")),
            ReportingConfig::default(),
        ));

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        with_hiring_routes(applications, admin).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let payload = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, payload)
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (status, payload) = status_of(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, payload) = status_of(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload["status"], "initializing");

        let (status, payload) = status_of(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["status"], "ready");
    }

    #[tokio::test]
    async fn candidate_and_admin_routes_share_one_router() {
        let (status, payload) = status_of(app(true), "/api/v1/admin/session").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["authenticated"], false);

        let response = app(true)
            .oneshot(
                Request::post("/api/v1/wizards")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
