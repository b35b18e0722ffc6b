use axum::{Json, Router, routing::get};
use serde::Serialize;

use super::{AppState, routes};

/// `/health` plus the versioned API, with state attached.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(routes::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness only; the database is not consulted.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    use super::health_handler;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = Router::new().route("/health", get(health_handler));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request must build"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024)
            .await
            .expect("body must be readable");
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }
}
