use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::infrastructure::settings::Settings;

/// Body size cap, per-request deadline and a process-wide in-flight cap.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                warn!(error = %err, "unhandled middleware error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            settings.http_request_timeout_secs,
        )))
        .layer(GlobalConcurrencyLimitLayer::new(
            settings.http_concurrency_limit,
        ));

    router.layer(layers)
}
