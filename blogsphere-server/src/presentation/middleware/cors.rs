use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::infrastructure::settings::Settings;

/// Credentials travel in cookies, so only an explicit origin list is allowed.
pub(crate) fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.iter().any(|origin| origin == "*") {
        return Err(anyhow!(
            "CORS_ORIGINS cannot contain \"*\" with credentialed requests; list the allowed origins"
        ));
    }
    let parsed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("invalid CORS origin: {err}"))?;
    if parsed.is_empty() {
        return Err(anyhow!("CORS_ORIGINS must list at least one origin"));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]))
}

pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    let cors = build_cors_layer(&settings.cors_origins)?;
    Ok(router.layer(cors))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn explicit_origins_are_accepted() {
        assert!(
            build_cors_layer(&[
                "http://localhost:5173".to_string(),
                "https://blogsphere.example".to_string(),
            ])
            .is_ok()
        );
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        assert!(build_cors_layer(&["*".to_string()]).is_err());
        assert!(
            build_cors_layer(&["http://localhost:5173".to_string(), "*".to_string()]).is_err()
        );
    }

    #[test]
    fn empty_or_invalid_origins_are_rejected() {
        assert!(build_cors_layer(&[]).is_err());
        assert!(build_cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
