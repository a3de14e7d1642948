//! Cross-origin resource sharing policy.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

/// Environment variable appended to the default origin list.
pub const ENV_PRODUCTION_ORIGIN: &str = "PRODUCTION_ORIGIN";

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8000"];

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Resolve the configured origin list.
///
/// Empty means "local development origins", plus the production origin when
/// one is provided.
pub fn resolve_origins(configured: &[String], production_origin: Option<String>) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }

    let mut origins: Vec<String> = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
    if let Some(origin) = production_origin.filter(|o| !o.is_empty()) {
        origins.push(origin);
    }
    origins
}

/// Build the CORS layer.
///
/// A `"*"` entry opens the API to any origin without credentials; explicit
/// origins are allowed with credentials and mirrored request headers.
pub fn cors_layer(configured: &[String]) -> CorsLayer {
    let origins = resolve_origins(configured, std::env::var(ENV_PRODUCTION_ORIGIN).ok());
    let base = CorsLayer::new().allow_methods(ALLOWED_METHODS.to_vec());

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_empty_config_uses_defaults_and_production_origin() {
        let origins = resolve_origins(&[], Some("https://agro.example".to_string()));
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000",
                "http://localhost:8000",
                "https://agro.example"
            ]
        );

        assert_eq!(resolve_origins(&[], Some(String::new())).len(), 2);
    }

    #[test]
    fn test_configured_origins_win() {
        let configured = vec!["https://a.example".to_string()];
        assert_eq!(resolve_origins(&configured, Some("https://b".into())), configured);
    }

    #[tokio::test]
    async fn test_explicit_origin_allows_credentials() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&["https://a.example".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "https://a.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "https://a.example");
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_wildcard_origin() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&["*".to_string()]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "https://anywhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
