use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    classifier::PricingTable,
    config::{Config, CorsConfig},
    handlers::{self, AppState},
    logging::SensitiveApiKey,
    metrics,
    providers::OpenAiCompatibleProvider,
    signals::shutdown_signal,
};

/// Start the classification server
///
/// This function:
/// 1. Builds the immutable shared state (provider client, pricing table)
/// 2. Installs the metrics recorder when enabled
/// 3. Binds to the configured address
/// 4. Serves requests until SIGINT/SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    let state = build_state(&config, reqwest::Client::new())?;

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let app = create_router(&config, state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting EcoCycle classifier on {}", addr);
    info!(
        provider = %config.provider.name,
        base_url = %config.provider.base_url,
        api_key = %SensitiveApiKey::new(&config.provider.api_key),
        vision_model = %config.provider.vision_model,
        "Model provider configured"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Build the read-only state shared across requests
pub fn build_state(config: &Config, http_client: reqwest::Client) -> Result<AppState> {
    let pricing = PricingTable::with_overrides(&config.pricing.prices)?;
    for (category, price) in pricing.entries() {
        info!(category = %category, price_per_kg = price, "Pricing entry");
    }

    Ok(AppState {
        provider: Arc::new(OpenAiCompatibleProvider::new(http_client, &config.provider)),
        pricing: Arc::new(pricing),
        settings: Arc::new(config.provider.clone()),
    })
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: &Config,
    state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::health::root))
        .route("/classify", post(handlers::classify::handle_classify))
        .route("/test", get(handlers::probe::handle_probe))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route(
                &config.metrics.endpoint,
                get(handlers::metrics_handler::render_metrics),
            )
            .with_state(handle);
        app = app.merge(metrics_routes);
    }

    app.layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    // tower-http panics on "*" inside an explicit origin list
    let allow_origin = if cors.allowed_origins.iter().any(|origin| origin.trim() == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricsConfig, PricingConfig, ProviderConfig, ServerConfig};
    use crate::handlers::test_support::{multipart_body, state_with, MockProvider};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            provider: ProviderConfig {
                api_key: "gsk-test-key".to_string(),
                ..ProviderConfig::default()
            },
            cors: CorsConfig::default(),
            pricing: PricingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_root_route() {
        let app = create_router(&create_test_config(), state_with(MockProvider::replying("")), None);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_mounted_when_handle_present() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = Arc::new(recorder.handle());
        let config = create_test_config();

        let app = create_router(&config, state_with(MockProvider::replying("")), Some(handle));
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = create_router(&config, state_with(MockProvider::replying("")), None);
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_upload_never_reaches_provider() {
        let mut config = create_test_config();
        config.server.max_upload_bytes = 1024;
        let provider = MockProvider::replying("plastic");
        let app = create_router(&config, state_with(provider.clone()), None);

        let (content_type, body) = multipart_body("file", "image/jpeg", &vec![0u8; 4096]);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/classify")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let _ = to_bytes(response.into_body(), usize::MAX).await;
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = create_router(&create_test_config(), state_with(MockProvider::replying("")), None);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/classify")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok());
        assert_eq!(allowed, Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn test_cors_wildcard_origin_allows_any() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec!["*".to_string()];
        let app = create_router(&config, state_with(MockProvider::replying("")), None);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/classify")
                    .header(header::ORIGIN, "https://elsewhere.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok());
        assert_eq!(allowed, Some("*"));
    }

    #[test]
    fn test_build_state_rejects_bad_pricing() {
        let mut config = create_test_config();
        config.pricing.prices.insert("wood".to_string(), 3);
        assert!(build_state(&config, reqwest::Client::new()).is_err());
    }
}
