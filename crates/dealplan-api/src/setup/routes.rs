//! Route configuration and setup

use crate::auth::{auth_middleware, AuthState, JwtService};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use dealplan_core::Config;
use dealplan_infra::{request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: JwtService::new(config.jwt_secret()),
    });

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let body_limit = config.max_input_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let app = public_routes()
        .merge(protected_routes)
        .merge(
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(axum::extract::DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|origin| origin == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Routes reachable without a token
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
        .route(
            "/files/{bucket}/{*key}",
            get(handlers::public_file::get_signed_file),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Versioned routes behind the bearer-token middleware
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(client_routes())
        .merge(responsible_routes())
        .merge(opportunity_routes())
        .merge(input_routes())
        .merge(artifact_routes())
        .route(
            &format!("{}/dsp/generate", API_PREFIX),
            post(handlers::dsp::generate_dsp),
        )
        .route(
            &format!("{}/proxy/upload", API_PREFIX),
            post(handlers::proxy::proxy_upload),
        )
        .route(
            &format!("{}/proxy/generate-artifact", API_PREFIX),
            post(handlers::proxy::proxy_generate_artifact),
        )
}

fn client_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/clients", API_PREFIX),
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            &format!("{}/clients/{{id}}", API_PREFIX),
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
}

fn responsible_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/responsibles", API_PREFIX),
            get(handlers::responsibles::list_responsibles)
                .post(handlers::responsibles::create_responsible),
        )
        .route(
            &format!("{}/responsibles/{{id}}", API_PREFIX),
            axum::routing::put(handlers::responsibles::update_responsible),
        )
}

fn opportunity_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/opportunities", API_PREFIX),
            get(handlers::opportunities::list_opportunities)
                .post(handlers::opportunities::create_opportunity),
        )
        .route(
            &format!("{}/opportunities/{{id}}", API_PREFIX),
            get(handlers::opportunities::get_opportunity)
                .put(handlers::opportunities::update_opportunity)
                .delete(handlers::opportunities::delete_opportunity),
        )
}

fn input_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/opportunities/{{id}}/inputs", API_PREFIX),
            get(handlers::inputs::list_inputs).post(handlers::inputs::upload_input),
        )
        .route(
            &format!("{}/inputs/{{id}}/download-url", API_PREFIX),
            get(handlers::inputs::input_download_url),
        )
        .route(
            &format!("{}/inputs/{{id}}", API_PREFIX),
            axum::routing::delete(handlers::inputs::delete_input),
        )
}

fn artifact_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/opportunities/{{id}}/artifacts", API_PREFIX),
            get(handlers::artifacts::list_artifacts),
        )
        .route(
            &format!("{}/artifacts/{{id}}", API_PREFIX),
            get(handlers::artifacts::get_artifact),
        )
}
