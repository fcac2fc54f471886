// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::get,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::health, state::AppState};

/// Assembles the HTTP transport router.
///
/// * `/mcp` is the MCP streamable-HTTP endpoint. It is stateless: every
///   `POST` carries one JSON-RPC message, and a bearer token sent with it is
///   used for that call's backend requests.
/// * `GET /health` is a liveness check.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("mcp-protocol-version"),
        ]);

    let server = state.server();
    let mut config = StreamableHttpServerConfig::default();
    config.stateful_mode = false;
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        config,
    );

    Router::new()
        .route("/health", get(health::health))
        .nest_service("/mcp", mcp)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
