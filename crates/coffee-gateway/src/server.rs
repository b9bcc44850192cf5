// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use coffee_audit::AuditRecorder;
use coffee_core::{AuditStore, CoffeeError};
use coffee_machine::CoffeeMachine;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// State for the unauthenticated infrastructure and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
    /// Renders the Prometheus exposition text. `None` disables `/metrics`.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub machine: CoffeeMachine,
    pub recorder: AuditRecorder,
    /// Read side of the audit log, for statistics.
    pub store: Arc<dyn AuditStore>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Address the gateway listens on.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full router.
///
/// `/api/coffee/*` sits behind the bearer-token middleware; statistics,
/// infrastructure and metrics are public.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/api/infrastructure", get(handlers::get_infrastructure))
        .route("/api/statistics", get(handlers::get_statistics))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state.clone());

    let machine_routes = Router::new()
        .route("/api/coffee/status", get(handlers::get_status))
        .route(
            "/api/coffee/status/online",
            post(handlers::power_on).delete(handlers::power_off),
        )
        .route("/api/coffee/make", post(handlers::make_coffee))
        .route("/api/coffee/descale", post(handlers::descale))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(machine_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the listener. Split from [`serve`] so callers learn about bind
/// failures (and the chosen port) before serving starts.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, CoffeeError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| CoffeeError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serve until `shutdown` is cancelled, then finish in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), CoffeeError> {
    let app = build_router(state);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "gateway listening");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| CoffeeError::Transport {
        message: format!("gateway server error: {e}"),
        source: Some(Box::new(e)),
    })
}
