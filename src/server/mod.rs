//! HTTP surface of the relay.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/status/{service}` | Probe one registered service |
//!
//! Requests pass CORS, then the per-IP rate limit, then the optional
//! `x-api-key` gate before reaching the handler.

pub mod handlers;
pub mod middleware;

use crate::adapters::HttpProber;
use crate::config::RelayConfig;
use crate::core::checker::StatusChecker;
use crate::core::registry::ServiceRegistry;
use crate::domain::ports::Prober;
use crate::utils::error::Result;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use middleware::{ApiKeyGate, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub checker: StatusChecker,
    pub registry: Arc<ServiceRegistry>,
}

/// Build the router around an arbitrary prober.
pub fn build_router(config: &RelayConfig, prober: Arc<dyn Prober>) -> Result<Router> {
    let state = AppState {
        checker: StatusChecker::new(prober),
        registry: Arc::new(config.registry()),
    };
    let gate = ApiKeyGate::new(config.api_key());
    let limiter = RateLimiter::new(&config.rate_limit);

    if gate.is_enabled() {
        tracing::info!("API key gating enabled");
    }

    // Last layer added runs first.
    Ok(Router::new()
        .route("/status/{service}", get(handlers::service_status))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            gate,
            middleware::require_api_key,
        ))
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit,
        ))
        .layer(middleware::cors_layer(&config.server.allowed_origins)?))
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

/// Bind the configured port and serve with the reqwest-backed prober until Ctrl-C.
pub async fn run(config: RelayConfig) -> Result<()> {
    let prober = HttpProber::new(&config.probe)?;
    tracing::debug!("Probe timeout: {:?}", prober.timeout());

    let app = build_router(&config, Arc::new(prober))?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    let registry = config.registry();
    let services: Vec<&str> = registry.enabled_names().collect();
    tracing::info!("Serving status for: {}", services.join(", "));
    tracing::info!("Server running at http://localhost:{}", config.server.port);

    serve_on(listener, app, async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Could not install Ctrl-C handler, serving until killed");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    })
    .await
}
