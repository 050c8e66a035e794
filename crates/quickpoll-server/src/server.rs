//! `QuickPollServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use quickpoll_store::{ConnectionPool, PollStore};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::http;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::Broadcaster;
use crate::websocket::connection::ConnectionId;
use crate::websocket::registry::SubscriptionRegistry;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Poll store, publishing into the broadcaster.
    pub store: Arc<PollStore>,
    /// Live connections and subscriptions.
    pub registry: Arc<SubscriptionRegistry>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`, if a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct Welcome {
    /// Greeting.
    pub message: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// The `QuickPoll` server.
pub struct QuickPollServer {
    config: Arc<ServerConfig>,
    store: Arc<PollStore>,
    registry: Arc<SubscriptionRegistry>,
    shutdown: Arc<ShutdownCoordinator>,
    metrics: Option<PrometheusHandle>,
    start_time: Instant,
}

impl QuickPollServer {
    /// Create a new server over an already-migrated pool.
    pub fn new(config: ServerConfig, pool: ConnectionPool, metrics: Option<PrometheusHandle>) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(registry.clone(), config.send_timeout()));
        let store = Arc::new(PollStore::new(pool, broadcaster));
        Self {
            config: Arc::new(config),
            store,
            registry,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            metrics,
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            registry: self.registry.clone(),
            shutdown: self.shutdown.clone(),
            config: self.config.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/", get(welcome_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .merge(http::routes())
            .layer(cors_layer(&self.config.cors_origins))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve in the background until shutdown is requested.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server error");
            }
        });

        info!(%addr, "quickpoll server listening");
        Ok((addr, handle))
    }

    /// Get the subscription registry.
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

/// GET /
async fn welcome_handler() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to QuickPoll API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.registry.connection_count(),
        state.registry.subscribed_poll_count(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let registry = state.registry.clone();
    let config = state.config.clone();
    let token = state.shutdown.token();
    let shutdown = state.shutdown.clone();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            shutdown.track_session(async move {
                let _ = run_ws_session(socket, ConnectionId::generate(), registry, config, token).await;
            })
        })
}
