//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, limits, timeouts, panics)
//! - Bind server to listener
//! - Graceful shutdown on the lifecycle broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::games::{self, GameStore};
use crate::http::request::MakeRequestUuidV4;
use crate::http::response::{not_found, panic_response};
use crate::observability::metrics;
use crate::relay::{self, ImageRelay, RelayError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ImageRelay>,
    pub games: Arc<dyn GameStore>,
}

/// HTTP server for the games API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: AppConfig, games: Arc<dyn GameStore>) -> Result<Self, RelayError> {
        let relay = Arc::new(ImageRelay::new(&config.relay)?);
        let state = AppState { relay, games };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        // The relay is bounded by its own upstream deadline, which maps to a
        // JSON 500 rather than a bare 408.
        let timed = Router::new()
            .route("/", get(index))
            .merge(games::handlers::routes())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .merge(timed)
            .merge(relay::handler::routes())
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(CorsLayer::permissive())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Static description of the available routes.
async fn index() -> Json<Value> {
    Json(json!({
        "message": "Games API is running",
        "endpoints": {
            "GET /api/games": "List all games",
            "GET /api/games/{id}": "Get a game by id",
            "POST /api/games": "Create a game",
            "PUT /api/games/{id}": "Update a game",
            "DELETE /api/games/{id}": "Delete a game",
            "GET /api/proxy-image?url=<url>": "Relay an image from another origin"
        }
    }))
}
