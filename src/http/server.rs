//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every method and path to the dispatcher
//! - Wire up middleware (tracing with request ID)
//! - Bind server to listener
//! - Stop accepting on shutdown and let in-flight dispatches finish

use axum::{body::Body, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::dispatch::{dispatch_handler, Dispatcher};
use crate::http::request::make_span;
use crate::lifecycle::shutdown::wait as wait_for_shutdown;

/// HTTP front door for function dispatch.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            router: Self::build_router(dispatcher),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(dispatcher: Dispatcher) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(dispatcher)
            .layer(TraceLayer::new_for_http().make_span_with(make_span::<Body>))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
