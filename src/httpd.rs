//
// elasticsearch_exporter
//
// This module deals with httpd related tasks.
//
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use axum::body::Bytes;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{
    debug,
    info,
    warn,
};

pub mod errors;
use errors::HttpdError;

mod gatherer;
pub use gatherer::Gatherer;

mod handlers;
use handlers::{
    index,
    metrics,
};

mod templates;
use templates::render_index_page;

// This AppState is shared by the request handlers.
pub(in crate::httpd) struct AppState {
    gatherer:   Arc<dyn Gatherer>,
    index_page: Bytes,
}

// Used for the httpd builder
#[derive(Debug)]
pub struct Server {
    bind_address:   String,
    telemetry_path: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind_address:   "127.0.0.1:9114".into(),
            telemetry_path: "/metrics".into(),
        }
    }
}

// Implements a builder pattern for configuring and running the http server.
impl Server {
    // Returns a new server instance.
    pub fn new() -> Self {
        Default::default()
    }

    // Sets the bind_address of the server.
    pub fn bind_address(mut self, bind_address: String) -> Self {
        debug!("Setting server bind_address to: {bind_address}");

        self.bind_address = bind_address;
        self
    }

    // Sets the telemetry path for the metrics.
    pub fn telemetry_path(mut self, telemetry_path: String) -> Self {
        debug!("Setting server telemetry_path to: {telemetry_path}");

        self.telemetry_path = telemetry_path;
        self
    }

    // Builds the application router.
    fn router(&self, gatherer: Arc<dyn Gatherer>) -> Result<Router, HttpdError> {
        let state = AppState {
            gatherer,
            index_page: render_index_page(&self.telemetry_path)?,
        };

        debug!("Registering HTTP app routes");
        let router = Router::new()
            // Root of HTTP server. Provides a basic index page and link to
            // the metrics page.
            .route("/", get(index))

            // Path serving up the metrics.
            .route(&self.telemetry_path, get(metrics))

            // Enable request logging
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(state));

        Ok(router)
    }

    // Run the HTTP server until interrupted.
    pub async fn run(self, gatherer: Arc<dyn Gatherer>) -> Result<(), HttpdError> {
        let app = self.router(gatherer)?;

        debug!("Attempting to bind to: {}", self.bind_address);
        let listener = TcpListener::bind(&self.bind_address)
            .await
            .map_err(|e| {
                HttpdError::BindAddress(format!("{}: {e}", self.bind_address))
            })?;

        info!("Starting HTTP server on {}", self.bind_address);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received interrupt, shutting down"),
        Err(e) => {
            // Without a signal handler we can only run until killed.
            warn!("Unable to listen for interrupt: {e}");
            std::future::pending::<()>().await;
        },
    }
}
